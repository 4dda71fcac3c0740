use rdf_query_logical::{Query, QueryParseError};
use rdf_query_model::{Binding, Term, Variable};

pub fn parse(query: &str) -> Result<Query, QueryParseError> {
    Query::parse(query, Some("http://example/base/"))
}

pub fn binding<'a>(values: impl IntoIterator<Item = (&'a str, Term)>) -> Binding {
    values
        .into_iter()
        .map(|(name, term)| (Variable::new_unchecked(name), term))
        .collect()
}
