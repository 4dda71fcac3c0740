use rdf_query_model::{Term, Variable};
use spargebra::SparqlSyntaxError;

/// An error raised while turning a query string into a [Query](crate::Query).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QueryParseError {
    /// The query string is not valid SPARQL.
    #[error(transparent)]
    Syntax(#[from] SparqlSyntaxError),
    /// The query uses a feature that the engine does not support.
    #[error("Unsupported query feature: {0}")]
    Unsupported(String),
}

impl QueryParseError {
    pub fn unsupported<T>(feature: impl Into<String>) -> Result<T, Self> {
        Err(QueryParseError::Unsupported(feature.into()))
    }
}

/// An initial binding places a term in a position where it can never be valid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SubstitutionError {
    /// Predicates must be IRIs.
    #[error("The variable {variable} is used as a predicate but is bound to {term}")]
    InvalidPredicate { variable: Variable, term: Term },
    /// Graph names must be IRIs or blank nodes.
    #[error("The variable {variable} is used as a graph name but is bound to {term}")]
    InvalidGraphName { variable: Variable, term: Term },
}
