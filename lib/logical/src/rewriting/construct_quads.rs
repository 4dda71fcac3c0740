//! `CONSTRUCT` queries with `GRAPH` blocks in their template.
//!
//! Standard SPARQL only allows triples in a `CONSTRUCT` template. A template with `GRAPH` blocks
//! has the same grammar as the template of an `INSERT { .. } WHERE { .. }` update, so the query is
//! parsed as such an update after replacing the keyword.

use crate::rewriting::GraphPatternRewriter;
use crate::{Query, QueryParseError};
use regex::Regex;
use spargebra::{GraphUpdateOperation, Update};
use std::sync::LazyLock;

/// Matches the tokens that may contain the keyword without being the keyword. Only the last
/// alternative captures.
static TOKENS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)"""(?s:.*?)"""|'''(?s:.*?)'''|"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|<[^<>"{}|^`\\\s]*>|#[^\n]*|[?$]\w+|[\w-]*:[\w.-]*|\b(CONSTRUCT)\b"#,
    )
    .ok()
});

/// Parses `query` as a `CONSTRUCT` query whose template writes quads.
///
/// Returns [None] if the query is not of this shape. The caller then reports the error of the
/// standard parser.
pub(crate) fn parse_construct_quads(
    query: &str,
    base_iri: Option<&str>,
) -> Option<Result<Query, QueryParseError>> {
    let update = Update::parse(&replace_keyword(query)?, base_iri).ok()?;
    let [GraphUpdateOperation::DeleteInsert {
        delete,
        insert,
        using: None,
        pattern,
    }] = update.operations.as_slice()
    else {
        return None;
    };
    if !delete.is_empty() {
        return None;
    }

    Some(GraphPatternRewriter::default().rewrite_construct_quads(insert, pattern))
}

fn replace_keyword(query: &str) -> Option<String> {
    let keyword = TOKENS
        .as_ref()?
        .captures_iter(query)
        .find_map(|captures| captures.get(1))?;
    Some(format!(
        "{}INSERT{}",
        &query[..keyword.start()],
        &query[keyword.end()..]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_only_the_keyword() {
        let query = "PREFIX ex: <http://example/construct#> # CONSTRUCT\nconstruct { ?construct ex:construct \"CONSTRUCT\" } WHERE {}";

        assert_eq!(
            replace_keyword(query).as_deref(),
            Some("PREFIX ex: <http://example/construct#> # CONSTRUCT\nINSERT { ?construct ex:construct \"CONSTRUCT\" } WHERE {}")
        );
    }

    #[test]
    fn ignores_queries_without_keyword() {
        assert_eq!(replace_keyword("SELECT * {}"), None);
        assert!(parse_construct_quads("SELECT * {", None).is_none());
    }

    #[test]
    fn parses_graph_templates() {
        let query = parse_construct_quads(
            "CONSTRUCT { GRAPH ?g { ?s ?p ?o } ?s ?p ?o } WHERE { GRAPH ?g { ?s ?p ?o } }",
            None,
        )
        .unwrap()
        .unwrap();

        let Query::Construct { template, pattern } = query else {
            panic!("Expected a CONSTRUCT query")
        };
        insta::assert_snapshot!(template, @"{ GRAPH ?g { ?s ?p ?o } . ?s ?p ?o }");
        insta::assert_snapshot!(pattern, @r"
        Graph: ?g
          Bgp: (?s ?p ?o)
        ");
    }
}
