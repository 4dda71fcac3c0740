use crate::test_utils::{binding, parse};
use rdf_query_logical::{
    substitute, substitute_query, Algebra, QueryParseError, SubstitutionError,
};
use rdf_query_model::{Literal, NamedNode};

fn substituted(query: &str, values: Vec<(&str, rdf_query_model::Term)>) -> Algebra {
    let query = parse(query).unwrap();
    substitute_query(&query, &binding(values))
        .unwrap()
        .pattern()
        .clone()
}

#[test]
fn test_substitute_projected_variable() {
    let plan = substituted(
        "PREFIX : <http://example/ns#> SELECT ?s ?o { ?s :p3 ?o }",
        vec![("o", Literal::new_simple_literal("y1").into())],
    );

    insta::assert_snapshot!(plan, @r#"
    Project: ?s ?o
      Bgp: (?s <http://example/ns#p3> "y1")
    "#);
}

#[test]
fn test_substitute_does_not_enter_sub_select() {
    let plan = substituted(
        "SELECT ?s ?o { { SELECT ?s { ?s ?p ?o } } }",
        vec![("o", Literal::new_simple_literal("y1").into())],
    );

    insta::assert_snapshot!(plan, @r"
    Project: ?s ?o
      Project: ?s
        Bgp: (?s ?p ?o)
    ");
}

#[test]
fn test_substitute_into_filter() {
    let plan = substituted(
        "ASK { FILTER(?a = ?b) }",
        vec![
            ("a", Literal::from(true).into()),
            ("b", Literal::from(true).into()),
        ],
    );

    insta::assert_snapshot!(plan, @r#"
    Filter: ("true"^^<http://www.w3.org/2001/XMLSchema#boolean> = "true"^^<http://www.w3.org/2001/XMLSchema#boolean>)
      Bgp: unit
    "#);
}

#[test]
fn test_substitute_into_not_exists() {
    let plan = substituted(
        "PREFIX : <http://example/ns#>
        ASK { ?s :p1 ?o FILTER NOT EXISTS { ?this :p2 ?o } }",
        vec![("this", NamedNode::new_unchecked("http://example/ns#r").into())],
    );

    insta::assert_snapshot!(plan, @r"
    NotExists
      Bgp: (?s <http://example/ns#p1> ?o)
      Bgp: (<http://example/ns#r> <http://example/ns#p2> ?o)
    ");
}

#[test]
fn test_substitute_through_query_projection() {
    let plan = substituted(
        "PREFIX : <http://example/ns#>
        SELECT ?s ?o { ?s :p1 ?o FILTER NOT EXISTS { ?this :p2 ?o } }",
        vec![("this", NamedNode::new_unchecked("http://example/ns#r").into())],
    );

    insta::assert_snapshot!(plan, @r"
    Project: ?s ?o
      NotExists
        Bgp: (?s <http://example/ns#p1> ?o)
        Bgp: (<http://example/ns#r> <http://example/ns#p2> ?o)
    ");
}

#[test]
fn test_substitute_unprojected_pattern_variable() {
    let plan = substituted(
        "SELECT ?s ?p { ?s ?p ?o }",
        vec![("o", Literal::new_simple_literal("y1").into())],
    );

    insta::assert_snapshot!(plan, @r#"
    Project: ?s ?p
      Bgp: (?s ?p "y1")
    "#);
}

#[test]
fn test_substitute_rejects_invalid_positions() -> Result<(), QueryParseError> {
    let query = parse("SELECT ?p { GRAPH ?g { ?s ?p ?o } }")?;

    assert_eq!(
        substitute(
            query.pattern(),
            &binding([("p", Literal::new_simple_literal("p").into())])
        ),
        Err(SubstitutionError::InvalidPredicate {
            variable: rdf_query_model::Variable::new_unchecked("p"),
            term: Literal::new_simple_literal("p").into(),
        })
    );

    let query = parse("SELECT ?g { GRAPH ?g { ?s ?p ?o } }")?;
    assert!(matches!(
        substitute(
            query.pattern(),
            &binding([("g", Literal::new_simple_literal("g").into())])
        ),
        Err(SubstitutionError::InvalidGraphName { .. })
    ));

    Ok(())
}
