use crate::test_utils::parse;
use rdf_query_logical::{
    AggregateExpression, Algebra, Expression, GraphNameTemplate, Query, QueryForm,
    QueryParseError,
};
use rdf_query_model::Variable;

#[test]
fn test_select_projects_variables() -> Result<(), QueryParseError> {
    let query = parse("SELECT ?s { ?s ?p ?o }")?;

    assert_eq!(query.form(), QueryForm::Select);
    insta::assert_snapshot!(query, @r"
    SELECT ?s
    Project: ?s
      Bgp: (?s ?p ?o)
    ");

    Ok(())
}

#[test]
fn test_ask_with_filter_over_unit() -> Result<(), QueryParseError> {
    let query = parse("ASK { FILTER(?a = <http://constant>) }")?;

    assert_eq!(query.form(), QueryForm::Ask);
    insta::assert_snapshot!(query.pattern(), @r"
    Filter: (?a = <http://constant>)
      Bgp: unit
    ");

    Ok(())
}

#[test]
fn test_optional_keeps_its_filter() -> Result<(), QueryParseError> {
    let query = parse(
        r#"PREFIX : <http://example/ns#>
        SELECT ?s ?x { ?s :p1 ?o OPTIONAL { ?s :p2 ?x FILTER(?x != "y") } }"#,
    )?;

    insta::assert_snapshot!(query.pattern(), @r#"
    Project: ?s ?x
      LeftJoin: !(?x = "y")
        Bgp: (?s <http://example/ns#p1> ?o)
        Bgp: (?s <http://example/ns#p2> ?x)
    "#);

    Ok(())
}

#[test]
fn test_filter_not_exists() -> Result<(), QueryParseError> {
    let query = parse(
        "PREFIX : <http://example/ns#>
        SELECT ?s { ?s :p1 ?o FILTER NOT EXISTS { ?s :p3 ?z } }",
    )?;

    insta::assert_snapshot!(query.pattern(), @r"
    Project: ?s
      NotExists
        Bgp: (?s <http://example/ns#p1> ?o)
        Bgp: (?s <http://example/ns#p3> ?z)
    ");

    Ok(())
}

#[test]
fn test_graph_pattern() -> Result<(), QueryParseError> {
    let query = parse("SELECT ?g { GRAPH ?g { ?s ?p ?o } }")?;

    insta::assert_snapshot!(query.pattern(), @r"
    Project: ?g
      Graph: ?g
        Bgp: (?s ?p ?o)
    ");

    Ok(())
}

#[test]
fn test_count_is_grouped() -> Result<(), QueryParseError> {
    let query = parse("SELECT (count(?s) AS ?c) { ?s ?p ?o } GROUP BY ?s")?;
    let Query::Select { pattern, variables } = query else {
        panic!("Expected a SELECT query");
    };
    assert_eq!(variables, vec![Variable::new_unchecked("c")]);

    let Algebra::Project { inner, .. } = pattern else {
        panic!("Expected a projection");
    };
    let Algebra::Extend { inner, .. } = *inner else {
        panic!("Expected an extension");
    };
    let Algebra::Group {
        keys, aggregates, ..
    } = *inner
    else {
        panic!("Expected a group");
    };
    assert_eq!(keys, vec![Variable::new_unchecked("s")]);
    assert_eq!(aggregates.len(), 1);
    assert_eq!(
        aggregates[0].1,
        AggregateExpression::Count {
            expression: Some(Expression::Variable(Variable::new_unchecked("s"))),
            distinct: false,
        }
    );

    Ok(())
}

#[test]
fn test_construct_into_named_graphs() -> Result<(), QueryParseError> {
    let query = parse(
        "PREFIX : <http://example/ns#>
        CONSTRUCT { GRAPH :g1 { ?s ?p ?o } } WHERE { ?s ?p ?o }",
    )?;
    let Query::Construct { template, .. } = &query else {
        panic!("Expected a CONSTRUCT query");
    };

    assert_eq!(template.quads().len(), 1);
    assert!(matches!(
        template.quads()[0].graph_name,
        GraphNameTemplate::NamedNode(_)
    ));
    insta::assert_snapshot!(query, @r"
    CONSTRUCT { GRAPH <http://example/ns#g1> { ?s ?p ?o } }
    Bgp: (?s ?p ?o)
    ");

    Ok(())
}

#[test]
fn test_construct_triples() -> Result<(), QueryParseError> {
    let query = parse("CONSTRUCT { ?s ?p _:b } WHERE { ?s ?p ?o }")?;
    let Query::Construct { template, .. } = &query else {
        panic!("Expected a CONSTRUCT query");
    };

    assert_eq!(template.default_graph_templates().count(), 1);
    assert_eq!(template.variables().len(), 2);

    Ok(())
}

#[test]
fn test_unsupported_features() {
    for query in [
        "SELECT * { ?s <http://p>+ ?o }",
        "SELECT * { ?s ?p ?o } ORDER BY ?s",
        "SELECT * FROM <http://g> { ?s ?p ?o }",
        "ASK { ?s ?p ?o FILTER EXISTS { ?s ?p ?o } }",
        "DESCRIBE <http://s>",
        "SELECT (sum(?o) AS ?x) { ?s ?p ?o }",
        "SELECT * { ?s ?p ?o FILTER(ucase(?o) = concat(?o, ?o)) }",
    ] {
        assert!(
            matches!(parse(query), Err(QueryParseError::Unsupported(_))),
            "{query} should be unsupported"
        );
    }
}

#[test]
fn test_syntax_error() {
    assert!(matches!(
        parse("SELECT * { ?s ?p "),
        Err(QueryParseError::Syntax(_))
    ));
    assert!(matches!(
        parse("CONSTRUCT { ?s ?p ?o WHERE { ?s ?p ?o }"),
        Err(QueryParseError::Syntax(_))
    ));
}
