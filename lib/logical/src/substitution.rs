//! Substitution of an initial binding into an algebra tree.
//!
//! Substitution must run before the optimizer: replacing a variable by a constant can turn a
//! filter that always fails on unbound variables into one that always holds, and the optimizer
//! folds filters based on the constants it sees.

use crate::{
    AggregateExpression, Algebra, Expression, NamedGraphPattern, Query, SubstitutionError,
};
use rdf_query_model::{
    Binding, Literal, NamedNodePattern, Term, TermPattern, TriplePattern, Variable,
};

/// Where [substitute_query] stands while descending through the solution modifiers of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryScope {
    /// Above the projection of a `SELECT` query.
    Modifiers,
    /// Below the query's own projection, or in a query without one.
    Projected,
}

/// Substitutes `binding` into the pattern of `query`.
///
/// The initial binding applies to the whole `WHERE` clause: the projection of a `SELECT` query
/// and its grouping do not hide variables from it. Sub-queries keep their own scope, as in
/// [substitute].
pub fn substitute_query(query: &Query, binding: &Binding) -> Result<Query, SubstitutionError> {
    let scope = match query {
        Query::Select { .. } => QueryScope::Modifiers,
        Query::Ask { .. } | Query::Construct { .. } => QueryScope::Projected,
    };
    let pattern = substitute_outermost(query.pattern(), binding, scope)?;
    Ok(query.with_pattern(pattern))
}

fn substitute_outermost(
    algebra: &Algebra,
    binding: &Binding,
    scope: QueryScope,
) -> Result<Algebra, SubstitutionError> {
    if binding.is_empty() {
        return Ok(algebra.clone());
    }

    Ok(match (algebra, scope) {
        (Algebra::Distinct { inner }, _) => {
            Algebra::distinct(substitute_outermost(inner, binding, scope)?)
        }
        (
            Algebra::Slice {
                inner,
                start,
                length,
            },
            _,
        ) => Algebra::slice(substitute_outermost(inner, binding, scope)?, *start, *length),
        (Algebra::Project { inner, variables }, QueryScope::Modifiers) => Algebra::project(
            substitute_outermost(inner, binding, QueryScope::Projected)?,
            variables.iter().cloned(),
        ),
        (Algebra::Filter { inner, expression }, QueryScope::Projected) => Algebra::filter(
            substitute_outermost(inner, binding, scope)?,
            substitute_expression(expression, binding),
        ),
        (
            Algebra::Extend {
                inner,
                variable,
                expression,
            },
            QueryScope::Projected,
        ) => Algebra::extend(
            substitute_outermost(inner, binding, scope)?,
            variable.clone(),
            substitute_expression(expression, binding),
        ),
        (
            Algebra::Group {
                inner,
                keys,
                aggregates,
            },
            QueryScope::Projected,
        ) => Algebra::group(
            substitute(inner, binding)?,
            keys.iter().cloned(),
            aggregates
                .iter()
                .map(|(variable, aggregate)| {
                    (variable.clone(), substitute_aggregate(aggregate, binding))
                })
                .collect::<Vec<_>>(),
        ),
        _ => substitute(algebra, binding)?,
    })
}

/// Replaces every free occurrence of a variable bound in `binding` by its term.
///
/// Variables that are not projected by a `Project` node, or that are not grouping keys of a
/// `Group` node, are local to that node and are not replaced below it. Variables of the binding
/// that do not occur in the tree are ignored.
///
/// Fails if a variable in predicate position is bound to something other than an IRI, or if a
/// variable in graph name position is bound to a literal.
pub fn substitute(algebra: &Algebra, binding: &Binding) -> Result<Algebra, SubstitutionError> {
    if binding.is_empty() {
        return Ok(algebra.clone());
    }

    Ok(match algebra {
        Algebra::Bgp { patterns } => Algebra::bgp(
            patterns
                .iter()
                .map(|pattern| substitute_triple_pattern(pattern, binding))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Algebra::Empty => Algebra::Empty,
        Algebra::Filter { inner, expression } => Algebra::filter(
            substitute(inner, binding)?,
            substitute_expression(expression, binding),
        ),
        Algebra::NotExists { inner, pattern } => {
            Algebra::not_exists(substitute(inner, binding)?, substitute(pattern, binding)?)
        }
        Algebra::Minus { left, right } => {
            // Both sides lose the substituted variables. Re-binding the ones they share keeps
            // them in the shared domain that MINUS compares on.
            let shared = left
                .in_scope_variables()
                .intersection(&right.in_scope_variables())
                .filter_map(|variable| {
                    binding
                        .get(variable)
                        .map(|term| (variable.clone(), term.clone()))
                })
                .collect::<Vec<_>>();
            Algebra::minus(
                rebind(substitute(left, binding)?, &shared),
                rebind(substitute(right, binding)?, &shared),
            )
        }
        Algebra::Join { left, right } => {
            Algebra::join(substitute(left, binding)?, substitute(right, binding)?)
        }
        Algebra::LeftJoin {
            left,
            right,
            expression,
        } => Algebra::left_join(
            substitute(left, binding)?,
            substitute(right, binding)?,
            expression
                .as_ref()
                .map(|expression| substitute_expression(expression, binding)),
        ),
        Algebra::Union { left, right } => {
            Algebra::union(substitute(left, binding)?, substitute(right, binding)?)
        }
        Algebra::Graph { name, inner } => Algebra::graph(
            substitute_graph_name(name, binding)?,
            substitute(inner, binding)?,
        ),
        Algebra::Extend {
            inner,
            variable,
            expression,
        } => Algebra::extend(
            substitute(inner, binding)?,
            variable.clone(),
            substitute_expression(expression, binding),
        ),
        Algebra::Project { inner, variables } => {
            let visible = binding.project(variables);
            Algebra::project(substitute(inner, &visible)?, variables.iter().cloned())
        }
        Algebra::Distinct { inner } => Algebra::distinct(substitute(inner, binding)?),
        Algebra::Slice {
            inner,
            start,
            length,
        } => Algebra::slice(substitute(inner, binding)?, *start, *length),
        Algebra::Group {
            inner,
            keys,
            aggregates,
        } => {
            // Substituted keys stay keys. They are unbound below the group, which puts every
            // solution into the same group, and empty input still yields no group.
            let visible = binding.project(keys);
            let aggregates = aggregates
                .iter()
                .map(|(variable, aggregate)| {
                    (variable.clone(), substitute_aggregate(aggregate, &visible))
                })
                .collect::<Vec<_>>();
            Algebra::group(substitute(inner, &visible)?, keys.iter().cloned(), aggregates)
        }
    })
}

fn rebind(algebra: Algebra, bindings: &[(Variable, Term)]) -> Algebra {
    bindings
        .iter()
        .fold(algebra, |algebra, (variable, term)| {
            Algebra::extend(algebra, variable.clone(), Expression::Constant(term.clone()))
        })
}

fn substitute_triple_pattern(
    pattern: &TriplePattern,
    binding: &Binding,
) -> Result<TriplePattern, SubstitutionError> {
    Ok(TriplePattern {
        subject: substitute_term_pattern(&pattern.subject, binding),
        predicate: substitute_predicate(&pattern.predicate, binding)?,
        object: substitute_term_pattern(&pattern.object, binding),
    })
}

/// Subjects and objects accept any term. A literal in subject position can never match, which
/// the engine handles.
fn substitute_term_pattern(pattern: &TermPattern, binding: &Binding) -> TermPattern {
    match pattern {
        TermPattern::Variable(variable) => match binding.get(variable) {
            Some(Term::NamedNode(node)) => TermPattern::NamedNode(node.clone()),
            Some(Term::BlankNode(node)) => TermPattern::BlankNode(node.clone()),
            Some(Term::Literal(literal)) => TermPattern::Literal(literal.clone()),
            None => pattern.clone(),
        },
        _ => pattern.clone(),
    }
}

fn substitute_predicate(
    pattern: &NamedNodePattern,
    binding: &Binding,
) -> Result<NamedNodePattern, SubstitutionError> {
    let NamedNodePattern::Variable(variable) = pattern else {
        return Ok(pattern.clone());
    };

    match binding.get(variable) {
        None => Ok(pattern.clone()),
        Some(Term::NamedNode(node)) => Ok(NamedNodePattern::NamedNode(node.clone())),
        Some(term) => Err(SubstitutionError::InvalidPredicate {
            variable: variable.clone(),
            term: term.clone(),
        }),
    }
}

fn substitute_graph_name(
    name: &NamedGraphPattern,
    binding: &Binding,
) -> Result<NamedGraphPattern, SubstitutionError> {
    let NamedGraphPattern::Variable(variable) = name else {
        return Ok(name.clone());
    };

    match binding.get(variable) {
        None => Ok(name.clone()),
        Some(Term::NamedNode(node)) => Ok(NamedGraphPattern::NamedNode(node.clone())),
        Some(Term::BlankNode(node)) => Ok(NamedGraphPattern::BlankNode(node.clone())),
        Some(term) => Err(SubstitutionError::InvalidGraphName {
            variable: variable.clone(),
            term: term.clone(),
        }),
    }
}

/// Replaces bound variables by constants and `BOUND(?x)` of a bound `?x` by `true`.
pub fn substitute_expression(expression: &Expression, binding: &Binding) -> Expression {
    expression.clone().transform_up(&mut |node| match node {
        Expression::Variable(variable) => match binding.get(&variable) {
            Some(term) => Expression::Constant(term.clone()),
            None => Expression::Variable(variable),
        },
        Expression::Bound(variable) if binding.contains(&variable) => {
            Expression::Constant(Literal::from(true).into())
        }
        node => node,
    })
}

fn substitute_aggregate(aggregate: &AggregateExpression, binding: &Binding) -> AggregateExpression {
    match aggregate {
        AggregateExpression::Count {
            expression,
            distinct,
        } => AggregateExpression::Count {
            expression: expression
                .as_ref()
                .map(|expression| substitute_expression(expression, binding)),
            distinct: *distinct,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_query_model::{BlankNode, NamedNode};

    fn var(name: &str) -> Variable {
        Variable::new_unchecked(name)
    }

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example/ns#{name}"))
    }

    fn spo() -> TriplePattern {
        TriplePattern {
            subject: var("s").into(),
            predicate: var("p").into(),
            object: var("o").into(),
        }
    }

    #[test]
    fn replaces_free_variables() {
        let plan = Algebra::filter(
            Algebra::bgp([spo()]),
            Expression::equal(var("o").into(), var("z").into()),
        );
        let binding = Binding::from_iter([(var("o"), Literal::new_simple_literal("y1").into())]);

        let substituted = substitute(&plan, &binding).unwrap();
        insta::assert_snapshot!(substituted, @r#"
        Filter: ("y1" = ?z)
          Bgp: (?s ?p "y1")
        "#);
    }

    #[test]
    fn ignores_absent_variables() {
        let plan = Algebra::bgp([spo()]);
        let binding = Binding::from_iter([(var("zzz"), Literal::new_simple_literal("z").into())]);

        assert_eq!(substitute(&plan, &binding).unwrap(), plan);
    }

    #[test]
    fn sub_query_projection_hides_variables() {
        let plan = Algebra::join(
            Algebra::bgp([spo()]),
            Algebra::project(Algebra::bgp([spo()]), [var("s")]),
        );
        let binding = Binding::from_iter([
            (var("s"), ex("s").into()),
            (var("o"), ex("o").into()),
        ]);

        let substituted = substitute(&plan, &binding).unwrap();
        insta::assert_snapshot!(substituted, @r"
        Join
          Bgp: (<http://example/ns#s> ?p <http://example/ns#o>)
          Project: ?s
            Bgp: (<http://example/ns#s> ?p ?o)
        ");
    }

    #[test]
    fn query_projection_does_not_hide_variables() {
        let query = Query::Select {
            pattern: Algebra::distinct(Algebra::project(Algebra::bgp([spo()]), [var("s")])),
            variables: vec![var("s")],
        };
        let binding = Binding::from_iter([(var("o"), ex("o").into())]);

        let substituted = substitute_query(&query, &binding).unwrap();
        insta::assert_snapshot!(substituted.pattern(), @r"
        Distinct
          Project: ?s
            Bgp: (?s ?p <http://example/ns#o>)
        ");
    }

    #[test]
    fn query_grouping_does_not_hide_variables() {
        let count = AggregateExpression::Count {
            expression: None,
            distinct: false,
        };
        let query = Query::Select {
            pattern: Algebra::project(
                Algebra::group(Algebra::bgp([spo()]), [var("s")], [(var("c"), count)]),
                [var("s"), var("c")],
            ),
            variables: vec![var("s"), var("c")],
        };
        let binding = Binding::from_iter([(var("o"), ex("o").into())]);

        let substituted = substitute_query(&query, &binding).unwrap();
        insta::assert_snapshot!(substituted.pattern(), @r"
        Project: ?s ?c
          Group: (?s) [?c := count(*)]
            Bgp: (?s ?p <http://example/ns#o>)
        ");
    }

    #[test]
    fn bound_becomes_true() {
        let plan = Algebra::filter(Algebra::unit(), Expression::Bound(var("a")));
        let binding = Binding::from_iter([(var("a"), ex("a").into())]);

        assert_eq!(
            substitute(&plan, &binding).unwrap(),
            Algebra::filter(
                Algebra::unit(),
                Expression::Constant(Literal::from(true).into())
            )
        );
    }

    #[test]
    fn binds_graph_variables() {
        let plan = Algebra::graph(NamedGraphPattern::Variable(var("g")), Algebra::bgp([spo()]));
        let binding = Binding::from_iter([(var("g"), BlankNode::new_unchecked("g").into())]);

        assert_eq!(
            substitute(&plan, &binding).unwrap(),
            Algebra::graph(
                NamedGraphPattern::BlankNode(BlankNode::new_unchecked("g")),
                Algebra::bgp([spo()])
            )
        );
    }

    #[test]
    fn rejects_literal_predicates() {
        let plan = Algebra::bgp([spo()]);
        let binding = Binding::from_iter([(var("p"), Literal::new_simple_literal("p").into())]);

        assert!(matches!(
            substitute(&plan, &binding),
            Err(SubstitutionError::InvalidPredicate { .. })
        ));
    }

    #[test]
    fn rejects_literal_graph_names() {
        let plan = Algebra::graph(NamedGraphPattern::Variable(var("g")), Algebra::bgp([spo()]));
        let binding = Binding::from_iter([(var("g"), Literal::new_simple_literal("g").into())]);

        assert!(matches!(
            substitute(&plan, &binding),
            Err(SubstitutionError::InvalidGraphName { .. })
        ));
    }

    #[test]
    fn substitutes_group_keys_only() {
        let count = AggregateExpression::Count {
            expression: Some(var("s").into()),
            distinct: false,
        };
        let plan = Algebra::group(Algebra::bgp([spo()]), [var("s")], [(var("c"), count)]);
        let binding = Binding::from_iter([
            (var("s"), ex("s").into()),
            (var("o"), ex("o").into()),
        ]);

        let substituted = substitute(&plan, &binding).unwrap();
        insta::assert_snapshot!(substituted, @r"
        Group: (?s) [?c := count(<http://example/ns#s>)]
          Bgp: (<http://example/ns#s> ?p ?o)
        ");
    }

    #[test]
    fn minus_keeps_shared_substituted_variables() {
        let right = TriplePattern {
            subject: var("s").into(),
            predicate: ex("q").into(),
            object: var("z").into(),
        };
        let plan = Algebra::minus(Algebra::bgp([spo()]), Algebra::bgp([right]));
        let binding = Binding::from_iter([(var("s"), ex("s").into())]);

        let substituted = substitute(&plan, &binding).unwrap();
        insta::assert_snapshot!(substituted, @r"
        Minus
          Extend: ?s := <http://example/ns#s>
            Bgp: (<http://example/ns#s> ?p ?o)
          Extend: ?s := <http://example/ns#s>
            Bgp: (<http://example/ns#s> <http://example/ns#q> ?z)
        ");
    }
}
