use crate::rewriting::expression_rewriter::rewrite_expression;
use crate::template::{ConstructTemplate, GraphNameTemplate, QuadTemplate};
use crate::{AggregateExpression, Algebra, Expression, Query, QueryParseError};
use rdf_query_model::{BlankNode, TermPattern, TriplePattern, Variable};
use rustc_hash::FxHashMap;
use spargebra::algebra::{
    AggregateExpression as SparqlAggregate, AggregateFunction, Expression as SparqlExpression,
    GraphPattern,
};
use spargebra::term::{GraphNamePattern, QuadPattern};
use std::cell::RefCell;

/// Compiles the patterns of a parsed query into [Algebra].
///
/// Blank nodes in query patterns behave like variables that never appear in a result. Each blank
/// node label is therefore replaced by a hidden variable whose name can not be written in a query.
#[derive(Default)]
pub struct GraphPatternRewriter {
    state: RefCell<RewritingState>,
}

impl GraphPatternRewriter {
    pub fn rewrite_query(&self, query: &spargebra::Query) -> Result<Query, QueryParseError> {
        match query {
            spargebra::Query::Select {
                dataset, pattern, ..
            } => {
                reject_dataset(dataset.is_some())?;
                Ok(Query::Select {
                    variables: projected_variables(pattern),
                    pattern: self.rewrite(pattern)?,
                })
            }
            spargebra::Query::Ask {
                dataset, pattern, ..
            } => {
                reject_dataset(dataset.is_some())?;
                Ok(Query::Ask {
                    pattern: self.rewrite(pattern)?,
                })
            }
            spargebra::Query::Construct {
                template,
                dataset,
                pattern,
                ..
            } => {
                reject_dataset(dataset.is_some())?;
                Ok(Query::Construct {
                    template: ConstructTemplate::from_triples(template.iter().cloned()),
                    pattern: self.rewrite(pattern)?,
                })
            }
            spargebra::Query::Describe { .. } => QueryParseError::unsupported("DESCRIBE queries"),
        }
    }

    /// Compiles a `CONSTRUCT` query whose template may write into named graphs.
    pub fn rewrite_construct_quads(
        &self,
        template: &[QuadPattern],
        pattern: &GraphPattern,
    ) -> Result<Query, QueryParseError> {
        let template = template.iter().map(|quad| QuadTemplate {
            subject: quad.subject.clone(),
            predicate: quad.predicate.clone(),
            object: quad.object.clone(),
            graph_name: match &quad.graph_name {
                GraphNamePattern::DefaultGraph => GraphNameTemplate::DefaultGraph,
                GraphNamePattern::NamedNode(node) => GraphNameTemplate::NamedNode(node.clone()),
                GraphNamePattern::Variable(variable) => {
                    GraphNameTemplate::Variable(variable.clone())
                }
            },
        });
        Ok(Query::Construct {
            template: ConstructTemplate::new(template),
            pattern: self.rewrite(pattern)?,
        })
    }

    pub fn rewrite(&self, pattern: &GraphPattern) -> Result<Algebra, QueryParseError> {
        match pattern {
            GraphPattern::Bgp { patterns } => Ok(Algebra::bgp(
                patterns
                    .iter()
                    .map(|pattern| self.rewrite_triple_pattern(pattern)),
            )),
            GraphPattern::Project { inner, variables } => Ok(Algebra::project(
                self.rewrite(inner)?,
                variables.iter().cloned(),
            )),
            GraphPattern::Filter { expr, inner } => self.rewrite_filter(self.rewrite(inner)?, expr),
            GraphPattern::Extend {
                inner,
                variable,
                expression,
            } => Ok(Algebra::extend(
                self.rewrite(inner)?,
                variable.clone(),
                rewrite_expression(expression)?,
            )),
            GraphPattern::Join { left, right } => {
                Ok(Algebra::join(self.rewrite(left)?, self.rewrite(right)?))
            }
            GraphPattern::LeftJoin {
                left,
                right,
                expression,
            } => Ok(Algebra::left_join(
                self.rewrite(left)?,
                self.rewrite(right)?,
                expression.as_ref().map(rewrite_expression).transpose()?,
            )),
            GraphPattern::Union { left, right } => {
                Ok(Algebra::union(self.rewrite(left)?, self.rewrite(right)?))
            }
            GraphPattern::Minus { left, right } => {
                Ok(Algebra::minus(self.rewrite(left)?, self.rewrite(right)?))
            }
            GraphPattern::Graph { name, inner } => {
                Ok(Algebra::graph(name.clone(), self.rewrite(inner)?))
            }
            GraphPattern::Distinct { inner } => Ok(Algebra::distinct(self.rewrite(inner)?)),
            // REDUCED permits but does not require removing duplicates.
            GraphPattern::Reduced { inner } => self.rewrite(inner),
            GraphPattern::Slice {
                inner,
                start,
                length,
            } => Ok(Algebra::slice(self.rewrite(inner)?, *start, *length)),
            GraphPattern::Group {
                inner,
                variables,
                aggregates,
            } => {
                let aggregates = aggregates
                    .iter()
                    .map(|(variable, aggregate)| {
                        rewrite_aggregate(aggregate).map(|aggregate| (variable.clone(), aggregate))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Algebra::group(
                    self.rewrite(inner)?,
                    variables.iter().cloned(),
                    aggregates,
                ))
            }
            GraphPattern::Path { .. } => QueryParseError::unsupported("property paths"),
            GraphPattern::Values { .. } => QueryParseError::unsupported("VALUES"),
            GraphPattern::OrderBy { .. } => QueryParseError::unsupported("ORDER BY"),
            GraphPattern::Service { .. } => QueryParseError::unsupported("SERVICE"),
            #[allow(unreachable_patterns, reason = "Depends on the features of spargebra")]
            _ => QueryParseError::unsupported(format!("graph pattern {pattern}")),
        }
    }

    /// Splits the conjunction of a filter. `NOT EXISTS` conjuncts become [Algebra::NotExists]
    /// nodes, the remaining conjuncts stay in a single filter.
    fn rewrite_filter(
        &self,
        inner: Algebra,
        expression: &SparqlExpression,
    ) -> Result<Algebra, QueryParseError> {
        let mut conjuncts = Vec::new();
        collect_conjuncts(expression, &mut conjuncts);

        let mut plan = inner;
        let mut remaining: Option<Expression> = None;
        for conjunct in conjuncts {
            if let SparqlExpression::Not(negated) = conjunct {
                if let SparqlExpression::Exists(pattern) = negated.as_ref() {
                    plan = Algebra::not_exists(plan, self.rewrite(pattern)?);
                    continue;
                }
            }

            let conjunct = rewrite_expression(conjunct)?;
            remaining = Some(match remaining {
                None => conjunct,
                Some(previous) => Expression::and(previous, conjunct),
            });
        }

        Ok(match remaining {
            None => plan,
            Some(expression) => Algebra::filter(plan, expression),
        })
    }

    fn rewrite_triple_pattern(&self, pattern: &TriplePattern) -> TriplePattern {
        TriplePattern {
            subject: self.rewrite_term_pattern(&pattern.subject),
            predicate: pattern.predicate.clone(),
            object: self.rewrite_term_pattern(&pattern.object),
        }
    }

    fn rewrite_term_pattern(&self, pattern: &TermPattern) -> TermPattern {
        match pattern {
            TermPattern::BlankNode(node) => TermPattern::Variable(self.hidden_variable(node)),
            _ => pattern.clone(),
        }
    }

    fn hidden_variable(&self, node: &BlankNode) -> Variable {
        let mut state = self.state.borrow_mut();
        let next = state.blank_nodes.len();
        state
            .blank_nodes
            .entry(node.clone())
            .or_insert_with(|| Variable::new_unchecked(format!("bnode.{next}")))
            .clone()
    }
}

#[derive(Default)]
struct RewritingState {
    /// The hidden variables that replace the blank nodes of the query patterns.
    blank_nodes: FxHashMap<BlankNode, Variable>,
}

fn reject_dataset(has_dataset: bool) -> Result<(), QueryParseError> {
    if has_dataset {
        return QueryParseError::unsupported("FROM and FROM NAMED clauses");
    }
    Ok(())
}

/// Returns the variables of the outermost projection.
fn projected_variables(pattern: &GraphPattern) -> Vec<Variable> {
    match pattern {
        GraphPattern::Project { variables, .. } => variables.clone(),
        GraphPattern::Distinct { inner }
        | GraphPattern::Reduced { inner }
        | GraphPattern::Slice { inner, .. }
        | GraphPattern::OrderBy { inner, .. } => projected_variables(inner),
        _ => Vec::new(),
    }
}

fn collect_conjuncts<'a>(
    expression: &'a SparqlExpression,
    conjuncts: &mut Vec<&'a SparqlExpression>,
) {
    match expression {
        SparqlExpression::And(lhs, rhs) => {
            collect_conjuncts(lhs, conjuncts);
            collect_conjuncts(rhs, conjuncts);
        }
        _ => conjuncts.push(expression),
    }
}

fn rewrite_aggregate(aggregate: &SparqlAggregate) -> Result<AggregateExpression, QueryParseError> {
    match aggregate {
        SparqlAggregate::CountSolutions { distinct } => Ok(AggregateExpression::Count {
            expression: None,
            distinct: *distinct,
        }),
        SparqlAggregate::FunctionCall {
            name: AggregateFunction::Count,
            expr,
            distinct,
        } => Ok(AggregateExpression::Count {
            expression: Some(rewrite_expression(expr)?),
            distinct: *distinct,
        }),
        SparqlAggregate::FunctionCall { name, .. } => {
            QueryParseError::unsupported(format!("aggregate function {name:?}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(query: &str) -> Query {
        let query = spargebra::Query::parse(query, None).unwrap();
        GraphPatternRewriter::default().rewrite_query(&query).unwrap()
    }

    #[test]
    fn blank_nodes_become_hidden_variables() {
        let query = compile("SELECT * { _:a <http://p> ?o . _:a <http://q> _:b }");
        let Query::Select { variables, pattern } = query else {
            panic!("Expected a SELECT query")
        };

        assert_eq!(variables, vec![Variable::new_unchecked("o")]);
        insta::assert_snapshot!(pattern, @r"
        Project: ?o
          Bgp: (?bnode.0 <http://p> ?o), (?bnode.0 <http://q> ?bnode.1)
        ");
    }

    #[test]
    fn not_exists_is_split_from_filter() {
        let query = compile(
            "ASK { ?s ?p ?o FILTER(?o != 1 && NOT EXISTS { ?s <http://q> ?z }) }",
        );

        insta::assert_snapshot!(query.pattern(), @r#"
        Filter: !(?o = "1"^^<http://www.w3.org/2001/XMLSchema#integer>)
          NotExists
            Bgp: (?s ?p ?o)
            Bgp: (?s <http://q> ?z)
        "#);
    }
}
