use crate::sparql::OptimizationLevel;
use rdf_query_functions::ExpressionEvaluator;
use rdf_query_logical::Algebra;
use std::fmt::Debug;
use std::rc::Rc;
use tracing::trace;

mod constant_folding;
mod empty_propagation;
mod join_simplification;

pub use constant_folding::ConstantFoldingRule;
pub use empty_propagation::EmptyPropagationRule;
pub use join_simplification::JoinSimplificationRule;

/// The result of applying an [OptimizerRule] to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub plan: Algebra,
    pub transformed: bool,
}

impl Transformed {
    pub fn new(plan: Algebra, transformed: bool) -> Self {
        Self { plan, transformed }
    }

    pub fn yes(plan: Algebra) -> Self {
        Self::new(plan, true)
    }

    pub fn no(plan: Algebra) -> Self {
        Self::new(plan, false)
    }
}

/// A local rewrite of a single algebra node.
///
/// A rule must not change the solutions of the node, and it must only report a transformation if
/// it actually changed the node. The [Optimizer] relies on the latter to detect its fixed point.
pub trait OptimizerRule: Debug {
    fn name(&self) -> &str;

    /// Rewrites `node`, whose children have already been rewritten.
    fn rewrite(&self, node: Algebra) -> Transformed;
}

/// Applies a list of [OptimizerRule]s bottom-up until none of them changes the plan anymore.
///
/// As the result is a fixed point of the rules, optimizing an optimized plan returns it unchanged.
#[derive(Debug)]
pub struct Optimizer {
    rules: Vec<Box<dyn OptimizerRule>>,
}

impl Optimizer {
    pub fn new(rules: Vec<Box<dyn OptimizerRule>>) -> Self {
        Self { rules }
    }

    /// Creates an optimizer with the rules of the given `level`.
    pub fn with_level(level: OptimizationLevel, expressions: Rc<ExpressionEvaluator>) -> Self {
        let rules: Vec<Box<dyn OptimizerRule>> = match level {
            OptimizationLevel::None => Vec::new(),
            OptimizationLevel::Default => vec![
                Box::new(ConstantFoldingRule::new(expressions)),
                Box::new(EmptyPropagationRule),
            ],
            OptimizationLevel::Full => vec![
                Box::new(ConstantFoldingRule::new(expressions)),
                Box::new(EmptyPropagationRule),
                Box::new(JoinSimplificationRule),
            ],
        };
        Self::new(rules)
    }

    pub fn optimize(&self, plan: Algebra) -> Algebra {
        let mut plan = plan;
        loop {
            let pass = self.apply_rules(plan);
            if !pass.transformed {
                return pass.plan;
            }
            plan = pass.plan;
        }
    }

    fn apply_rules(&self, plan: Algebra) -> Transformed {
        let mut transformed = false;
        let plan = plan.transform_up(&mut |node| {
            self.rules.iter().fold(node, |node, rule| {
                let result = rule.rewrite(node);
                if result.transformed {
                    trace!(rule = rule.name(), "Applied optimizer rule");
                    transformed = true;
                }
                result.plan
            })
        });
        Transformed::new(plan, transformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_query_logical::{AggregateExpression, Expression, Function, Query};
    use rdf_query_model::{Literal, NamedNode, TriplePattern, Variable};

    fn optimizer() -> Optimizer {
        Optimizer::with_level(OptimizationLevel::Full, Rc::default())
    }

    fn pattern(query: &str) -> Algebra {
        Query::parse(query, None).unwrap().pattern().clone()
    }

    #[test]
    fn optimize_is_idempotent() {
        let plans = [
            pattern("SELECT ?s WHERE { ?s ?p ?o { ?o ?q ?r } FILTER(1 + 1 = 2) }"),
            pattern("SELECT ?s WHERE { { ?s ?p ?o } UNION { ?s ?q ?o FILTER(false) } }"),
            pattern("SELECT ?s WHERE { ?s ?p ?o OPTIONAL { ?o ?q ?r FILTER(\"a\" = \"b\") } }"),
            pattern("ASK { ?s ?p ?o MINUS { ?s ?p ?x FILTER(?x != ?x) } }"),
        ];

        let optimizer = optimizer();
        for plan in plans {
            let once = optimizer.optimize(plan);
            assert_eq!(optimizer.optimize(once.clone()), once);
        }
    }

    #[test]
    fn folds_constant_filters() {
        let plan = pattern("SELECT ?s WHERE { ?s ?p ?o FILTER(1 + 1 = 2) }");
        insta::assert_snapshot!(optimizer().optimize(plan), @r"
        Project: ?s
          Bgp: (?s ?p ?o)
        ");

        let plan = pattern("SELECT ?s WHERE { ?s ?p ?o FILTER(STRLEN(\"abc\") > 5) }");
        insta::assert_snapshot!(optimizer().optimize(plan), @"Empty");
    }

    #[test]
    fn filter_errors_remove_the_pattern() {
        let error_filter = Algebra::filter(
            Algebra::unit(),
            Expression::call(
                Function::StrLen,
                [Expression::constant(NamedNode::new_unchecked("http://constant"))],
            ),
        );
        assert_eq!(optimizer().optimize(error_filter), Algebra::Empty);
    }

    #[test]
    fn keeps_filters_over_variables() {
        let plan = pattern("ASK { FILTER(?a = ?b) }");
        insta::assert_snapshot!(optimizer().optimize(plan), @r"
        Filter: (?a = ?b)
          Bgp: unit
        ");
    }

    #[test]
    fn empty_union_branches_disappear() {
        let plan = pattern("SELECT ?s WHERE { { ?s ?p ?o } UNION { ?s ?q ?o FILTER(false) } }");
        insta::assert_snapshot!(optimizer().optimize(plan), @r"
        Project: ?s
          Bgp: (?s ?p ?o)
        ");
    }

    #[test]
    fn joins_of_basic_graph_patterns_are_merged() {
        let triple = |s: &str, o: &str| TriplePattern {
            subject: Variable::new_unchecked(s).into(),
            predicate: NamedNode::new_unchecked("http://example/ns#p").into(),
            object: Variable::new_unchecked(o).into(),
        };
        let plan = Algebra::join(
            Algebra::join(Algebra::unit(), Algebra::bgp([triple("s", "o")])),
            Algebra::bgp([triple("o", "r")]),
        );
        insta::assert_snapshot!(optimizer().optimize(plan), @"Bgp: (?s <http://example/ns#p> ?o), (?o <http://example/ns#p> ?r)");
    }

    #[test]
    fn group_without_keys_survives_empty_input() {
        let count = Variable::new_unchecked("c");
        let plan = Algebra::group(
            Algebra::filter(Algebra::unit(), Expression::constant(Literal::from(false))),
            Vec::<Variable>::new(),
            [(
                count,
                AggregateExpression::Count {
                    expression: None,
                    distinct: false,
                },
            )],
        );
        insta::assert_snapshot!(optimizer().optimize(plan), @r"
        Group: () [?c := count(*)]
          Empty
        ");
    }

    #[test]
    fn level_none_keeps_the_plan() {
        let plan = pattern("SELECT ?s WHERE { ?s ?p ?o FILTER(true) }");
        let optimizer = Optimizer::with_level(OptimizationLevel::None, Rc::default());
        assert_eq!(optimizer.optimize(plan.clone()), plan);
    }
}
