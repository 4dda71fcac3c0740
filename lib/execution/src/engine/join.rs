use crate::engine::{PlanEvaluator, SolutionIter};
use rdf_query_functions::ExpressionEvaluator;
use rdf_query_logical::{Algebra, Expression};
use rdf_query_model::{Binding, Graph};
use std::rc::Rc;

/// The right side of a binary operator. It is evaluated when it is first needed and then kept in
/// memory.
pub(super) struct LazySolutions<'a> {
    evaluator: PlanEvaluator<'a>,
    plan: Algebra,
    seed: Binding,
    graph: &'a Graph,
    solutions: Option<Rc<[Binding]>>,
}

impl<'a> LazySolutions<'a> {
    pub(super) fn new(
        evaluator: PlanEvaluator<'a>,
        plan: Algebra,
        seed: Binding,
        graph: &'a Graph,
    ) -> Self {
        Self {
            evaluator,
            plan,
            seed,
            graph,
            solutions: None,
        }
    }

    fn get(&mut self) -> Rc<[Binding]> {
        if let Some(solutions) = &self.solutions {
            return Rc::clone(solutions);
        }

        let solutions = self
            .evaluator
            .evaluate_in(&self.plan, self.seed.clone(), self.graph)
            .collect::<Rc<[Binding]>>();
        self.solutions = Some(Rc::clone(&solutions));
        solutions
    }
}

pub(super) fn join<'a>(left: SolutionIter<'a>, mut right: LazySolutions<'a>) -> SolutionIter<'a> {
    Box::new(left.flat_map(move |left| {
        let right = right.get();
        (0..right.len()).filter_map(move |index| {
            right
                .get(index)
                .and_then(|solution| solution.merge(&left))
        })
    }))
}

pub(super) fn left_join<'a>(
    left: SolutionIter<'a>,
    mut right: LazySolutions<'a>,
    expression: Option<Expression>,
    expressions: Rc<ExpressionEvaluator>,
) -> SolutionIter<'a> {
    Box::new(left.flat_map(move |left| {
        let matches = right
            .get()
            .iter()
            .filter_map(|solution| solution.merge(&left))
            .filter(|solution| {
                expression.as_ref().map_or(true, |expression| {
                    expressions.effective_boolean_value(expression, solution) == Ok(true)
                })
            })
            .collect::<Vec<_>>();
        if matches.is_empty() {
            vec![left]
        } else {
            matches
        }
    }))
}

/// Keeps the left solutions that have no compatible right solution sharing a variable with them.
pub(super) fn minus<'a>(left: SolutionIter<'a>, mut right: LazySolutions<'a>) -> SolutionIter<'a> {
    Box::new(left.filter(move |left| {
        !right
            .get()
            .iter()
            .any(|solution| shares_variable(left, solution) && left.is_compatible(solution))
    }))
}

fn shares_variable(lhs: &Binding, rhs: &Binding) -> bool {
    lhs.variables().any(|variable| rhs.contains(variable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_query_model::{Dataset, NamedNode, Variable};

    fn binding(entries: &[(&str, &str)]) -> Binding {
        entries
            .iter()
            .map(|(variable, value)| {
                (
                    Variable::new_unchecked(*variable),
                    NamedNode::new_unchecked(format!("http://example/ns#{value}")).into(),
                )
            })
            .collect()
    }

    #[test]
    fn minus_requires_a_shared_variable() {
        let left = binding(&[("x", "a")]);
        assert!(!shares_variable(&left, &binding(&[("y", "a")])));
        assert!(shares_variable(&left, &binding(&[("x", "b"), ("y", "a")])));
    }

    #[test]
    fn right_side_is_evaluated_once_on_demand() {
        let dataset = Dataset::new();
        let mut right = LazySolutions::new(
            PlanEvaluator::new(&dataset, Rc::default()),
            Algebra::unit(),
            Binding::new(),
            dataset.default_graph(),
        );
        assert!(right.solutions.is_none());

        let first = right.get();
        assert_eq!(first.len(), 1);
        assert!(Rc::ptr_eq(&first, &right.get()));
    }
}
