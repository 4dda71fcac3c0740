use crate::sparql::optimizer::{OptimizerRule, Transformed};
use rdf_query_functions::ExpressionEvaluator;
use rdf_query_logical::{Algebra, Expression};
use rdf_query_model::Binding;
use std::rc::Rc;

/// Evaluates expressions that do not depend on a solution.
///
/// A filter whose condition is constant either keeps every solution or none. As an evaluation
/// error drops the solution, a filter that always fails is replaced by [Algebra::Empty] as well.
#[derive(Debug)]
pub struct ConstantFoldingRule {
    expressions: Rc<ExpressionEvaluator>,
}

impl ConstantFoldingRule {
    pub fn new(expressions: Rc<ExpressionEvaluator>) -> Self {
        Self { expressions }
    }

    /// Replaces every ground sub-expression that evaluates without an error by its value.
    fn fold(&self, expression: Expression) -> (Expression, bool) {
        let mut folded = false;
        let empty = Binding::new();
        let expression = expression.transform_up(&mut |node| {
            if matches!(node, Expression::Constant(_)) || !node.is_ground() {
                return node;
            }
            match self.expressions.evaluate(&node, &empty) {
                Ok(term) => {
                    folded = true;
                    Expression::Constant(term)
                }
                Err(_) => node,
            }
        });
        (expression, folded)
    }

    fn always_true(&self, expression: &Expression) -> bool {
        self.expressions
            .effective_boolean_value(expression, &Binding::new())
            .unwrap_or(false)
    }
}

impl OptimizerRule for ConstantFoldingRule {
    fn name(&self) -> &str {
        "constant_folding"
    }

    fn rewrite(&self, node: Algebra) -> Transformed {
        match node {
            Algebra::Filter { inner, expression } => {
                let (expression, folded) = self.fold(expression);
                if !expression.is_ground() {
                    return Transformed::new(Algebra::filter(*inner, expression), folded);
                }

                if self.always_true(&expression) {
                    Transformed::yes(*inner)
                } else {
                    Transformed::yes(Algebra::Empty)
                }
            }
            Algebra::LeftJoin {
                left,
                right,
                expression: Some(expression),
            } => {
                let (expression, folded) = self.fold(expression);
                if !expression.is_ground() {
                    return Transformed::new(
                        Algebra::left_join(*left, *right, Some(expression)),
                        folded,
                    );
                }

                // The optional part never matches if its condition never holds.
                let right = if self.always_true(&expression) {
                    *right
                } else {
                    Algebra::Empty
                };
                Transformed::yes(Algebra::left_join(*left, right, None))
            }
            Algebra::Extend {
                inner,
                variable,
                expression,
            } => {
                let (expression, folded) = self.fold(expression);
                Transformed::new(Algebra::extend(*inner, variable, expression), folded)
            }
            node => Transformed::no(node),
        }
    }
}
