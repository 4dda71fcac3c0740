use crate::numeric::{arithmetic, negate, numeric, ArithmeticOp};
use crate::op::boolean;
use crate::{compare, effective_boolean_value, equal, same_term, FunctionRegistry};
use rdf_query_logical::{Expression, Function};
use rdf_query_model::{Binding, Term, TermRef, ThinError, ThinResult};
use std::cmp::Ordering;

/// Evaluates [Expression]s against a solution.
///
/// Errors are [ThinError]s: the caller decides what an error means (a filter rejects the
/// solution, an extension leaves the variable unbound).
#[derive(Debug, Default)]
pub struct ExpressionEvaluator {
    registry: FunctionRegistry,
}

impl ExpressionEvaluator {
    pub fn new(registry: FunctionRegistry) -> Self {
        Self { registry }
    }

    pub fn evaluate(&self, expression: &Expression, solution: &Binding) -> ThinResult<Term> {
        match expression {
            Expression::Constant(term) => Ok(term.clone()),
            Expression::Variable(variable) => match solution.get(variable) {
                Some(term) => Ok(term.clone()),
                None => ThinError::expected(),
            },
            Expression::Or(lhs, rhs) => {
                // An error on one side is masked by `true` on the other.
                match self.effective_boolean_value(lhs, solution) {
                    Ok(true) => Ok(boolean(true)),
                    Ok(false) => self.effective_boolean_value(rhs, solution).map(boolean),
                    Err(error) => match self.effective_boolean_value(rhs, solution) {
                        Ok(true) => Ok(boolean(true)),
                        _ => Err(error),
                    },
                }
            }
            Expression::And(lhs, rhs) => match self.effective_boolean_value(lhs, solution) {
                Ok(false) => Ok(boolean(false)),
                Ok(true) => self.effective_boolean_value(rhs, solution).map(boolean),
                Err(error) => match self.effective_boolean_value(rhs, solution) {
                    Ok(false) => Ok(boolean(false)),
                    _ => Err(error),
                },
            },
            Expression::Not(inner) => self
                .effective_boolean_value(inner, solution)
                .map(|value| boolean(!value)),
            Expression::Equal(lhs, rhs) => self.binary(lhs, rhs, solution, equal).map(boolean),
            Expression::SameTerm(lhs, rhs) => self
                .binary(lhs, rhs, solution, |lhs, rhs| Ok(same_term(lhs, rhs)))
                .map(boolean),
            Expression::Greater(lhs, rhs) => self.ordering(lhs, rhs, solution, Ordering::is_gt),
            Expression::GreaterOrEqual(lhs, rhs) => {
                self.ordering(lhs, rhs, solution, Ordering::is_ge)
            }
            Expression::Less(lhs, rhs) => self.ordering(lhs, rhs, solution, Ordering::is_lt),
            Expression::LessOrEqual(lhs, rhs) => {
                self.ordering(lhs, rhs, solution, Ordering::is_le)
            }
            Expression::In(needle, haystack) => self.evaluate_in(needle, haystack, solution),
            Expression::Add(lhs, rhs) => self.arithmetic(ArithmeticOp::Add, lhs, rhs, solution),
            Expression::Subtract(lhs, rhs) => {
                self.arithmetic(ArithmeticOp::Subtract, lhs, rhs, solution)
            }
            Expression::Multiply(lhs, rhs) => {
                self.arithmetic(ArithmeticOp::Multiply, lhs, rhs, solution)
            }
            Expression::Divide(lhs, rhs) => {
                self.arithmetic(ArithmeticOp::Divide, lhs, rhs, solution)
            }
            Expression::UnaryPlus(inner) => {
                let value = numeric(&self.evaluate(inner, solution)?)?;
                Ok(value.into_literal().into())
            }
            Expression::UnaryMinus(inner) => {
                let value = numeric(&self.evaluate(inner, solution)?)?;
                Ok(negate(value)?.into_literal().into())
            }
            Expression::Bound(variable) => Ok(boolean(solution.contains(variable))),
            Expression::If(test, if_true, if_false) => {
                if self.effective_boolean_value(test, solution)? {
                    self.evaluate(if_true, solution)
                } else {
                    self.evaluate(if_false, solution)
                }
            }
            Expression::Coalesce(args) => args
                .iter()
                .find_map(|arg| self.evaluate(arg, solution).ok())
                .ok_or(ThinError::default()),
            Expression::FunctionCall(function, args) => {
                self.evaluate_function(*function, args, solution)
            }
        }
    }

    /// Evaluates `expression` and computes its effective boolean value.
    pub fn effective_boolean_value(
        &self,
        expression: &Expression,
        solution: &Binding,
    ) -> ThinResult<bool> {
        let term = self.evaluate(expression, solution)?;
        effective_boolean_value(term.as_ref())
    }

    fn binary(
        &self,
        lhs: &Expression,
        rhs: &Expression,
        solution: &Binding,
        op: impl FnOnce(TermRef<'_>, TermRef<'_>) -> ThinResult<bool>,
    ) -> ThinResult<bool> {
        let lhs = self.evaluate(lhs, solution)?;
        let rhs = self.evaluate(rhs, solution)?;
        op(lhs.as_ref(), rhs.as_ref())
    }

    fn ordering(
        &self,
        lhs: &Expression,
        rhs: &Expression,
        solution: &Binding,
        accept: impl FnOnce(Ordering) -> bool,
    ) -> ThinResult<Term> {
        self.binary(lhs, rhs, solution, |lhs, rhs| compare(lhs, rhs).map(accept))
            .map(boolean)
    }

    fn arithmetic(
        &self,
        op: ArithmeticOp,
        lhs: &Expression,
        rhs: &Expression,
        solution: &Binding,
    ) -> ThinResult<Term> {
        let lhs = numeric(&self.evaluate(lhs, solution)?)?;
        let rhs = numeric(&self.evaluate(rhs, solution)?)?;
        Ok(arithmetic(op, lhs, rhs)?.into_literal().into())
    }

    /// `IN` is true if any member is equal. Errors only matter if no member matches.
    fn evaluate_in(
        &self,
        needle: &Expression,
        haystack: &[Expression],
        solution: &Binding,
    ) -> ThinResult<Term> {
        let needle = self.evaluate(needle, solution)?;
        let mut error = None;
        for candidate in haystack {
            let result = self
                .evaluate(candidate, solution)
                .and_then(|candidate| equal(needle.as_ref(), candidate.as_ref()));
            match result {
                Ok(true) => return Ok(boolean(true)),
                Ok(false) => {}
                Err(e) => error = Some(e),
            }
        }
        match error {
            None => Ok(boolean(false)),
            Some(error) => Err(error),
        }
    }

    fn evaluate_function(
        &self,
        function: Function,
        args: &[Expression],
        solution: &Binding,
    ) -> ThinResult<Term> {
        let op = self.registry.get(function).ok_or(ThinError::default())?;
        if !op.arity().accepts(args.len()) {
            return ThinError::expected();
        }

        let args = args
            .iter()
            .map(|arg| self.evaluate(arg, solution))
            .collect::<ThinResult<Vec<_>>>()?;
        let args = args.iter().map(Term::as_ref).collect::<Vec<_>>();
        op.evaluate(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_query_model::{Literal, NamedNode, Variable};

    fn var(name: &str) -> Variable {
        Variable::new_unchecked(name)
    }

    fn evaluate(expression: &Expression, solution: &Binding) -> ThinResult<Term> {
        ExpressionEvaluator::default().evaluate(expression, solution)
    }

    #[test]
    fn unbound_variables_are_errors() {
        let solution = Binding::new();
        assert!(evaluate(&Expression::Variable(var("a")), &solution).is_err());
        assert_eq!(
            evaluate(&Expression::Bound(var("a")), &solution),
            Ok(boolean(false))
        );
    }

    #[test]
    fn logical_operators_mask_errors() {
        let solution = Binding::new();
        let error = Expression::Variable(var("unbound"));
        let yes = Expression::constant(Literal::from(true));
        let no = Expression::constant(Literal::from(false));

        assert_eq!(
            evaluate(&Expression::or(error.clone(), yes.clone()), &solution),
            Ok(boolean(true))
        );
        assert_eq!(
            evaluate(&Expression::and(error.clone(), no.clone()), &solution),
            Ok(boolean(false))
        );
        assert!(evaluate(&Expression::or(error.clone(), no), &solution).is_err());
        assert!(evaluate(&Expression::and(yes, error), &solution).is_err());
    }

    #[test]
    fn compares_bound_variables() {
        let constant = NamedNode::new_unchecked("http://constant");
        let mut solution = Binding::new();
        solution.insert(var("a"), constant.clone());

        let expression = Expression::equal(var("a").into(), Expression::constant(constant));
        assert_eq!(evaluate(&expression, &solution), Ok(boolean(true)));
    }

    #[test]
    fn arithmetic_and_comparison() {
        let mut solution = Binding::new();
        solution.insert(var("x"), Literal::from(3_i64));

        let sum = Expression::Add(
            Box::new(var("x").into()),
            Box::new(Expression::constant(Literal::from(0.5_f64))),
        );
        let less = Expression::Less(
            Box::new(sum),
            Box::new(Expression::constant(Literal::from(4_i64))),
        );
        assert_eq!(evaluate(&less, &solution), Ok(boolean(true)));
    }

    #[test]
    fn coalesce_and_in() {
        let solution = Binding::new();
        let one = Expression::constant(Literal::from(1_i64));

        let coalesce = Expression::Coalesce(vec![var("unbound").into(), one.clone()]);
        assert_eq!(evaluate(&coalesce, &solution), Ok(Literal::from(1_i64).into()));

        let within = Expression::In(
            Box::new(one.clone()),
            vec![var("unbound").into(), one.clone()],
        );
        assert_eq!(evaluate(&within, &solution), Ok(boolean(true)));
        let missing = Expression::In(Box::new(one), vec![var("unbound").into()]);
        assert!(evaluate(&missing, &solution).is_err());
    }

    #[test]
    fn functions_check_their_arity() {
        let solution = Binding::new();
        let text = Expression::constant(Literal::new_simple_literal("x1"));

        let regex = Expression::call(
            Function::Regex,
            [text.clone(), Expression::constant(Literal::new_simple_literal("^x"))],
        );
        assert_eq!(evaluate(&regex, &solution), Ok(boolean(true)));
        assert!(evaluate(&Expression::call(Function::Regex, [text]), &solution).is_err());
    }
}
