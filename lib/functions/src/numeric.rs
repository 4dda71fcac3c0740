use rdf_query_model::{Decimal, Numeric, NumericPair, Term, ThinError, ThinResult, TypedValueRef};

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

pub(crate) fn numeric(term: &Term) -> ThinResult<Numeric> {
    match TypedValueRef::from(term) {
        TypedValueRef::NumericLiteral(value) => Ok(value),
        _ => ThinError::expected(),
    }
}

/// Applies `op` after promoting both operands to a common type. Integer division yields a
/// decimal. Overflows and decimal division by zero are errors.
pub(crate) fn arithmetic(op: ArithmeticOp, lhs: Numeric, rhs: Numeric) -> ThinResult<Numeric> {
    let result = match Numeric::promote(lhs, rhs) {
        NumericPair::Integer(lhs, rhs) => match op {
            ArithmeticOp::Add => lhs.checked_add(rhs).map(Numeric::Integer),
            ArithmeticOp::Subtract => lhs.checked_sub(rhs).map(Numeric::Integer),
            ArithmeticOp::Multiply => lhs.checked_mul(rhs).map(Numeric::Integer),
            ArithmeticOp::Divide => Decimal::from(lhs)
                .checked_div(Decimal::from(rhs))
                .map(Numeric::Decimal),
        },
        NumericPair::Decimal(lhs, rhs) => match op {
            ArithmeticOp::Add => lhs.checked_add(rhs),
            ArithmeticOp::Subtract => lhs.checked_sub(rhs),
            ArithmeticOp::Multiply => lhs.checked_mul(rhs),
            ArithmeticOp::Divide => lhs.checked_div(rhs),
        }
        .map(Numeric::Decimal),
        NumericPair::Double(lhs, rhs) => Some(Numeric::Double(match op {
            ArithmeticOp::Add => lhs + rhs,
            ArithmeticOp::Subtract => lhs - rhs,
            ArithmeticOp::Multiply => lhs * rhs,
            ArithmeticOp::Divide => lhs / rhs,
        })),
    };
    result.ok_or(ThinError::default())
}

pub(crate) fn negate(value: Numeric) -> ThinResult<Numeric> {
    match value {
        Numeric::Integer(value) => value.checked_neg().map(Numeric::Integer),
        Numeric::Decimal(value) => value.checked_neg().map(Numeric::Decimal),
        Numeric::Double(value) => Some(Numeric::Double(-value)),
    }
    .ok_or(ThinError::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_query_model::{Double, Integer};
    use std::str::FromStr;

    fn integer(value: i64) -> Numeric {
        Numeric::Integer(Integer::from(value))
    }

    #[test]
    fn integer_division_yields_decimal() {
        let result = arithmetic(ArithmeticOp::Divide, integer(1), integer(4)).unwrap();
        assert_eq!(
            result,
            Numeric::Decimal(Decimal::from_str("0.25").unwrap())
        );
    }

    #[test]
    fn division_by_zero() {
        assert!(arithmetic(ArithmeticOp::Divide, integer(1), integer(0)).is_err());
        let result = arithmetic(
            ArithmeticOp::Divide,
            Numeric::Double(Double::from(1.0)),
            integer(0),
        )
        .unwrap();
        assert_eq!(result, Numeric::Double(Double::from(f64::INFINITY)));
    }

    #[test]
    fn overflow_is_an_error() {
        assert!(arithmetic(ArithmeticOp::Add, integer(i64::MAX), integer(1)).is_err());
        assert!(negate(integer(i64::MIN)).is_err());
        assert_eq!(negate(integer(3)), Ok(integer(-3)));
    }
}
