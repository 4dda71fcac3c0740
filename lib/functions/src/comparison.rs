use rdf_query_model::{TermRef, ThinError, ThinResult, TypedValueRef};
use std::cmp::Ordering;

/// The `=` operator.
///
/// Values of known datatypes are compared by value, so `1` equals `1.0`. Literals of unknown
/// datatypes are only known to be equal if they are the same term; otherwise the comparison is an
/// error.
pub fn equal(lhs: TermRef<'_>, rhs: TermRef<'_>) -> ThinResult<bool> {
    if lhs == rhs {
        return Ok(true);
    }

    match (TypedValueRef::from(lhs), TypedValueRef::from(rhs)) {
        (TypedValueRef::NumericLiteral(lhs), TypedValueRef::NumericLiteral(rhs)) => {
            Ok(lhs.partial_cmp(&rhs) == Some(Ordering::Equal))
        }
        (TypedValueRef::BooleanLiteral(lhs), TypedValueRef::BooleanLiteral(rhs)) => Ok(lhs == rhs),
        (TypedValueRef::SimpleLiteral(lhs), TypedValueRef::SimpleLiteral(rhs)) => Ok(lhs == rhs),
        (
            TypedValueRef::LanguageStringLiteral {
                value: lhs_value,
                language: lhs_language,
            },
            TypedValueRef::LanguageStringLiteral {
                value: rhs_value,
                language: rhs_language,
            },
        ) => Ok(lhs_value == rhs_value && lhs_language.eq_ignore_ascii_case(rhs_language)),
        (TypedValueRef::OtherLiteral(_), rhs) if is_literal(rhs) => ThinError::expected(),
        (lhs, TypedValueRef::OtherLiteral(_)) if is_literal(lhs) => ThinError::expected(),
        _ => Ok(false),
    }
}

fn is_literal(value: TypedValueRef<'_>) -> bool {
    !matches!(
        value,
        TypedValueRef::NamedNode(_) | TypedValueRef::BlankNode(_)
    )
}

/// The ordering used by `<`, `<=`, `>` and `>=`.
///
/// Only numerics, booleans and simple literals can be ordered, and only among their own kind.
pub fn compare(lhs: TermRef<'_>, rhs: TermRef<'_>) -> ThinResult<Ordering> {
    let ordering = match (TypedValueRef::from(lhs), TypedValueRef::from(rhs)) {
        (TypedValueRef::NumericLiteral(lhs), TypedValueRef::NumericLiteral(rhs)) => {
            lhs.partial_cmp(&rhs)
        }
        (TypedValueRef::BooleanLiteral(lhs), TypedValueRef::BooleanLiteral(rhs)) => {
            Some(lhs.cmp(&rhs))
        }
        (TypedValueRef::SimpleLiteral(lhs), TypedValueRef::SimpleLiteral(rhs)) => {
            Some(lhs.cmp(rhs))
        }
        _ => None,
    };
    ordering.ok_or(ThinError::default())
}

/// The `sameTerm` function: strict term equality.
pub fn same_term(lhs: TermRef<'_>, rhs: TermRef<'_>) -> bool {
    lhs == rhs
}
