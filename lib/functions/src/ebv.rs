use rdf_query_model::{
    is_numeric_datatype, vocab::xsd, TermRef, ThinError, ThinResult, TypedValueRef,
};

/// Computes the effective boolean value of a term, as used by `FILTER`, `&&`, `||` and `!`.
pub fn effective_boolean_value(term: TermRef<'_>) -> ThinResult<bool> {
    match TypedValueRef::from(term) {
        TypedValueRef::BooleanLiteral(value) => Ok(value),
        TypedValueRef::NumericLiteral(value) => Ok(!value.is_zero() && !value.is_nan()),
        TypedValueRef::SimpleLiteral(value) => Ok(!value.is_empty()),
        // Ill-formed booleans and numerics are false.
        TypedValueRef::OtherLiteral(literal)
            if literal.datatype() == xsd::BOOLEAN || is_numeric_datatype(literal.datatype()) =>
        {
            Ok(false)
        }
        _ => ThinError::expected(),
    }
}
