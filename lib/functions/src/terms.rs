use crate::op::boolean;
use crate::{ScalarSparqlOp, SparqlOpArity};
use rdf_query_model::vocab::rdf;
use rdf_query_model::{
    is_numeric_datatype, Literal, NamedNode, Term, TermRef, ThinError, ThinResult, TypedValueRef,
};

#[derive(Debug, Default)]
pub struct StrSparqlOp;

impl ScalarSparqlOp for StrSparqlOp {
    fn name(&self) -> &str {
        "str"
    }

    fn arity(&self) -> SparqlOpArity {
        SparqlOpArity::Fixed(1)
    }

    fn evaluate(&self, args: &[TermRef<'_>]) -> ThinResult<Term> {
        match args[0] {
            TermRef::NamedNode(node) => Ok(Literal::new_simple_literal(node.as_str()).into()),
            TermRef::Literal(literal) => Ok(Literal::new_simple_literal(literal.value()).into()),
            TermRef::BlankNode(_) => ThinError::expected(),
        }
    }
}

#[derive(Debug, Default)]
pub struct LangSparqlOp;

impl ScalarSparqlOp for LangSparqlOp {
    fn name(&self) -> &str {
        "lang"
    }

    fn arity(&self) -> SparqlOpArity {
        SparqlOpArity::Fixed(1)
    }

    fn evaluate(&self, args: &[TermRef<'_>]) -> ThinResult<Term> {
        match args[0] {
            TermRef::Literal(literal) => {
                Ok(Literal::new_simple_literal(literal.language().unwrap_or_default()).into())
            }
            _ => ThinError::expected(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DatatypeSparqlOp;

impl ScalarSparqlOp for DatatypeSparqlOp {
    fn name(&self) -> &str {
        "datatype"
    }

    fn arity(&self) -> SparqlOpArity {
        SparqlOpArity::Fixed(1)
    }

    fn evaluate(&self, args: &[TermRef<'_>]) -> ThinResult<Term> {
        match args[0] {
            TermRef::Literal(literal) if literal.language().is_some() => {
                Ok(NamedNode::from(rdf::LANG_STRING).into())
            }
            TermRef::Literal(literal) => Ok(literal.datatype().into_owned().into()),
            _ => ThinError::expected(),
        }
    }
}

macro_rules! create_term_test_op {
    ($STRUCT: ident, $NAME: expr, $TEST: expr) => {
        #[derive(Debug, Default)]
        pub struct $STRUCT;

        impl ScalarSparqlOp for $STRUCT {
            fn name(&self) -> &str {
                $NAME
            }

            fn arity(&self) -> SparqlOpArity {
                SparqlOpArity::Fixed(1)
            }

            fn evaluate(&self, args: &[TermRef<'_>]) -> ThinResult<Term> {
                let test: fn(TermRef<'_>) -> bool = $TEST;
                Ok(boolean(test(args[0])))
            }
        }
    };
}

create_term_test_op!(IsIriSparqlOp, "isIRI", |term| matches!(
    term,
    TermRef::NamedNode(_)
));
create_term_test_op!(IsBlankSparqlOp, "isBlank", |term| matches!(
    term,
    TermRef::BlankNode(_)
));
create_term_test_op!(IsLiteralSparqlOp, "isLiteral", |term| matches!(
    term,
    TermRef::Literal(_)
));
// Ill-formed numeric literals are not numeric.
create_term_test_op!(IsNumericSparqlOp, "isNumeric", |term| match term {
    TermRef::Literal(literal) => {
        is_numeric_datatype(literal.datatype())
            && matches!(TypedValueRef::from(term), TypedValueRef::NumericLiteral(_))
    }
    _ => false,
});

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_query_model::vocab::xsd;
    use rdf_query_model::BlankNode;

    #[test]
    fn str_of_iri_and_literal() {
        let iri = NamedNode::new_unchecked("http://example/ns#p1");
        let tagged = Literal::new_language_tagged_literal_unchecked("chat", "fr");

        assert_eq!(
            StrSparqlOp.evaluate(&[iri.as_ref().into()]),
            Ok(Literal::new_simple_literal("http://example/ns#p1").into())
        );
        assert_eq!(
            StrSparqlOp.evaluate(&[tagged.as_ref().into()]),
            Ok(Literal::new_simple_literal("chat").into())
        );
        assert!(StrSparqlOp
            .evaluate(&[BlankNode::default().as_ref().into()])
            .is_err());
    }

    #[test]
    fn datatype_of_literals() {
        let int = Literal::new_typed_literal("1", xsd::INT);
        let tagged = Literal::new_language_tagged_literal_unchecked("chat", "fr");

        assert_eq!(
            DatatypeSparqlOp.evaluate(&[int.as_ref().into()]),
            Ok(NamedNode::from(xsd::INT).into())
        );
        assert_eq!(
            DatatypeSparqlOp.evaluate(&[tagged.as_ref().into()]),
            Ok(NamedNode::from(rdf::LANG_STRING).into())
        );
    }

    #[test]
    fn is_numeric_rejects_ill_formed_literals() {
        let valid = Literal::new_typed_literal("12", xsd::INTEGER);
        let invalid = Literal::new_typed_literal("twelve", xsd::INTEGER);

        assert_eq!(
            IsNumericSparqlOp.evaluate(&[valid.as_ref().into()]),
            Ok(boolean(true))
        );
        assert_eq!(
            IsNumericSparqlOp.evaluate(&[invalid.as_ref().into()]),
            Ok(boolean(false))
        );
    }
}
