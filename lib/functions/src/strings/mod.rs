mod lang_matches;
mod regex;

use crate::op::boolean;
use crate::{ScalarSparqlOp, SparqlOpArity, StringLiteralRef};
use rdf_query_model::{Integer, Numeric, Term, TermRef, ThinError, ThinResult};

pub use self::lang_matches::LangMatchesSparqlOp;
pub use self::regex::RegexSparqlOp;

#[derive(Debug, Default)]
pub struct StrLenSparqlOp;

impl ScalarSparqlOp for StrLenSparqlOp {
    fn name(&self) -> &str {
        "strlen"
    }

    fn arity(&self) -> SparqlOpArity {
        SparqlOpArity::Fixed(1)
    }

    fn evaluate(&self, args: &[TermRef<'_>]) -> ThinResult<Term> {
        let string = StringLiteralRef::try_from_term(args[0])?;
        let length =
            i64::try_from(string.value.chars().count()).map_err(|_| ThinError::default())?;
        Ok(Numeric::Integer(Integer::from(length)).into_literal().into())
    }
}

macro_rules! create_case_op {
    ($STRUCT: ident, $NAME: expr, $MAP: expr) => {
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
                let map: fn(&str) -> String = $MAP;
                let string = StringLiteralRef::try_from_term(args[0])?;
                Ok(string.with_value(map(string.value)))
            }
        }
    };
}

create_case_op!(UCaseSparqlOp, "ucase", str::to_uppercase);
create_case_op!(LCaseSparqlOp, "lcase", str::to_lowercase);

macro_rules! create_string_test_op {
    ($STRUCT: ident, $NAME: expr, $TEST: expr) => {
        #[derive(Debug, Default)]
        pub struct $STRUCT;

        impl ScalarSparqlOp for $STRUCT {
            fn name(&self) -> &str {
                $NAME
            }

            fn arity(&self) -> SparqlOpArity {
                SparqlOpArity::Fixed(2)
            }

            fn evaluate(&self, args: &[TermRef<'_>]) -> ThinResult<Term> {
                let test: fn(&str, &str) -> bool = $TEST;
                let lhs = StringLiteralRef::try_from_term(args[0])?;
                let rhs = StringLiteralRef::try_from_term(args[1])?;
                if !lhs.is_compatible_with(rhs) {
                    return ThinError::expected();
                }
                Ok(boolean(test(lhs.value, rhs.value)))
            }
        }
    };
}

create_string_test_op!(ContainsSparqlOp, "contains", |lhs, rhs| lhs.contains(rhs));
create_string_test_op!(StrStartsSparqlOp, "strstarts", |lhs, rhs| lhs
    .starts_with(rhs));
create_string_test_op!(StrEndsSparqlOp, "strends", |lhs, rhs| lhs.ends_with(rhs));

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_query_model::Literal;

    #[test]
    fn case_mapping_keeps_language() {
        let tagged = Literal::new_language_tagged_literal_unchecked("chat", "fr");

        assert_eq!(
            UCaseSparqlOp.evaluate(&[tagged.as_ref().into()]),
            Ok(Literal::new_language_tagged_literal_unchecked("CHAT", "fr").into())
        );
        assert_eq!(
            LCaseSparqlOp.evaluate(&[Literal::new_simple_literal("X2").as_ref().into()]),
            Ok(Literal::new_simple_literal("x2").into())
        );
    }

    #[test]
    fn strlen_counts_characters() {
        let result = StrLenSparqlOp
            .evaluate(&[Literal::new_simple_literal("h\u{e9}llo").as_ref().into()])
            .unwrap();
        insta::assert_snapshot!(result, @r#""5"^^<http://www.w3.org/2001/XMLSchema#integer>"#);
    }

    #[test]
    fn string_tests_require_compatible_arguments() {
        let tagged = Literal::new_language_tagged_literal_unchecked("chat", "fr");
        let other = Literal::new_language_tagged_literal_unchecked("ch", "en");
        let simple = Literal::new_simple_literal("ch");

        assert_eq!(
            StrStartsSparqlOp.evaluate(&[tagged.as_ref().into(), simple.as_ref().into()]),
            Ok(boolean(true))
        );
        assert!(StrStartsSparqlOp
            .evaluate(&[tagged.as_ref().into(), other.as_ref().into()])
            .is_err());
        assert!(ContainsSparqlOp
            .evaluate(&[simple.as_ref().into(), tagged.as_ref().into()])
            .is_err());
    }
}
