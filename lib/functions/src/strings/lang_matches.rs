use crate::op::{boolean, simple_literal};
use crate::{ScalarSparqlOp, SparqlOpArity};
use rdf_query_model::{Term, TermRef, ThinResult};

/// Basic filtering of RFC 4647: a language range matches a tag if it equals a prefix of the tag
/// that ends at a subtag boundary. `*` matches every non-empty tag.
#[derive(Debug, Default)]
pub struct LangMatchesSparqlOp;

impl ScalarSparqlOp for LangMatchesSparqlOp {
    fn name(&self) -> &str {
        "langMatches"
    }

    fn arity(&self) -> SparqlOpArity {
        SparqlOpArity::Fixed(2)
    }

    fn evaluate(&self, args: &[TermRef<'_>]) -> ThinResult<Term> {
        let tag = simple_literal(args[0])?;
        let range = simple_literal(args[1])?;

        let matches = if range == "*" {
            !tag.is_empty()
        } else {
            !ZipLongest::new(range.split('-'), tag.split('-')).any(|parts| match parts {
                (Some(range_subtag), Some(language_subtag)) => {
                    !range_subtag.eq_ignore_ascii_case(language_subtag)
                }
                (Some(_), None) => true,
                (None, _) => false,
            })
        };
        Ok(boolean(matches))
    }
}

struct ZipLongest<I1, I2> {
    a: I1,
    b: I2,
}

impl<I1, I2> ZipLongest<I1, I2> {
    fn new(a: I1, b: I2) -> Self {
        Self { a, b }
    }
}

impl<I1: Iterator, I2: Iterator> Iterator for ZipLongest<I1, I2> {
    type Item = (Option<I1::Item>, Option<I2::Item>);

    fn next(&mut self) -> Option<Self::Item> {
        match (self.a.next(), self.b.next()) {
            (None, None) => None,
            parts => Some(parts),
        }
    }
}
