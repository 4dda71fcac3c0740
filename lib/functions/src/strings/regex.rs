use crate::op::{boolean, simple_literal};
use crate::{ScalarSparqlOp, SparqlOpArity, StringLiteralRef};
use rdf_query_model::{Term, TermRef, ThinError, ThinResult};
use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::cell::RefCell;

/// `REGEX(text, pattern [, flags])`.
///
/// Patterns are usually constants, so compiled patterns (and invalid ones) are cached per
/// pattern and flags.
#[derive(Debug, Default)]
pub struct RegexSparqlOp {
    cache: RefCell<FxHashMap<(String, String), Option<Regex>>>,
}

impl RegexSparqlOp {
    fn is_match(&self, text: &str, pattern: &str, flags: &str) -> ThinResult<bool> {
        let key = (pattern.to_owned(), flags.to_owned());
        let mut cache = self.cache.borrow_mut();
        let regex = cache
            .entry(key)
            .or_insert_with(|| compile_pattern(pattern, flags));
        match regex {
            Some(regex) => Ok(regex.is_match(text)),
            None => ThinError::expected(),
        }
    }
}

impl ScalarSparqlOp for RegexSparqlOp {
    fn name(&self) -> &str {
        "regex"
    }

    fn arity(&self) -> SparqlOpArity {
        SparqlOpArity::Between(2, 3)
    }

    fn evaluate(&self, args: &[TermRef<'_>]) -> ThinResult<Term> {
        let text = StringLiteralRef::try_from_term(args[0])?;
        let pattern = simple_literal(args[1])?;
        let flags = match args.get(2) {
            Some(flags) => simple_literal(*flags)?,
            None => "",
        };
        self.is_match(text.value, pattern, flags).map(boolean)
    }
}

fn compile_pattern(pattern: &str, flags: &str) -> Option<Regex> {
    const REGEX_SIZE_LIMIT: usize = 1_000_000;

    let mut pattern = Cow::Borrowed(pattern);
    if flags.contains('q') {
        pattern = regex::escape(&pattern).into();
    }
    let mut regex_builder = RegexBuilder::new(&pattern);
    regex_builder.size_limit(REGEX_SIZE_LIMIT);
    for flag in flags.chars() {
        match flag {
            's' => {
                regex_builder.dot_matches_new_line(true);
            }
            'm' => {
                regex_builder.multi_line(true);
            }
            'i' => {
                regex_builder.case_insensitive(true);
            }
            'x' => {
                regex_builder.ignore_whitespace(true);
            }
            'q' => (),
            _ => return None,
        }
    }
    regex_builder.build().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_query_model::Literal;

    fn regex(op: &RegexSparqlOp, args: &[&str]) -> ThinResult<Term> {
        let args = args
            .iter()
            .map(|arg| Literal::new_simple_literal(*arg))
            .collect::<Vec<_>>();
        let args = args
            .iter()
            .map(|arg| TermRef::from(arg.as_ref()))
            .collect::<Vec<_>>();
        op.evaluate(&args)
    }

    #[test]
    fn matches_with_flags() {
        let op = RegexSparqlOp::default();

        assert_eq!(regex(&op, &["X2", "^x"]), Ok(boolean(false)));
        assert_eq!(regex(&op, &["X2", "^x", "i"]), Ok(boolean(true)));
        assert_eq!(regex(&op, &["a.b", ".", "q"]), Ok(boolean(true)));
        assert_eq!(regex(&op, &["ab", ".", "q"]), Ok(boolean(false)));
    }

    #[test]
    fn invalid_patterns_and_flags_are_errors() {
        let op = RegexSparqlOp::default();

        assert!(regex(&op, &["x", "("]).is_err());
        assert!(regex(&op, &["x", "x", "z"]).is_err());
        // Cached failures stay failures.
        assert!(regex(&op, &["x", "("]).is_err());
        assert_eq!(op.cache.borrow().len(), 2);
    }
}
