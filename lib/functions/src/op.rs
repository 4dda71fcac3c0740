use rdf_query_model::vocab::xsd;
use rdf_query_model::{Literal, Term, TermRef, ThinError, ThinResult};
use std::fmt::{Debug, Display};

/// The number of arguments a [ScalarSparqlOp] accepts.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum SparqlOpArity {
    Fixed(usize),
    /// An inclusive range of argument counts.
    Between(usize, usize),
}

impl SparqlOpArity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            SparqlOpArity::Fixed(arity) => count == arity,
            SparqlOpArity::Between(min, max) => (min..=max).contains(&count),
        }
    }
}

impl Display for SparqlOpArity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SparqlOpArity::Fixed(n) => write!(f, "{n}"),
            SparqlOpArity::Between(min, max) => write!(f, "{min}..={max}"),
        }
    }
}

/// A built-in SPARQL function over evaluated arguments.
///
/// The evaluator checks the [arity](Self::arity) before calling [evaluate](Self::evaluate), so
/// implementations may index into `args` accordingly.
pub trait ScalarSparqlOp: Debug {
    fn name(&self) -> &str;

    fn arity(&self) -> SparqlOpArity;

    fn evaluate(&self, args: &[TermRef<'_>]) -> ThinResult<Term>;
}

/// A string literal argument: a simple literal or a language-tagged string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringLiteralRef<'data> {
    pub value: &'data str,
    pub language: Option<&'data str>,
}

impl<'data> StringLiteralRef<'data> {
    pub fn try_from_term(term: TermRef<'data>) -> ThinResult<Self> {
        let TermRef::Literal(literal) = term else {
            return ThinError::expected();
        };
        match literal.language() {
            Some(language) => Ok(Self {
                value: literal.value(),
                language: Some(language),
            }),
            None if literal.datatype() == xsd::STRING => Ok(Self {
                value: literal.value(),
                language: None,
            }),
            None => ThinError::expected(),
        }
    }

    /// Two string arguments are compatible if the second one has no language tag or both have
    /// the same one.
    pub fn is_compatible_with(self, other: StringLiteralRef<'_>) -> bool {
        other.language.is_none() || self.language == other.language
    }

    /// Creates a literal with the language tag of this argument.
    pub fn with_value(self, value: impl Into<String>) -> Term {
        match self.language {
            Some(language) => {
                Literal::new_language_tagged_literal_unchecked(value, language).into()
            }
            None => Literal::new_simple_literal(value).into(),
        }
    }
}

/// Returns the lexical form of a simple literal argument.
pub(crate) fn simple_literal(term: TermRef<'_>) -> ThinResult<&str> {
    match StringLiteralRef::try_from_term(term)? {
        StringLiteralRef {
            value,
            language: None,
        } => Ok(value),
        _ => ThinError::expected(),
    }
}

pub(crate) fn boolean(value: bool) -> Term {
    Literal::from(value).into()
}
