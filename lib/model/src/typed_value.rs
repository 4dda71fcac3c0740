use crate::{ThinError, ThinResult};
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNodeRef, Literal, LiteralRef, NamedNodeRef, Term, TermRef};
use oxsdatatypes::{Boolean, Decimal, Double, Integer};
use std::cmp::Ordering;
use std::str::FromStr;

/// A numeric value. The variants are ordered by their type promotion rank.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Numeric {
    Integer(Integer),
    Decimal(Decimal),
    Double(Double),
}

/// Two numeric values promoted to a common type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumericPair {
    Integer(Integer, Integer),
    Decimal(Decimal, Decimal),
    Double(Double, Double),
}

impl Numeric {
    /// Promotes both operands to the smallest type that can represent them: integer, then
    /// decimal, then double.
    pub fn promote(lhs: Numeric, rhs: Numeric) -> NumericPair {
        match (lhs, rhs) {
            (Numeric::Integer(lhs), Numeric::Integer(rhs)) => NumericPair::Integer(lhs, rhs),
            (Numeric::Integer(lhs), Numeric::Decimal(rhs)) => {
                NumericPair::Decimal(Decimal::from(lhs), rhs)
            }
            (Numeric::Decimal(lhs), Numeric::Integer(rhs)) => {
                NumericPair::Decimal(lhs, Decimal::from(rhs))
            }
            (Numeric::Decimal(lhs), Numeric::Decimal(rhs)) => NumericPair::Decimal(lhs, rhs),
            (lhs, rhs) => NumericPair::Double(lhs.to_double(), rhs.to_double()),
        }
    }

    pub fn to_double(self) -> Double {
        match self {
            Numeric::Integer(value) => Double::from(value),
            Numeric::Decimal(value) => Double::from(value),
            Numeric::Double(value) => value,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Numeric::Integer(value) => value == Integer::from(0),
            Numeric::Decimal(value) => value == Decimal::from(0),
            Numeric::Double(value) => f64::from(value) == 0.0,
        }
    }

    pub fn is_nan(self) -> bool {
        matches!(self, Numeric::Double(value) if f64::from(value).is_nan())
    }

    /// Returns the canonical literal for this value.
    pub fn into_literal(self) -> Literal {
        match self {
            Numeric::Integer(value) => Literal::new_typed_literal(value.to_string(), xsd::INTEGER),
            Numeric::Decimal(value) => Literal::new_typed_literal(value.to_string(), xsd::DECIMAL),
            Numeric::Double(value) => Literal::new_typed_literal(value.to_string(), xsd::DOUBLE),
        }
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match Numeric::promote(*self, *other) {
            NumericPair::Integer(lhs, rhs) => lhs.partial_cmp(&rhs),
            NumericPair::Decimal(lhs, rhs) => lhs.partial_cmp(&rhs),
            NumericPair::Double(lhs, rhs) => lhs.partial_cmp(&rhs),
        }
    }
}

impl From<Integer> for Numeric {
    fn from(value: Integer) -> Self {
        Numeric::Integer(value)
    }
}

impl From<Decimal> for Numeric {
    fn from(value: Decimal) -> Self {
        Numeric::Decimal(value)
    }
}

impl From<Double> for Numeric {
    fn from(value: Double) -> Self {
        Numeric::Double(value)
    }
}

/// A view on a term that exposes the value of the literals the expression evaluator knows.
///
/// Literals with an unknown datatype or an ill-formed lexical form are kept as
/// [TypedValueRef::OtherLiteral]; they can only be compared by term equality.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum TypedValueRef<'value> {
    NamedNode(NamedNodeRef<'value>),
    BlankNode(BlankNodeRef<'value>),
    BooleanLiteral(bool),
    NumericLiteral(Numeric),
    SimpleLiteral(&'value str),
    LanguageStringLiteral {
        value: &'value str,
        language: &'value str,
    },
    OtherLiteral(LiteralRef<'value>),
}

impl<'value> From<TermRef<'value>> for TypedValueRef<'value> {
    fn from(term: TermRef<'value>) -> Self {
        match term {
            TermRef::NamedNode(node) => TypedValueRef::NamedNode(node),
            TermRef::BlankNode(node) => TypedValueRef::BlankNode(node),
            TermRef::Literal(literal) => {
                parse_literal(literal).unwrap_or(TypedValueRef::OtherLiteral(literal))
            }
        }
    }
}

impl<'value> From<&'value Term> for TypedValueRef<'value> {
    fn from(term: &'value Term) -> Self {
        Self::from(term.as_ref())
    }
}

fn parse_literal(literal: LiteralRef<'_>) -> ThinResult<TypedValueRef<'_>> {
    let value = literal.value();
    if let Some(language) = literal.language() {
        return Ok(TypedValueRef::LanguageStringLiteral { value, language });
    }

    let datatype = literal.datatype();
    let typed_value = if datatype == xsd::STRING {
        TypedValueRef::SimpleLiteral(value)
    } else if datatype == xsd::BOOLEAN {
        TypedValueRef::BooleanLiteral(Boolean::from_str(value)?.into())
    } else if is_integer_datatype(datatype) {
        TypedValueRef::NumericLiteral(Numeric::Integer(Integer::from_str(value)?))
    } else if datatype == xsd::DECIMAL {
        TypedValueRef::NumericLiteral(Numeric::Decimal(Decimal::from_str(value)?))
    } else if datatype == xsd::DOUBLE || datatype == xsd::FLOAT {
        TypedValueRef::NumericLiteral(Numeric::Double(Double::from_str(value)?))
    } else if datatype == rdf::LANG_STRING {
        // A language-tagged string without a language tag is ill-formed.
        return ThinError::expected();
    } else {
        TypedValueRef::OtherLiteral(literal)
    };
    Ok(typed_value)
}

/// Checks if the datatype is `xsd:integer` or one of the integer types derived from it.
pub fn is_integer_datatype(datatype: NamedNodeRef<'_>) -> bool {
    static INTEGER_DATATYPES: &[NamedNodeRef<'static>; 13] = &[
        xsd::INTEGER,
        xsd::BYTE,
        xsd::SHORT,
        xsd::INT,
        xsd::LONG,
        xsd::UNSIGNED_BYTE,
        xsd::UNSIGNED_SHORT,
        xsd::UNSIGNED_INT,
        xsd::UNSIGNED_LONG,
        xsd::POSITIVE_INTEGER,
        xsd::NEGATIVE_INTEGER,
        xsd::NON_POSITIVE_INTEGER,
        xsd::NON_NEGATIVE_INTEGER,
    ];
    INTEGER_DATATYPES.contains(&datatype)
}

/// Checks if the datatype is one of the numeric datatypes of XML schema.
pub fn is_numeric_datatype(datatype: NamedNodeRef<'_>) -> bool {
    is_integer_datatype(datatype)
        || datatype == xsd::DECIMAL
        || datatype == xsd::DOUBLE
        || datatype == xsd::FLOAT
}
