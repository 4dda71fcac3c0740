use itertools::Itertools;
use rdf_query_model::{Term, Variable};
use std::fmt::{Display, Formatter};

/// A built-in function that can be called in an [Expression].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Str,
    Lang,
    LangMatches,
    Datatype,
    IsIri,
    IsBlank,
    IsLiteral,
    IsNumeric,
    StrLen,
    UCase,
    LCase,
    Contains,
    StrStarts,
    StrEnds,
    Regex,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Str => "str",
            Function::Lang => "lang",
            Function::LangMatches => "langMatches",
            Function::Datatype => "datatype",
            Function::IsIri => "isIRI",
            Function::IsBlank => "isBlank",
            Function::IsLiteral => "isLiteral",
            Function::IsNumeric => "isNumeric",
            Function::StrLen => "strlen",
            Function::UCase => "ucase",
            Function::LCase => "lcase",
            Function::Contains => "contains",
            Function::StrStarts => "strstarts",
            Function::StrEnds => "strends",
            Function::Regex => "regex",
        }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A SPARQL expression.
///
/// Constants are arbitrary terms (not only IRIs and literals) because substituting an initial
/// binding may place a blank node into an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Constant(Term),
    Variable(Variable),
    Or(Box<Self>, Box<Self>),
    And(Box<Self>, Box<Self>),
    Not(Box<Self>),
    Equal(Box<Self>, Box<Self>),
    SameTerm(Box<Self>, Box<Self>),
    Greater(Box<Self>, Box<Self>),
    GreaterOrEqual(Box<Self>, Box<Self>),
    Less(Box<Self>, Box<Self>),
    LessOrEqual(Box<Self>, Box<Self>),
    In(Box<Self>, Vec<Self>),
    Add(Box<Self>, Box<Self>),
    Subtract(Box<Self>, Box<Self>),
    Multiply(Box<Self>, Box<Self>),
    Divide(Box<Self>, Box<Self>),
    UnaryPlus(Box<Self>),
    UnaryMinus(Box<Self>),
    Bound(Variable),
    If(Box<Self>, Box<Self>, Box<Self>),
    Coalesce(Vec<Self>),
    FunctionCall(Function, Vec<Self>),
}

impl Expression {
    pub fn constant(term: impl Into<Term>) -> Self {
        Expression::Constant(term.into())
    }

    pub fn variable(variable: Variable) -> Self {
        Expression::Variable(variable)
    }

    pub fn equal(lhs: Expression, rhs: Expression) -> Self {
        Expression::Equal(Box::new(lhs), Box::new(rhs))
    }

    pub fn and(lhs: Expression, rhs: Expression) -> Self {
        Expression::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Expression, rhs: Expression) -> Self {
        Expression::Or(Box::new(lhs), Box::new(rhs))
    }

    #[allow(clippy::should_implement_trait, reason = "Builds an expression node")]
    pub fn not(inner: Expression) -> Self {
        Expression::Not(Box::new(inner))
    }

    pub fn call(function: Function, args: impl IntoIterator<Item = Expression>) -> Self {
        Expression::FunctionCall(function, args.into_iter().collect())
    }

    /// Returns the term if this expression is a constant.
    pub fn as_constant(&self) -> Option<&Term> {
        match self {
            Expression::Constant(term) => Some(term),
            _ => None,
        }
    }

    /// Returns true if the expression does not reference any variable.
    pub fn is_ground(&self) -> bool {
        let mut variables = Vec::new();
        self.collect_variables(&mut variables);
        variables.is_empty()
    }

    /// Collects the variables referenced by the expression (including `BOUND` arguments).
    pub fn collect_variables<'a>(&'a self, variables: &mut Vec<&'a Variable>) {
        match self {
            Expression::Constant(_) => {}
            Expression::Variable(variable) | Expression::Bound(variable) => {
                if !variables.contains(&variable) {
                    variables.push(variable);
                }
            }
            Expression::Not(inner)
            | Expression::UnaryPlus(inner)
            | Expression::UnaryMinus(inner) => {
                inner.collect_variables(variables);
            }
            Expression::Or(lhs, rhs)
            | Expression::And(lhs, rhs)
            | Expression::Equal(lhs, rhs)
            | Expression::SameTerm(lhs, rhs)
            | Expression::Greater(lhs, rhs)
            | Expression::GreaterOrEqual(lhs, rhs)
            | Expression::Less(lhs, rhs)
            | Expression::LessOrEqual(lhs, rhs)
            | Expression::Add(lhs, rhs)
            | Expression::Subtract(lhs, rhs)
            | Expression::Multiply(lhs, rhs)
            | Expression::Divide(lhs, rhs) => {
                lhs.collect_variables(variables);
                rhs.collect_variables(variables);
            }
            Expression::In(lhs, rhs) => {
                lhs.collect_variables(variables);
                for expression in rhs {
                    expression.collect_variables(variables);
                }
            }
            Expression::If(test, if_true, if_false) => {
                test.collect_variables(variables);
                if_true.collect_variables(variables);
                if_false.collect_variables(variables);
            }
            Expression::Coalesce(args) | Expression::FunctionCall(_, args) => {
                for expression in args {
                    expression.collect_variables(variables);
                }
            }
        }
    }

    /// Rebuilds the expression bottom-up, applying `f` to every node after its children.
    pub fn transform_up(self, f: &mut impl FnMut(Expression) -> Expression) -> Expression {
        let node = match self {
            Expression::Constant(_) | Expression::Variable(_) | Expression::Bound(_) => self,
            Expression::Or(lhs, rhs) => Expression::Or(lhs.boxed_up(f), rhs.boxed_up(f)),
            Expression::And(lhs, rhs) => Expression::And(lhs.boxed_up(f), rhs.boxed_up(f)),
            Expression::Not(inner) => Expression::Not(inner.boxed_up(f)),
            Expression::Equal(lhs, rhs) => Expression::Equal(lhs.boxed_up(f), rhs.boxed_up(f)),
            Expression::SameTerm(lhs, rhs) => {
                Expression::SameTerm(lhs.boxed_up(f), rhs.boxed_up(f))
            }
            Expression::Greater(lhs, rhs) => Expression::Greater(lhs.boxed_up(f), rhs.boxed_up(f)),
            Expression::GreaterOrEqual(lhs, rhs) => {
                Expression::GreaterOrEqual(lhs.boxed_up(f), rhs.boxed_up(f))
            }
            Expression::Less(lhs, rhs) => Expression::Less(lhs.boxed_up(f), rhs.boxed_up(f)),
            Expression::LessOrEqual(lhs, rhs) => {
                Expression::LessOrEqual(lhs.boxed_up(f), rhs.boxed_up(f))
            }
            Expression::In(lhs, rhs) => Expression::In(
                lhs.boxed_up(f),
                rhs.into_iter().map(|e| e.transform_up(f)).collect(),
            ),
            Expression::Add(lhs, rhs) => Expression::Add(lhs.boxed_up(f), rhs.boxed_up(f)),
            Expression::Subtract(lhs, rhs) => {
                Expression::Subtract(lhs.boxed_up(f), rhs.boxed_up(f))
            }
            Expression::Multiply(lhs, rhs) => {
                Expression::Multiply(lhs.boxed_up(f), rhs.boxed_up(f))
            }
            Expression::Divide(lhs, rhs) => Expression::Divide(lhs.boxed_up(f), rhs.boxed_up(f)),
            Expression::UnaryPlus(inner) => Expression::UnaryPlus(inner.boxed_up(f)),
            Expression::UnaryMinus(inner) => Expression::UnaryMinus(inner.boxed_up(f)),
            Expression::If(test, if_true, if_false) => Expression::If(
                test.boxed_up(f),
                if_true.boxed_up(f),
                if_false.boxed_up(f),
            ),
            Expression::Coalesce(args) => {
                Expression::Coalesce(args.into_iter().map(|e| e.transform_up(f)).collect())
            }
            Expression::FunctionCall(function, args) => Expression::FunctionCall(
                function,
                args.into_iter().map(|e| e.transform_up(f)).collect(),
            ),
        };
        f(node)
    }
}

trait BoxedTransform {
    fn boxed_up(self, f: &mut impl FnMut(Expression) -> Expression) -> Box<Expression>;
}

impl BoxedTransform for Box<Expression> {
    fn boxed_up(self, f: &mut impl FnMut(Expression) -> Expression) -> Box<Expression> {
        Box::new((*self).transform_up(f))
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Expression::Variable(variable)
    }
}

impl From<Term> for Expression {
    fn from(term: Term) -> Self {
        Expression::Constant(term)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Constant(term) => write!(f, "{term}"),
            Expression::Variable(variable) => write!(f, "{variable}"),
            Expression::Or(lhs, rhs) => write!(f, "({lhs} || {rhs})"),
            Expression::And(lhs, rhs) => write!(f, "({lhs} && {rhs})"),
            Expression::Not(inner) => write!(f, "!{inner}"),
            Expression::Equal(lhs, rhs) => write!(f, "({lhs} = {rhs})"),
            Expression::SameTerm(lhs, rhs) => write!(f, "sameTerm({lhs}, {rhs})"),
            Expression::Greater(lhs, rhs) => write!(f, "({lhs} > {rhs})"),
            Expression::GreaterOrEqual(lhs, rhs) => write!(f, "({lhs} >= {rhs})"),
            Expression::Less(lhs, rhs) => write!(f, "({lhs} < {rhs})"),
            Expression::LessOrEqual(lhs, rhs) => write!(f, "({lhs} <= {rhs})"),
            Expression::In(lhs, rhs) => write!(f, "({lhs} IN ({}))", rhs.iter().format(", ")),
            Expression::Add(lhs, rhs) => write!(f, "({lhs} + {rhs})"),
            Expression::Subtract(lhs, rhs) => write!(f, "({lhs} - {rhs})"),
            Expression::Multiply(lhs, rhs) => write!(f, "({lhs} * {rhs})"),
            Expression::Divide(lhs, rhs) => write!(f, "({lhs} / {rhs})"),
            Expression::UnaryPlus(inner) => write!(f, "+{inner}"),
            Expression::UnaryMinus(inner) => write!(f, "-{inner}"),
            Expression::Bound(variable) => write!(f, "bound({variable})"),
            Expression::If(test, if_true, if_false) => {
                write!(f, "if({test}, {if_true}, {if_false})")
            }
            Expression::Coalesce(args) => write!(f, "coalesce({})", args.iter().format(", ")),
            Expression::FunctionCall(function, args) => {
                write!(f, "{function}({})", args.iter().format(", "))
            }
        }
    }
}
