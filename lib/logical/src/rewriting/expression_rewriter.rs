use crate::{Expression, Function, QueryParseError};
use spargebra::algebra::{Expression as SparqlExpression, Function as SparqlFunction};

/// Rewrites a parsed [SparqlExpression] into an [Expression].
///
/// `EXISTS` is only supported as a negated conjunct of a filter, which the graph pattern rewriter
/// handles before calling this function.
pub(super) fn rewrite_expression(
    expression: &SparqlExpression,
) -> Result<Expression, QueryParseError> {
    Ok(match expression {
        SparqlExpression::NamedNode(node) => Expression::constant(node.clone()),
        SparqlExpression::Literal(literal) => Expression::constant(literal.clone()),
        SparqlExpression::Variable(variable) => Expression::Variable(variable.clone()),
        SparqlExpression::Or(lhs, rhs) => {
            Expression::Or(rewrite_boxed(lhs)?, rewrite_boxed(rhs)?)
        }
        SparqlExpression::And(lhs, rhs) => {
            Expression::And(rewrite_boxed(lhs)?, rewrite_boxed(rhs)?)
        }
        SparqlExpression::Not(inner) => Expression::Not(rewrite_boxed(inner)?),
        SparqlExpression::Equal(lhs, rhs) => {
            Expression::Equal(rewrite_boxed(lhs)?, rewrite_boxed(rhs)?)
        }
        SparqlExpression::SameTerm(lhs, rhs) => {
            Expression::SameTerm(rewrite_boxed(lhs)?, rewrite_boxed(rhs)?)
        }
        SparqlExpression::Greater(lhs, rhs) => {
            Expression::Greater(rewrite_boxed(lhs)?, rewrite_boxed(rhs)?)
        }
        SparqlExpression::GreaterOrEqual(lhs, rhs) => {
            Expression::GreaterOrEqual(rewrite_boxed(lhs)?, rewrite_boxed(rhs)?)
        }
        SparqlExpression::Less(lhs, rhs) => {
            Expression::Less(rewrite_boxed(lhs)?, rewrite_boxed(rhs)?)
        }
        SparqlExpression::LessOrEqual(lhs, rhs) => {
            Expression::LessOrEqual(rewrite_boxed(lhs)?, rewrite_boxed(rhs)?)
        }
        SparqlExpression::In(lhs, rhs) => Expression::In(rewrite_boxed(lhs)?, rewrite_all(rhs)?),
        SparqlExpression::Add(lhs, rhs) => {
            Expression::Add(rewrite_boxed(lhs)?, rewrite_boxed(rhs)?)
        }
        SparqlExpression::Subtract(lhs, rhs) => {
            Expression::Subtract(rewrite_boxed(lhs)?, rewrite_boxed(rhs)?)
        }
        SparqlExpression::Multiply(lhs, rhs) => {
            Expression::Multiply(rewrite_boxed(lhs)?, rewrite_boxed(rhs)?)
        }
        SparqlExpression::Divide(lhs, rhs) => {
            Expression::Divide(rewrite_boxed(lhs)?, rewrite_boxed(rhs)?)
        }
        SparqlExpression::UnaryPlus(inner) => Expression::UnaryPlus(rewrite_boxed(inner)?),
        SparqlExpression::UnaryMinus(inner) => Expression::UnaryMinus(rewrite_boxed(inner)?),
        SparqlExpression::Bound(variable) => Expression::Bound(variable.clone()),
        SparqlExpression::If(test, if_true, if_false) => Expression::If(
            rewrite_boxed(test)?,
            rewrite_boxed(if_true)?,
            rewrite_boxed(if_false)?,
        ),
        SparqlExpression::Coalesce(args) => Expression::Coalesce(rewrite_all(args)?),
        SparqlExpression::FunctionCall(function, args) => {
            Expression::call(rewrite_function(function)?, rewrite_all(args)?)
        }
        SparqlExpression::Exists(_) => {
            return QueryParseError::unsupported("EXISTS outside of FILTER NOT EXISTS")
        }
    })
}

fn rewrite_boxed(expression: &SparqlExpression) -> Result<Box<Expression>, QueryParseError> {
    rewrite_expression(expression).map(Box::new)
}

fn rewrite_all(expressions: &[SparqlExpression]) -> Result<Vec<Expression>, QueryParseError> {
    expressions.iter().map(rewrite_expression).collect()
}

fn rewrite_function(function: &SparqlFunction) -> Result<Function, QueryParseError> {
    Ok(match function {
        SparqlFunction::Str => Function::Str,
        SparqlFunction::Lang => Function::Lang,
        SparqlFunction::LangMatches => Function::LangMatches,
        SparqlFunction::Datatype => Function::Datatype,
        SparqlFunction::IsIri => Function::IsIri,
        SparqlFunction::IsBlank => Function::IsBlank,
        SparqlFunction::IsLiteral => Function::IsLiteral,
        SparqlFunction::IsNumeric => Function::IsNumeric,
        SparqlFunction::StrLen => Function::StrLen,
        SparqlFunction::UCase => Function::UCase,
        SparqlFunction::LCase => Function::LCase,
        SparqlFunction::Contains => Function::Contains,
        SparqlFunction::StrStarts => Function::StrStarts,
        SparqlFunction::StrEnds => Function::StrEnds,
        SparqlFunction::Regex => Function::Regex,
        _ => return QueryParseError::unsupported(format!("function {function}")),
    })
}
