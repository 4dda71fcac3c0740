use rdf_query_logical::{QueryForm, SubstitutionError};
use rdf_query_model::Variable;
use std::convert::Infallible;

/// A query evaluation error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QueryEvaluationError {
    /// The initial binding places a term in a position where it is not allowed.
    #[error(transparent)]
    Substitution(#[from] SubstitutionError),
    /// A `CONSTRUCT` template uses a variable that no solution can bind.
    #[error("The template variable {0} is neither used in the pattern nor initially bound")]
    UnboundTemplateVariable(Variable),
    /// The execution method does not match the form of the query.
    #[error("Expected a {expected} query but the query is a {actual} query")]
    UnexpectedQueryForm {
        expected: QueryForm,
        actual: QueryForm,
    },
    /// The initial binding can only be changed before the query is executed.
    #[error("The execution has already started")]
    AlreadyStarted,
    /// The execution or its results have been closed.
    #[error("The query execution is closed")]
    Closed,
    #[error("An internal error that likely indicates towards a bug in RDF Query: {0}")]
    InternalError(String),
}

impl QueryEvaluationError {
    pub fn internal<T>(cause: String) -> Result<T, Self> {
        Err(QueryEvaluationError::InternalError(cause))
    }
}

impl From<Infallible> for QueryEvaluationError {
    #[inline]
    fn from(error: Infallible) -> Self {
        match error {}
    }
}
