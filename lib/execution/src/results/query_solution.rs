use crate::engine::SolutionIter;
use crate::results::cursor::{CloseSignal, Cursor};
use crate::sparql::error::QueryEvaluationError;
use rdf_query_model::{Binding, Variable};

/// An iterator over the solutions of a `SELECT` query.
pub struct QuerySolutionIter<'a> {
    variables: Vec<Variable>,
    cursor: Cursor<SolutionIter<'a>>,
}

impl<'a> QuerySolutionIter<'a> {
    pub(crate) fn new(
        variables: Vec<Variable>,
        solutions: SolutionIter<'a>,
        signal: CloseSignal,
    ) -> Self {
        Self {
            variables,
            cursor: Cursor::new(solutions, signal),
        }
    }

    /// The projected variables, in the order of the `SELECT` clause.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn close(&mut self) {
        self.cursor.close();
    }

    pub fn is_closed(&self) -> bool {
        self.cursor.is_closed()
    }
}

impl Iterator for QuerySolutionIter<'_> {
    type Item = Result<Binding, QueryEvaluationError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next()
    }
}
