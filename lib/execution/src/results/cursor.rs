use crate::sparql::error::QueryEvaluationError;
use std::cell::Cell;
use std::rc::Rc;

/// Shared between a [QueryExecution](crate::QueryExecution) and the cursors it hands out.
///
/// Closing the signal releases every cursor created from it.
#[derive(Debug, Clone, Default)]
pub(crate) struct CloseSignal {
    closed: Rc<Cell<bool>>,
}

impl CloseSignal {
    pub(crate) fn close(&self) {
        self.closed.set(true);
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

/// An iterator that can be closed before it is exhausted, either directly or through the
/// [CloseSignal] of its execution.
pub(super) struct Cursor<I> {
    inner: Option<I>,
    signal: CloseSignal,
}

impl<I: Iterator> Cursor<I> {
    pub(super) fn new(inner: I, signal: CloseSignal) -> Self {
        Self {
            inner: Some(inner),
            signal,
        }
    }

    /// Releases the inner iterator. Closing twice has no further effect.
    pub(super) fn close(&mut self) {
        self.inner = None;
    }

    pub(super) fn is_closed(&self) -> bool {
        self.inner.is_none() || self.signal.is_closed()
    }

    /// Every pull after the cursor has been closed fails.
    pub(super) fn next(&mut self) -> Option<Result<I::Item, QueryEvaluationError>> {
        if self.signal.is_closed() {
            self.close();
        }
        match &mut self.inner {
            Some(inner) => inner.next().map(Ok),
            None => Some(Err(QueryEvaluationError::Closed)),
        }
    }
}
