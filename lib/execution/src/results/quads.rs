use crate::construct::ConstructMaterializer;
use crate::results::cursor::{CloseSignal, Cursor};
use crate::sparql::error::QueryEvaluationError;
use rdf_query_model::{Dataset, Quad};

/// An iterator over the quads constructed by a `CONSTRUCT` query.
pub struct QueryQuadIter<'a> {
    cursor: Cursor<ConstructMaterializer<'a>>,
}

impl<'a> QueryQuadIter<'a> {
    pub(crate) fn new(materializer: ConstructMaterializer<'a>, signal: CloseSignal) -> Self {
        Self {
            cursor: Cursor::new(materializer, signal),
        }
    }

    /// Collects the remaining quads into a [Dataset].
    pub fn collect_as_dataset(self) -> Result<Dataset, QueryEvaluationError> {
        self.collect()
    }

    pub fn close(&mut self) {
        self.cursor.close();
    }

    pub fn is_closed(&self) -> bool {
        self.cursor.is_closed()
    }
}

impl Iterator for QueryQuadIter<'_> {
    type Item = Result<Quad, QueryEvaluationError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next()
    }
}
