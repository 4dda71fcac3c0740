use crate::construct::ConstructMaterializer;
use crate::results::cursor::{CloseSignal, Cursor};
use crate::sparql::error::QueryEvaluationError;
use rdf_query_model::{Graph, Triple};

/// An iterator over the triples constructed by a `CONSTRUCT` query.
pub struct QueryTripleIter<'a> {
    cursor: Cursor<ConstructMaterializer<'a>>,
}

impl<'a> QueryTripleIter<'a> {
    pub(crate) fn new(materializer: ConstructMaterializer<'a>, signal: CloseSignal) -> Self {
        Self {
            cursor: Cursor::new(materializer, signal),
        }
    }

    /// Collects the remaining triples into a [Graph].
    pub fn collect_as_graph(self) -> Result<Graph, QueryEvaluationError> {
        self.collect()
    }

    pub fn close(&mut self) {
        self.cursor.close();
    }

    pub fn is_closed(&self) -> bool {
        self.cursor.is_closed()
    }
}

impl Iterator for QueryTripleIter<'_> {
    type Item = Result<Triple, QueryEvaluationError>;

    fn next(&mut self) -> Option<Self::Item> {
        let quad = self.cursor.next()?;
        Some(quad.map(|quad| Triple::new(quad.subject, quad.predicate, quad.object)))
    }
}
