//! The results of a [QueryExecution](crate::QueryExecution).
//!
//! All result iterators are lazy: they pull solutions from the dataset as they are advanced. They
//! can be closed explicitly, which releases the underlying cursor. Closing the execution that
//! returned them closes them as well. Every pull from a closed iterator reports
//! [QueryEvaluationError::Closed](crate::sparql::error::QueryEvaluationError::Closed).

mod cursor;
mod quads;
mod query_solution;
mod triples;

pub(crate) use cursor::CloseSignal;
pub use quads::QueryQuadIter;
pub use query_solution::QuerySolutionIter;
pub use triples::QueryTripleIter;
