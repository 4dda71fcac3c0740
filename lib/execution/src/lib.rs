#![doc(test(attr(deny(warnings))))]

//! This crate defines the execution engine of RDF Query.
//!
//! # Executing Queries
//!
//! A [QueryExecution] runs a parsed [Query](rdf_query_logical::Query) against an in-memory
//! [Dataset](rdf_query_model::Dataset). Preparing an execution goes through the following
//! pipeline:
//!
//! ```text
//! Query -> Substitution of the Initial Binding -> Optimizer -> Pull-Based Evaluation
//! ```
//!
//! The initial binding is substituted into the algebra before the optimizer runs, as binding a
//! variable can decide the outcome of a filter. The optimized plan is then evaluated lazily: every
//! result iterator pulls solutions from the dataset only when it is advanced itself.
//!
//! # Constructing Graphs
//!
//! `CONSTRUCT` queries instantiate their template once per solution. Depending on the method
//! used, the results are triples of the default graph template or quads that also contain the
//! templates nested in `GRAPH` blocks.

mod construct;
mod engine;
mod execution;
pub mod results;
pub mod sparql;

pub use construct::{BlankNodeAllocator, ConstructMaterializer};
pub use engine::{PlanEvaluator, SolutionIter};
pub use execution::QueryExecution;
