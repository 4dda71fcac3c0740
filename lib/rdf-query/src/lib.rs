#![doc(test(attr(deny(warnings))))]

//! RDF Query evaluates SPARQL queries over an in-memory RDF [Dataset](model::Dataset).
//!
//! ```
//! use rdf_query::model::{Binding, Dataset, GraphName, Literal, NamedNode, Quad, Variable};
//! use rdf_query::{Query, QueryExecution};
//!
//! let p = NamedNode::new("http://example/ns#p")?;
//! let dataset = Dataset::from_iter([
//!     Quad::new(
//!         NamedNode::new("http://example/ns#a")?,
//!         p.clone(),
//!         Literal::from(1_i64),
//!         GraphName::DefaultGraph,
//!     ),
//!     Quad::new(
//!         NamedNode::new("http://example/ns#b")?,
//!         p,
//!         Literal::from(2_i64),
//!         GraphName::DefaultGraph,
//!     ),
//! ]);
//!
//! let query = Query::parse("SELECT ?s { ?s <http://example/ns#p> ?o }", None)?;
//! let mut execution = QueryExecution::new(&query, &dataset);
//! execution.set_initial_binding(Binding::from_iter([(
//!     Variable::new("o")?,
//!     Literal::from(2_i64).into(),
//! )]))?;
//!
//! let solutions = execution.exec_select()?.collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(solutions.len(), 1);
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

pub use rdf_query_execution::sparql::error::QueryEvaluationError;
pub use rdf_query_execution::sparql::{OptimizationLevel, QueryOptions, UnboundVariablePolicy};
pub use rdf_query_execution::QueryExecution;
pub use rdf_query_logical::{Query, QueryParseError};

pub mod model {
    pub use rdf_query_model::*;
}

pub mod logical {
    pub use rdf_query_logical::*;
}

pub mod functions {
    pub use rdf_query_functions::*;
}

pub mod execution {
    pub use rdf_query_execution::*;
}
