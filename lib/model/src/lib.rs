#![doc(test(attr(deny(warnings))))]

mod binding;
mod dataset;
mod error;
mod graph;
pub mod isomorphism;
mod typed_value;

pub use binding::Binding;
pub use dataset::{to_graph_name, Dataset};
pub use error::*;
pub use graph::Graph;
pub use typed_value::*;

// Re-export the data model of oxrdf and the term patterns of spargebra.
pub use oxrdf::vocab;
pub use oxrdf::{
    BlankNode, BlankNodeRef, GraphName, GraphNameRef, Literal, LiteralRef, NamedNode,
    NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Quad, QuadRef, Subject, SubjectRef, Term,
    TermRef, Triple, TripleRef, Variable, VariableRef,
};
pub use oxsdatatypes::{Decimal, Double, Integer};
pub use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};
