#![doc(test(attr(deny(warnings))))]

mod comparison;
mod ebv;
mod evaluator;
mod numeric;
mod op;
mod registry;
mod strings;
mod terms;

pub use comparison::{compare, equal, same_term};
pub use ebv::effective_boolean_value;
pub use evaluator::ExpressionEvaluator;
pub use op::{ScalarSparqlOp, SparqlOpArity, StringLiteralRef};
pub use registry::FunctionRegistry;
