#![doc(test(attr(deny(warnings))))]

mod algebra;
mod error;
mod expression;
mod query;
mod rewriting;
mod substitution;
mod template;

pub use algebra::{AggregateExpression, Algebra, NamedGraphPattern};
pub use error::{QueryParseError, SubstitutionError};
pub use expression::{Expression, Function};
pub use query::{Query, QueryForm};
pub use rewriting::GraphPatternRewriter;
pub use substitution::{substitute, substitute_expression, substitute_query};
pub use template::{ConstructTemplate, GraphNameTemplate, QuadTemplate};
