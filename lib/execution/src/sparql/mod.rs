//! Configuration, errors and the optimizer of the query engine.

pub mod error;
mod optimizer;

pub use optimizer::{
    ConstantFoldingRule, EmptyPropagationRule, JoinSimplificationRule, Optimizer, OptimizerRule,
};

/// Defines how many optimizations the query optimizer should apply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OptimizationLevel {
    /// No optimizations. The substituted plan is evaluated as is.
    None,
    /// Folds constant expressions and removes branches that cannot produce solutions.
    Default,
    /// Runs all optimizations.
    #[default]
    Full,
}

/// Defines what happens with template variables that are unbound in a solution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnboundVariablePolicy {
    /// An unbound variable becomes a fresh blank node for the current solution. Templates whose
    /// variables are all unbound are skipped.
    #[default]
    FreshBlankNode,
    /// Templates with an unbound variable are skipped.
    Skip,
}

/// Options for query evaluation.
#[derive(Clone, Debug, Default)]
pub struct QueryOptions {
    /// The defined optimization level
    pub optimization_level: OptimizationLevel,
    /// How unbound variables in `CONSTRUCT` templates are instantiated.
    pub unbound_template_variables: UnboundVariablePolicy,
}
