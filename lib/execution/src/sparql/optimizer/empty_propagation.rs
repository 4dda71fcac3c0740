use crate::sparql::optimizer::{OptimizerRule, Transformed};
use rdf_query_logical::Algebra;
use rdf_query_model::TermPattern;

/// Removes parts of the plan that cannot produce any solution.
///
/// A `Group` without keys is kept even if its input is empty, as it still produces a single
/// solution.
#[derive(Debug)]
pub struct EmptyPropagationRule;

impl OptimizerRule for EmptyPropagationRule {
    fn name(&self) -> &str {
        "empty_propagation"
    }

    fn rewrite(&self, node: Algebra) -> Transformed {
        match node {
            // Literals are never subjects.
            Algebra::Bgp { patterns }
                if patterns
                    .iter()
                    .any(|pattern| matches!(pattern.subject, TermPattern::Literal(_))) =>
            {
                Transformed::yes(Algebra::Empty)
            }
            Algebra::Filter { inner, .. }
            | Algebra::Extend { inner, .. }
            | Algebra::Graph { inner, .. }
            | Algebra::Project { inner, .. }
            | Algebra::Distinct { inner }
            | Algebra::Slice { inner, .. }
                if inner.is_empty() =>
            {
                Transformed::yes(Algebra::Empty)
            }
            Algebra::Slice {
                length: Some(0), ..
            } => Transformed::yes(Algebra::Empty),
            Algebra::Group { inner, keys, .. } if inner.is_empty() && !keys.is_empty() => {
                Transformed::yes(Algebra::Empty)
            }
            Algebra::Join { left, right } if left.is_empty() || right.is_empty() => {
                Transformed::yes(Algebra::Empty)
            }
            Algebra::LeftJoin { left, .. }
            | Algebra::Minus { left, .. }
            | Algebra::NotExists { inner: left, .. }
                if left.is_empty() =>
            {
                Transformed::yes(Algebra::Empty)
            }
            Algebra::LeftJoin { left, right, .. }
            | Algebra::Minus { left, right }
            | Algebra::NotExists {
                inner: left,
                pattern: right,
            } if right.is_empty() => Transformed::yes(*left),
            Algebra::Union { left, right } if left.is_empty() => Transformed::yes(*right),
            Algebra::Union { left, right } if right.is_empty() => Transformed::yes(*left),
            node => Transformed::no(node),
        }
    }
}
