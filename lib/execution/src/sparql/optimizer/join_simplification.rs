use crate::sparql::optimizer::{OptimizerRule, Transformed};
use rdf_query_logical::Algebra;

/// Removes joins with the unit table and merges joins of basic graph patterns.
#[derive(Debug)]
pub struct JoinSimplificationRule;

impl OptimizerRule for JoinSimplificationRule {
    fn name(&self) -> &str {
        "join_simplification"
    }

    fn rewrite(&self, node: Algebra) -> Transformed {
        let Algebra::Join { left, right } = node else {
            return Transformed::no(node);
        };

        match (*left, *right) {
            (left, right) if left.is_unit() => Transformed::yes(right),
            (left, right) if right.is_unit() => Transformed::yes(left),
            (Algebra::Bgp { patterns: mut left }, Algebra::Bgp { patterns: right }) => {
                left.extend(right);
                Transformed::yes(Algebra::bgp(left))
            }
            (left, right) => Transformed::no(Algebra::join(left, right)),
        }
    }
}
