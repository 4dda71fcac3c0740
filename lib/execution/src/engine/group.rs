use itertools::Itertools;
use rdf_query_functions::ExpressionEvaluator;
use rdf_query_logical::AggregateExpression;
use rdf_query_model::vocab::xsd;
use rdf_query_model::{Binding, Literal, Variable};
use rustc_hash::FxHashMap;

/// Groups `solutions` by `keys` and computes the aggregates of each group.
///
/// Without keys, there is always exactly one group, even if there are no solutions.
pub(super) fn aggregate(
    solutions: impl Iterator<Item = Binding>,
    keys: &[Variable],
    aggregates: &[(Variable, AggregateExpression)],
    expressions: &ExpressionEvaluator,
) -> Vec<Binding> {
    let mut positions = FxHashMap::<Binding, usize>::default();
    let mut groups = Vec::<(Binding, Vec<Binding>)>::new();
    for solution in solutions {
        let key = solution.project(keys);
        let position = *positions.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        if let Some((_, members)) = groups.get_mut(position) {
            members.push(solution);
        }
    }

    if groups.is_empty() && keys.is_empty() {
        groups.push((Binding::new(), Vec::new()));
    }

    groups
        .into_iter()
        .map(|(mut row, members)| {
            for (variable, aggregate) in aggregates {
                let value = count(aggregate, &members, expressions);
                row.insert(
                    variable.clone(),
                    Literal::new_typed_literal(value.to_string(), xsd::INTEGER),
                );
            }
            row
        })
        .collect()
}

fn count(
    aggregate: &AggregateExpression,
    members: &[Binding],
    expressions: &ExpressionEvaluator,
) -> usize {
    match aggregate {
        AggregateExpression::Count {
            expression: None,
            distinct,
        } => {
            if *distinct {
                members.iter().unique().count()
            } else {
                members.len()
            }
        }
        AggregateExpression::Count {
            expression: Some(expression),
            distinct,
        } => {
            // Solutions for which the expression fails are not counted.
            let values = members
                .iter()
                .filter_map(|member| expressions.evaluate(expression, member).ok());
            if *distinct {
                values.unique().count()
            } else {
                values.count()
            }
        }
    }
}
