use rdf_query_functions::ExpressionEvaluator;
use rdf_query_logical::{Algebra, NamedGraphPattern};
use rdf_query_model::{Binding, Dataset, Graph, NamedOrBlankNode, Term, Variable};
use rustc_hash::FxHashSet;
use std::iter;
use std::rc::Rc;

mod bgp;
mod group;
mod join;

use join::LazySolutions;

/// A lazy sequence of solutions.
pub type SolutionIter<'a> = Box<dyn Iterator<Item = Binding> + 'a>;

/// Evaluates algebra trees against a [Dataset].
///
/// Evaluation is pull-based. Building the iterator for a plan does not touch the dataset, and
/// every operator only pulls as many solutions from its inputs as it needs to produce the next
/// one. Only `Group` and the right-hand side of the binary operators are materialized, and only
/// once the first solution is requested.
#[derive(Debug, Clone)]
pub struct PlanEvaluator<'a> {
    dataset: &'a Dataset,
    expressions: Rc<ExpressionEvaluator>,
}

impl<'a> PlanEvaluator<'a> {
    pub fn new(dataset: &'a Dataset, expressions: Rc<ExpressionEvaluator>) -> Self {
        Self {
            dataset,
            expressions,
        }
    }

    /// Evaluates `plan` with the default graph as the active graph.
    ///
    /// Every solution is compatible with `seed` and contains its bindings for the variables that
    /// are visible at the root of `plan`.
    pub fn evaluate(&self, plan: &Algebra, seed: Binding) -> SolutionIter<'a> {
        self.evaluate_in(plan, seed, self.dataset.default_graph())
    }

    fn evaluate_in(&self, plan: &Algebra, seed: Binding, graph: &'a Graph) -> SolutionIter<'a> {
        match plan {
            Algebra::Bgp { patterns } => bgp::evaluate_bgp(graph, patterns.clone(), seed),
            Algebra::Empty => Box::new(iter::empty()),
            Algebra::Filter { inner, expression } => {
                let expressions = Rc::clone(&self.expressions);
                let expression = expression.clone();
                Box::new(
                    self.evaluate_in(inner, seed, graph)
                        .filter(move |solution| {
                            expressions.effective_boolean_value(&expression, solution) == Ok(true)
                        }),
                )
            }
            Algebra::NotExists { inner, pattern } => {
                let evaluator = self.clone();
                let pattern = pattern.as_ref().clone();
                Box::new(self.evaluate_in(inner, seed, graph).filter(move |solution| {
                    evaluator
                        .evaluate_in(&pattern, solution.clone(), graph)
                        .next()
                        .is_none()
                }))
            }
            // The right side of MINUS does not see the bindings of the left side.
            Algebra::Minus { left, right } => join::minus(
                self.evaluate_in(left, seed, graph),
                self.lazy(right, Binding::new(), graph),
            ),
            Algebra::Join { left, right } => join::join(
                self.evaluate_in(left, seed.clone(), graph),
                self.lazy(right, seed, graph),
            ),
            Algebra::LeftJoin {
                left,
                right,
                expression,
            } => join::left_join(
                self.evaluate_in(left, seed.clone(), graph),
                self.lazy(right, seed, graph),
                expression.clone(),
                Rc::clone(&self.expressions),
            ),
            Algebra::Union { left, right } => Box::new(
                self.evaluate_in(left, seed.clone(), graph)
                    .chain(self.evaluate_in(right, seed, graph)),
            ),
            Algebra::Graph { name, inner } => self.evaluate_graph(name, inner, seed),
            Algebra::Extend {
                inner,
                variable,
                expression,
            } => {
                let expressions = Rc::clone(&self.expressions);
                let variable = variable.clone();
                let expression = expression.clone();
                Box::new(
                    self.evaluate_in(inner, seed, graph)
                        .filter_map(move |mut solution| {
                            // An error leaves the variable unbound.
                            let Ok(value) = expressions.evaluate(&expression, &solution) else {
                                return Some(solution);
                            };
                            match solution.get(&variable) {
                                Some(bound) if *bound != value => None,
                                Some(_) => Some(solution),
                                None => {
                                    solution.insert(variable.clone(), value);
                                    Some(solution)
                                }
                            }
                        }),
                )
            }
            Algebra::Project { inner, variables } => {
                // The projection hides all other variables, including those of the seed.
                let variables = variables.clone();
                let inner_seed = seed.project(&variables);
                Box::new(
                    self.evaluate_in(inner, inner_seed, graph)
                        .filter_map(move |solution| solution.project(&variables).merge(&seed)),
                )
            }
            Algebra::Distinct { inner } => {
                let mut seen = FxHashSet::default();
                Box::new(
                    self.evaluate_in(inner, seed, graph)
                        .filter(move |solution| seen.insert(solution.clone())),
                )
            }
            Algebra::Slice {
                inner,
                start,
                length,
            } => {
                let solutions = self.evaluate_in(inner, seed, graph).skip(*start);
                match length {
                    Some(length) => Box::new(solutions.take(*length)),
                    None => Box::new(solutions),
                }
            }
            Algebra::Group {
                inner,
                keys,
                aggregates,
            } => {
                let evaluator = self.clone();
                let inner = inner.as_ref().clone();
                let keys = keys.clone();
                let aggregates = aggregates.clone();
                let inner_seed = seed.project(&keys);
                let groups = iter::once(()).flat_map(move |()| {
                    let solutions = evaluator.evaluate_in(&inner, inner_seed.clone(), graph);
                    group::aggregate(solutions, &keys, &aggregates, &evaluator.expressions)
                });
                Box::new(groups.filter_map(move |solution| solution.merge(&seed)))
            }
        }
    }

    fn evaluate_graph(
        &self,
        name: &NamedGraphPattern,
        inner: &Algebra,
        seed: Binding,
    ) -> SolutionIter<'a> {
        match name {
            NamedGraphPattern::Variable(variable) if !seed.contains(variable) => {
                self.evaluate_each_named_graph(variable, inner, seed)
            }
            // Missing graphs have no solutions.
            _ => match graph_name(name, &seed).and_then(|name| self.dataset.named_graph(&name)) {
                Some(graph) => self.evaluate_in(inner, seed, graph),
                None => Box::new(iter::empty()),
            },
        }
    }

    /// Evaluates `inner` on every named graph, binding `variable` to the name of the graph.
    fn evaluate_each_named_graph(
        &self,
        variable: &Variable,
        inner: &Algebra,
        seed: Binding,
    ) -> SolutionIter<'a> {
        let evaluator = self.clone();
        let inner = inner.clone();
        let variable = variable.clone();
        let graphs = self
            .dataset
            .named_graphs()
            .map(|(name, graph)| (name.clone(), graph))
            .collect::<Vec<_>>();
        Box::new(graphs.into_iter().flat_map(move |(name, graph)| {
            let mut seed = seed.clone();
            seed.insert(variable.clone(), graph_name_term(name));
            evaluator.evaluate_in(&inner, seed, graph)
        }))
    }

    fn lazy(&self, plan: &Algebra, seed: Binding, graph: &'a Graph) -> LazySolutions<'a> {
        LazySolutions::new(self.clone(), plan.clone(), seed, graph)
    }
}

/// Returns the constant name of a graph, taking the value of a graph variable from the seed.
fn graph_name(name: &NamedGraphPattern, seed: &Binding) -> Option<NamedOrBlankNode> {
    match name {
        NamedGraphPattern::Variable(variable) => match seed.get(variable)? {
            Term::NamedNode(node) => Some(node.clone().into()),
            Term::BlankNode(node) => Some(node.clone().into()),
            Term::Literal(_) => None,
        },
        name => name.as_graph_name(),
    }
}

fn graph_name_term(name: NamedOrBlankNode) -> Term {
    match name {
        NamedOrBlankNode::NamedNode(node) => node.into(),
        NamedOrBlankNode::BlankNode(node) => node.into(),
    }
}
