use crate::engine::SolutionIter;
use crate::sparql::UnboundVariablePolicy;
use rdf_query_logical::{ConstructTemplate, GraphNameTemplate, QuadTemplate};
use rdf_query_model::{
    Binding, BlankNode, GraphName, NamedNodePattern, Quad, Subject, Term, TermPattern, Variable,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use tracing::trace;

/// Allocates the fresh blank nodes of a single construct run.
///
/// Identifiers combine a random salt, drawn once per allocator, with a local counter. Two runs
/// therefore never share blank nodes, without any process-wide state.
#[derive(Debug)]
pub struct BlankNodeAllocator {
    salt: u128,
    counter: u128,
}

impl BlankNodeAllocator {
    pub fn new() -> Self {
        Self {
            salt: rand::random(),
            counter: 0,
        }
    }

    pub fn allocate(&mut self) -> BlankNode {
        self.counter = self.counter.wrapping_add(1);
        BlankNode::new_from_unique_id(self.salt.wrapping_add(self.counter))
    }
}

impl Default for BlankNodeAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Instantiates a `CONSTRUCT` template for every solution of a solution sequence.
///
/// Instances that are not valid RDF (e.g., a literal in subject position) are skipped. Every quad
/// is emitted at most once per run.
pub struct ConstructMaterializer<'a> {
    templates: Vec<QuadTemplate>,
    solutions: SolutionIter<'a>,
    policy: UnboundVariablePolicy,
    allocator: BlankNodeAllocator,
    buffered_results: VecDeque<Quad>,
    already_emitted_results: FxHashSet<Quad>,
}

impl<'a> ConstructMaterializer<'a> {
    /// Creates a materializer for the default graph. Templates nested in `GRAPH` blocks are
    /// ignored.
    pub fn triples(
        template: &ConstructTemplate,
        solutions: SolutionIter<'a>,
        policy: UnboundVariablePolicy,
    ) -> Self {
        let templates = template.default_graph_templates().cloned().collect();
        Self::new(templates, solutions, policy)
    }

    /// Creates a materializer for all templates. Templates outside of `GRAPH` blocks produce
    /// quads in the default graph.
    pub fn quads(
        template: &ConstructTemplate,
        solutions: SolutionIter<'a>,
        policy: UnboundVariablePolicy,
    ) -> Self {
        Self::new(template.quads().to_vec(), solutions, policy)
    }

    fn new(
        templates: Vec<QuadTemplate>,
        solutions: SolutionIter<'a>,
        policy: UnboundVariablePolicy,
    ) -> Self {
        Self {
            templates,
            solutions,
            policy,
            allocator: BlankNodeAllocator::new(),
            buffered_results: VecDeque::new(),
            already_emitted_results: FxHashSet::default(),
        }
    }

    fn instantiate_all(&mut self, solution: &Binding) {
        let mut scope = SolutionScope::new(solution, &mut self.allocator);
        for template in &self.templates {
            if !is_resolved(template, solution, self.policy) {
                trace!(%template, "Skipping template with unbound variables");
                continue;
            }

            match scope.instantiate(template) {
                Ok(quad) => {
                    if self.already_emitted_results.insert(quad.clone()) {
                        self.buffered_results.push_back(quad);
                    }
                }
                Err(reason) => trace!(%template, reason, "Rejected template instance"),
            }
        }
    }
}

impl Iterator for ConstructMaterializer<'_> {
    type Item = Quad;

    fn next(&mut self) -> Option<Quad> {
        loop {
            if let Some(quad) = self.buffered_results.pop_front() {
                return Some(quad);
            }

            let solution = self.solutions.next()?;
            self.instantiate_all(&solution);
        }
    }
}

/// Decides whether `template` is instantiated for `solution` under `policy`.
fn is_resolved(template: &QuadTemplate, solution: &Binding, policy: UnboundVariablePolicy) -> bool {
    let variables = template.variables().count();
    let unbound = template
        .variables()
        .filter(|variable| !solution.contains(variable))
        .count();
    match policy {
        UnboundVariablePolicy::FreshBlankNode => unbound == 0 || unbound < variables,
        UnboundVariablePolicy::Skip => unbound == 0,
    }
}

/// The blank nodes allocated for a single solution.
struct SolutionScope<'s> {
    solution: &'s Binding,
    allocator: &'s mut BlankNodeAllocator,
    labels: FxHashMap<BlankNode, BlankNode>,
    unbound: FxHashMap<Variable, BlankNode>,
}

impl<'s> SolutionScope<'s> {
    fn new(solution: &'s Binding, allocator: &'s mut BlankNodeAllocator) -> Self {
        Self {
            solution,
            allocator,
            labels: FxHashMap::default(),
            unbound: FxHashMap::default(),
        }
    }

    fn instantiate(&mut self, template: &QuadTemplate) -> Result<Quad, &'static str> {
        let subject = match self.term(&template.subject) {
            Term::NamedNode(node) => Subject::NamedNode(node),
            Term::BlankNode(node) => Subject::BlankNode(node),
            Term::Literal(_) => return Err("literal subject"),
        };
        let predicate = match &template.predicate {
            NamedNodePattern::NamedNode(node) => node.clone(),
            NamedNodePattern::Variable(variable) => match self.solution.get(variable) {
                Some(Term::NamedNode(node)) => node.clone(),
                _ => return Err("predicate is not an IRI"),
            },
        };
        let object = self.term(&template.object);
        let graph_name = match &template.graph_name {
            GraphNameTemplate::DefaultGraph => GraphName::DefaultGraph,
            GraphNameTemplate::NamedNode(node) => GraphName::NamedNode(node.clone()),
            GraphNameTemplate::BlankNode(label) => GraphName::BlankNode(self.label(label)),
            GraphNameTemplate::Variable(variable) => match self.variable(variable) {
                Term::NamedNode(node) => GraphName::NamedNode(node),
                Term::BlankNode(node) => GraphName::BlankNode(node),
                Term::Literal(_) => return Err("literal graph name"),
            },
        };
        Ok(Quad::new(subject, predicate, object, graph_name))
    }

    fn term(&mut self, pattern: &TermPattern) -> Term {
        match pattern {
            TermPattern::NamedNode(node) => node.clone().into(),
            TermPattern::BlankNode(label) => self.label(label).into(),
            TermPattern::Literal(literal) => literal.clone().into(),
            TermPattern::Variable(variable) => self.variable(variable),
        }
    }

    /// Template blank nodes are fresh once per solution.
    fn label(&mut self, label: &BlankNode) -> BlankNode {
        let allocator = &mut self.allocator;
        self.labels
            .entry(label.clone())
            .or_insert_with(|| allocator.allocate())
            .clone()
    }

    /// Unbound variables become a fresh blank node, shared by all templates of the solution.
    fn variable(&mut self, variable: &Variable) -> Term {
        if let Some(term) = self.solution.get(variable) {
            return term.clone();
        }
        let allocator = &mut self.allocator;
        self.unbound
            .entry(variable.clone())
            .or_insert_with(|| allocator.allocate())
            .clone()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use rdf_query_model::{Literal, NamedNode, TriplePattern};

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example/ns#{name}"))
    }

    fn var(name: &str) -> Variable {
        Variable::new_unchecked(name)
    }

    fn solutions(solutions: Vec<Binding>) -> SolutionIter<'static> {
        Box::new(solutions.into_iter())
    }

    fn spo_template() -> ConstructTemplate {
        ConstructTemplate::from_triples([TriplePattern {
            subject: var("s").into(),
            predicate: var("p").into(),
            object: var("o").into(),
        }])
    }

    fn spo(s: impl Into<Term>, p: impl Into<Term>, o: impl Into<Term>) -> Binding {
        Binding::from_iter([
            (var("s"), s.into()),
            (var("p"), p.into()),
            (var("o"), o.into()),
        ])
    }

    #[test]
    fn zero_solutions_yield_nothing() {
        let materializer = ConstructMaterializer::triples(
            &spo_template(),
            solutions(Vec::new()),
            UnboundVariablePolicy::default(),
        );
        assert_eq!(materializer.count(), 0);
    }

    #[test]
    fn deduplicates_across_solutions() {
        let solution = spo(ex("s"), ex("p"), ex("o"));
        let mut materializer = ConstructMaterializer::triples(
            &spo_template(),
            solutions(vec![solution.clone(), solution]),
            UnboundVariablePolicy::default(),
        );
        insta::assert_snapshot!(
            materializer.join("\n"),
            @"<http://example/ns#s> <http://example/ns#p> <http://example/ns#o>"
        );
    }

    #[test]
    fn rejects_invalid_instances() {
        let literal = Literal::new_simple_literal("x");
        let mut materializer = ConstructMaterializer::triples(
            &spo_template(),
            solutions(vec![
                spo(literal.clone(), ex("p"), ex("o")),
                spo(ex("s"), literal.clone(), ex("o")),
                spo(ex("s"), ex("p"), literal),
            ]),
            UnboundVariablePolicy::default(),
        );
        insta::assert_snapshot!(
            materializer.join("\n"),
            @r#"<http://example/ns#s> <http://example/ns#p> "x""#
        );
    }

    #[test]
    fn template_blank_nodes_are_fresh_per_solution() {
        let template = ConstructTemplate::from_triples([TriplePattern {
            subject: BlankNode::new_unchecked("b").into(),
            predicate: ex("p").into(),
            object: var("o").into(),
        }]);
        let quads = ConstructMaterializer::triples(
            &template,
            solutions(vec![
                Binding::from_iter([(var("o"), ex("o1").into())]),
                Binding::from_iter([(var("o"), ex("o2").into())]),
            ]),
            UnboundVariablePolicy::default(),
        )
        .collect::<Vec<_>>();

        assert_eq!(quads.len(), 2);
        assert_ne!(quads[0].subject, quads[1].subject);
        assert!(quads.iter().all(|quad| quad.subject.is_blank_node()));
    }

    #[test]
    fn unbound_variables_follow_the_policy() {
        let partially_bound =
            Binding::from_iter([(var("s"), ex("s").into()), (var("p"), ex("p").into())]);

        let fresh = ConstructMaterializer::triples(
            &spo_template(),
            solutions(vec![partially_bound.clone(), Binding::new()]),
            UnboundVariablePolicy::FreshBlankNode,
        )
        .collect::<Vec<_>>();
        assert_eq!(fresh.len(), 1);
        assert!(fresh[0].object.is_blank_node());

        let skipped = ConstructMaterializer::triples(
            &spo_template(),
            solutions(vec![partially_bound]),
            UnboundVariablePolicy::Skip,
        );
        assert_eq!(skipped.count(), 0);
    }

    #[test]
    fn quads_keep_graph_templates() {
        let template = ConstructTemplate::new([
            QuadTemplate {
                subject: var("s").into(),
                predicate: var("p").into(),
                object: var("o").into(),
                graph_name: GraphNameTemplate::Variable(var("g")),
            },
            QuadTemplate {
                subject: var("s").into(),
                predicate: var("p").into(),
                object: var("o").into(),
                graph_name: GraphNameTemplate::DefaultGraph,
            },
        ]);
        let mut solution = spo(ex("s"), ex("p"), ex("o"));
        solution.insert(var("g"), ex("g"));

        let triples = ConstructMaterializer::triples(
            &template,
            solutions(vec![solution.clone()]),
            UnboundVariablePolicy::default(),
        );
        assert_eq!(triples.count(), 1);

        let quads = ConstructMaterializer::quads(
            &template,
            solutions(vec![solution]),
            UnboundVariablePolicy::default(),
        );
        insta::assert_snapshot!(quads.map(|quad| quad.to_string()).sorted().join("\n"), @r"
        <http://example/ns#s> <http://example/ns#p> <http://example/ns#o>
        <http://example/ns#s> <http://example/ns#p> <http://example/ns#o> <http://example/ns#g>
        ");
    }

    #[test]
    fn rejects_literal_graph_names() {
        let template = ConstructTemplate::new([QuadTemplate {
            subject: var("s").into(),
            predicate: var("p").into(),
            object: var("o").into(),
            graph_name: GraphNameTemplate::Variable(var("g")),
        }]);
        let mut literal_graph = spo(ex("s"), ex("p"), ex("o"));
        literal_graph.insert(var("g"), Literal::new_simple_literal("g"));
        let mut named_graph = spo(ex("s"), ex("p"), ex("o"));
        named_graph.insert(var("g"), ex("g"));

        let mut quads = ConstructMaterializer::quads(
            &template,
            solutions(vec![literal_graph, named_graph]),
            UnboundVariablePolicy::default(),
        );
        insta::assert_snapshot!(
            quads.join("\n"),
            @"<http://example/ns#s> <http://example/ns#p> <http://example/ns#o> <http://example/ns#g>"
        );
    }

    #[test]
    fn allocators_do_not_share_blank_nodes() {
        let mut first = BlankNodeAllocator::new();
        let mut second = BlankNodeAllocator::new();
        let allocated = (0..10).map(|_| first.allocate()).collect::<FxHashSet<_>>();
        assert_eq!(allocated.len(), 10);
        assert!((0..10).all(|_| !allocated.contains(&second.allocate())));
    }
}
