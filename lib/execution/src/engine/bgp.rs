use crate::engine::SolutionIter;
use rdf_query_model::{
    Binding, Graph, NamedNode, NamedNodePattern, Subject, Term, TermPattern, TermRef,
    TriplePattern, Variable,
};
use std::iter;

/// Evaluates a basic graph pattern as a nested-loop join of its triple patterns.
pub(super) fn evaluate_bgp<'a>(
    graph: &'a Graph,
    patterns: Vec<TriplePattern>,
    seed: Binding,
) -> SolutionIter<'a> {
    let seed: SolutionIter<'a> = Box::new(iter::once(seed));
    patterns.into_iter().fold(seed, |solutions, pattern| {
        Box::new(solutions.flat_map(move |solution| match_pattern(graph, &pattern, solution)))
    })
}

/// A position of a triple pattern after looking up the variables of the current solution.
#[derive(Debug, Clone)]
enum Slot {
    Constant(Term),
    Free(Variable),
}

impl Slot {
    fn new(pattern: &TermPattern, solution: &Binding) -> Self {
        match pattern {
            TermPattern::NamedNode(node) => Slot::Constant(node.clone().into()),
            TermPattern::BlankNode(node) => Slot::Constant(node.clone().into()),
            TermPattern::Literal(literal) => Slot::Constant(literal.clone().into()),
            TermPattern::Variable(variable) => Self::for_variable(variable, solution),
        }
    }

    fn for_predicate(pattern: &NamedNodePattern, solution: &Binding) -> Self {
        match pattern {
            NamedNodePattern::NamedNode(node) => Slot::Constant(node.clone().into()),
            NamedNodePattern::Variable(variable) => Self::for_variable(variable, solution),
        }
    }

    fn for_variable(variable: &Variable, solution: &Binding) -> Self {
        match solution.get(variable) {
            Some(term) => Slot::Constant(term.clone()),
            None => Slot::Free(variable.clone()),
        }
    }

    fn constant(&self) -> Option<&Term> {
        match self {
            Slot::Constant(term) => Some(term),
            Slot::Free(_) => None,
        }
    }

    fn subject(&self) -> Option<Subject> {
        match self.constant()? {
            Term::NamedNode(node) => Some(node.clone().into()),
            Term::BlankNode(node) => Some(node.clone().into()),
            Term::Literal(_) => None,
        }
    }

    fn named_node(&self) -> Option<NamedNode> {
        match self.constant()? {
            Term::NamedNode(node) => Some(node.clone()),
            Term::BlankNode(_) | Term::Literal(_) => None,
        }
    }

    fn is_literal(&self) -> bool {
        matches!(self, Slot::Constant(Term::Literal(_)))
    }

    fn is_named_node(&self) -> bool {
        matches!(self, Slot::Constant(Term::NamedNode(_)) | Slot::Free(_))
    }

    /// Matches `term` against the slot, binding a free variable if it is not yet bound by an
    /// earlier position of the same pattern.
    fn bind(&self, term: TermRef<'_>, solution: &mut Binding) -> bool {
        match self {
            Slot::Constant(constant) => constant.as_ref() == term,
            Slot::Free(variable) => match solution.get(variable) {
                Some(bound) => bound.as_ref() == term,
                None => {
                    solution.insert(variable.clone(), term.into_owned());
                    true
                }
            },
        }
    }
}

fn match_pattern<'a>(
    graph: &'a Graph,
    pattern: &TriplePattern,
    solution: Binding,
) -> SolutionIter<'a> {
    let subject = Slot::new(&pattern.subject, &solution);
    let predicate = Slot::for_predicate(&pattern.predicate, &solution);
    let object = Slot::new(&pattern.object, &solution);

    // Literals are never subjects and predicates are always IRIs.
    if subject.is_literal() || !predicate.is_named_node() {
        return Box::new(iter::empty());
    }

    let candidates = graph.triples_for_pattern(
        subject.subject(),
        predicate.named_node(),
        object.constant().cloned(),
    );
    Box::new(candidates.filter_map(move |triple| {
        let mut solution = solution.clone();
        let matches = subject.bind(triple.subject.as_ref().into(), &mut solution)
            && predicate.bind(triple.predicate.as_ref().into(), &mut solution)
            && object.bind(triple.object.as_ref(), &mut solution);
        matches.then_some(solution)
    }))
}
