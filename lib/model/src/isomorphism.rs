//! Isomorphism of graphs and datasets up to blank node renaming.
//!
//! Two graphs are isomorphic if there is a bijection between their blank nodes that maps the
//! triples of one graph exactly onto the triples of the other. Datasets are compared the same way
//! with quads; blank nodes used as graph names take part in the same bijection.
//!
//! The search is a plain backtracking search. It is exponential in the worst case and is meant
//! for comparing query results in tests and other verification contexts.

use crate::{Dataset, Graph};
use oxrdf::{BlankNode, GraphName, Quad, Subject, Term, Triple};
use rustc_hash::{FxHashMap, FxHashSet};

/// Checks if two graphs are equal up to blank node renaming.
pub fn are_graphs_isomorphic(lhs: &Graph, rhs: &Graph) -> bool {
    if lhs.len() != rhs.len() {
        return false;
    }
    are_quads_isomorphic(
        lhs.iter().map(in_default_graph).collect(),
        rhs.iter().map(in_default_graph).collect(),
    )
}

/// Checks if two datasets are equal up to blank node renaming.
///
/// Named graphs without any triples do not take part in the comparison.
pub fn are_datasets_isomorphic(lhs: &Dataset, rhs: &Dataset) -> bool {
    if lhs.len() != rhs.len() {
        return false;
    }
    are_quads_isomorphic(lhs.iter().collect(), rhs.iter().collect())
}

fn in_default_graph(triple: &Triple) -> Quad {
    Quad::new(
        triple.subject.clone(),
        triple.predicate.clone(),
        triple.object.clone(),
        GraphName::DefaultGraph,
    )
}

fn are_quads_isomorphic(lhs: Vec<Quad>, rhs: Vec<Quad>) -> bool {
    let (lhs_ground, lhs_blank): (Vec<_>, Vec<_>) = lhs.into_iter().partition(is_ground);
    let (rhs_ground, rhs_blank): (Vec<_>, Vec<_>) = rhs.into_iter().partition(is_ground);

    if lhs_ground.len() != rhs_ground.len() || lhs_blank.len() != rhs_blank.len() {
        return false;
    }

    // Quads without blank nodes must match exactly.
    let rhs_ground = rhs_ground.into_iter().collect::<FxHashSet<_>>();
    if !lhs_ground.iter().all(|quad| rhs_ground.contains(quad)) {
        return false;
    }

    match BijectionSearch::try_new(&lhs_blank, rhs_blank) {
        Some(mut search) => search.run(0),
        None => false,
    }
}

fn is_ground(quad: &Quad) -> bool {
    blank_nodes(quad).next().is_none()
}

/// Returns the blank nodes of a quad, in subject, object, graph name order.
fn blank_nodes(quad: &Quad) -> impl Iterator<Item = &BlankNode> {
    let subject = match &quad.subject {
        Subject::BlankNode(node) => Some(node),
        _ => None,
    };
    let object = match &quad.object {
        Term::BlankNode(node) => Some(node),
        _ => None,
    };
    let graph_name = match &quad.graph_name {
        GraphName::BlankNode(node) => Some(node),
        _ => None,
    };
    subject.into_iter().chain(object).chain(graph_name)
}

/// How often a blank node occurs as subject, object and graph name.
type Signature = [usize; 3];

fn signatures(quads: &[Quad]) -> FxHashMap<BlankNode, Signature> {
    let mut signatures = FxHashMap::<BlankNode, Signature>::default();
    for quad in quads {
        if let Subject::BlankNode(node) = &quad.subject {
            signatures.entry(node.clone()).or_default()[0] += 1;
        }
        if let Term::BlankNode(node) = &quad.object {
            signatures.entry(node.clone()).or_default()[1] += 1;
        }
        if let GraphName::BlankNode(node) = &quad.graph_name {
            signatures.entry(node.clone()).or_default()[2] += 1;
        }
    }
    signatures
}

/// Backtracking search for a blank node bijection.
///
/// The blank nodes of the left-hand side are assigned in the order of their first occurrence.
/// Each quad is checked as soon as all of its blank nodes are assigned, which prunes a branch as
/// early as possible.
struct BijectionSearch {
    /// Blank nodes of the left-hand side, in assignment order.
    sources: Vec<BlankNode>,
    /// Right-hand side blank nodes with the same signature, per source.
    candidates: Vec<Vec<BlankNode>>,
    /// Left-hand side quads that are fully assigned once the source with the same index is.
    checks: Vec<Vec<Quad>>,
    target: FxHashSet<Quad>,
    mapping: FxHashMap<BlankNode, BlankNode>,
    used: FxHashSet<BlankNode>,
}

impl BijectionSearch {
    fn try_new(lhs: &[Quad], rhs: Vec<Quad>) -> Option<Self> {
        let lhs_signatures = signatures(lhs);
        let rhs_signatures = signatures(&rhs);
        if lhs_signatures.len() != rhs_signatures.len() {
            return None;
        }

        let mut sources = Vec::new();
        let mut position = FxHashMap::default();
        for node in lhs.iter().flat_map(blank_nodes) {
            if !position.contains_key(node) {
                position.insert(node.clone(), sources.len());
                sources.push(node.clone());
            }
        }

        let mut candidates = Vec::with_capacity(sources.len());
        for source in &sources {
            let signature = lhs_signatures.get(source)?;
            let matching = rhs_signatures
                .iter()
                .filter(|(_, candidate)| *candidate == signature)
                .map(|(node, _)| node.clone())
                .collect::<Vec<_>>();
            if matching.is_empty() {
                return None;
            }
            candidates.push(matching);
        }

        let mut checks = vec![Vec::new(); sources.len()];
        for quad in lhs {
            let last = blank_nodes(quad)
                .filter_map(|node| position.get(node).copied())
                .max()?;
            checks[last].push(quad.clone());
        }

        Some(Self {
            sources,
            candidates,
            checks,
            target: rhs.into_iter().collect(),
            mapping: FxHashMap::default(),
            used: FxHashSet::default(),
        })
    }

    fn run(&mut self, index: usize) -> bool {
        let Some(source) = self.sources.get(index).cloned() else {
            return true;
        };

        for candidate in self.candidates[index].clone() {
            if self.used.contains(&candidate) {
                continue;
            }

            self.mapping.insert(source.clone(), candidate.clone());
            self.used.insert(candidate.clone());

            if self.checks_hold(index) && self.run(index + 1) {
                return true;
            }

            self.mapping.remove(&source);
            self.used.remove(&candidate);
        }

        false
    }

    fn checks_hold(&self, index: usize) -> bool {
        self.checks[index].iter().all(|quad| {
            map_quad(quad, &self.mapping).is_some_and(|mapped| self.target.contains(&mapped))
        })
    }
}

fn map_quad(quad: &Quad, mapping: &FxHashMap<BlankNode, BlankNode>) -> Option<Quad> {
    let subject = match &quad.subject {
        Subject::BlankNode(node) => Subject::BlankNode(mapping.get(node)?.clone()),
        subject => subject.clone(),
    };
    let object = match &quad.object {
        Term::BlankNode(node) => Term::BlankNode(mapping.get(node)?.clone()),
        object => object.clone(),
    };
    let graph_name = match &quad.graph_name {
        GraphName::BlankNode(node) => GraphName::BlankNode(mapping.get(node)?.clone()),
        graph_name => graph_name.clone(),
    };
    Some(Quad::new(
        subject,
        quad.predicate.clone(),
        object,
        graph_name,
    ))
}
