use itertools::Itertools;
use oxrdf::{NamedNode, Subject, Term, Triple};
use rustc_hash::FxHashSet;
use std::fmt::{Display, Formatter};

/// An in-memory RDF graph: an unordered set of triples.
///
/// Inserting a triple that is already present has no effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: FxHashSet<Triple>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a triple. Returns `true` if the triple was not yet part of the graph.
    pub fn insert(&mut self, triple: impl Into<Triple>) -> bool {
        self.triples.insert(triple.into())
    }

    /// Removes a triple. Returns `true` if the triple was part of the graph.
    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Returns all triples that match the given positions. `None` matches any term.
    pub fn triples_for_pattern(
        &self,
        subject: Option<Subject>,
        predicate: Option<NamedNode>,
        object: Option<Term>,
    ) -> impl Iterator<Item = &Triple> {
        self.triples.iter().filter(move |triple| {
            subject.as_ref().map_or(true, |s| triple.subject == *s)
                && predicate.as_ref().map_or(true, |p| triple.predicate == *p)
                && object.as_ref().map_or(true, |o| triple.object == *o)
        })
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for Graph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        self.triples.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::collections::hash_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl Display for Graph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let lines = self
            .triples
            .iter()
            .map(ToString::to_string)
            .sorted()
            .map(|triple| format!("{triple} ."));
        write!(f, "{}", lines.format("\n"))
    }
}
