use crate::Graph;
use oxrdf::{GraphName, NamedOrBlankNode, Quad, Triple};
use rustc_hash::FxHashMap;

/// An in-memory RDF dataset: one default graph and a set of named graphs.
///
/// Named graphs are identified by an IRI or a blank node. A named graph that has been inserted
/// explicitly exists even if it is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    default_graph: Graph,
    named_graphs: FxHashMap<NamedOrBlankNode, Graph>,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dataset that uses `graph` as its default graph.
    pub fn from_default_graph(graph: Graph) -> Self {
        Self {
            default_graph: graph,
            named_graphs: FxHashMap::default(),
        }
    }

    /// Adds a quad. Returns `true` if the quad was not yet part of the dataset.
    pub fn insert(&mut self, quad: impl Into<Quad>) -> bool {
        let quad = quad.into();
        let triple = Triple::new(quad.subject, quad.predicate, quad.object);
        match quad.graph_name {
            GraphName::DefaultGraph => self.default_graph.insert(triple),
            GraphName::NamedNode(name) => self
                .named_graphs
                .entry(name.into())
                .or_default()
                .insert(triple),
            GraphName::BlankNode(name) => self
                .named_graphs
                .entry(name.into())
                .or_default()
                .insert(triple),
        }
    }

    /// Adds (or replaces) the named graph `name`.
    pub fn insert_named_graph(&mut self, name: impl Into<NamedOrBlankNode>, graph: Graph) {
        self.named_graphs.insert(name.into(), graph);
    }

    pub fn contains(&self, quad: &Quad) -> bool {
        let triple = Triple::new(
            quad.subject.clone(),
            quad.predicate.clone(),
            quad.object.clone(),
        );
        match self.graph(&quad.graph_name) {
            Some(graph) => graph.contains(&triple),
            None => false,
        }
    }

    /// Returns the graph with the given name, if it exists.
    pub fn graph(&self, graph_name: &GraphName) -> Option<&Graph> {
        match graph_name {
            GraphName::DefaultGraph => Some(&self.default_graph),
            GraphName::NamedNode(name) => self.named_graphs.get(&name.clone().into()),
            GraphName::BlankNode(name) => self.named_graphs.get(&name.clone().into()),
        }
    }

    pub fn default_graph(&self) -> &Graph {
        &self.default_graph
    }

    pub fn default_graph_mut(&mut self) -> &mut Graph {
        &mut self.default_graph
    }

    pub fn named_graph(&self, name: &NamedOrBlankNode) -> Option<&Graph> {
        self.named_graphs.get(name)
    }

    /// Iterates over all named graphs in an unspecified order.
    pub fn named_graphs(&self) -> impl Iterator<Item = (&NamedOrBlankNode, &Graph)> {
        self.named_graphs.iter()
    }

    /// The total number of quads in the dataset.
    pub fn len(&self) -> usize {
        self.default_graph.len() + self.named_graphs.values().map(Graph::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over all quads of the dataset.
    pub fn iter(&self) -> impl Iterator<Item = Quad> + '_ {
        let default = self
            .default_graph
            .iter()
            .map(|triple| in_graph(triple, GraphName::DefaultGraph));
        let named = self.named_graphs.iter().flat_map(|(name, graph)| {
            let graph_name = to_graph_name(name);
            graph
                .iter()
                .map(move |triple| in_graph(triple, graph_name.clone()))
        });
        default.chain(named)
    }
}

/// Converts the name of a named graph into a [GraphName].
pub fn to_graph_name(name: &NamedOrBlankNode) -> GraphName {
    match name {
        NamedOrBlankNode::NamedNode(node) => GraphName::NamedNode(node.clone()),
        NamedOrBlankNode::BlankNode(node) => GraphName::BlankNode(node.clone()),
    }
}

fn in_graph(triple: &Triple, graph_name: GraphName) -> Quad {
    Quad::new(
        triple.subject.clone(),
        triple.predicate.clone(),
        triple.object.clone(),
        graph_name,
    )
}

impl FromIterator<Quad> for Dataset {
    fn from_iter<T: IntoIterator<Item = Quad>>(iter: T) -> Self {
        let mut dataset = Dataset::new();
        dataset.extend(iter);
        dataset
    }
}

impl Extend<Quad> for Dataset {
    fn extend<T: IntoIterator<Item = Quad>>(&mut self, iter: T) {
        for quad in iter {
            self.insert(quad);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{BlankNode, NamedNode};

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example/ns#{name}"))
    }

    #[test]
    fn insert_routes_quads_to_graphs() {
        let mut dataset = Dataset::new();
        assert!(dataset.insert(Quad::new(ex("s"), ex("p"), ex("o"), GraphName::DefaultGraph)));
        assert!(dataset.insert(Quad::new(ex("s"), ex("p"), ex("o"), ex("g1"))));
        assert!(!dataset.insert(Quad::new(ex("s"), ex("p"), ex("o"), ex("g1"))));
        assert!(dataset.insert(Quad::new(ex("s"), ex("p"), ex("o"), BlankNode::new_unchecked("g2"))));

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.default_graph().len(), 1);
        assert_eq!(dataset.named_graphs().count(), 2);
        assert!(dataset.contains(&Quad::new(ex("s"), ex("p"), ex("o"), ex("g1"))));
        assert!(!dataset.contains(&Quad::new(ex("s"), ex("p"), ex("o"), ex("g3"))));
    }

    #[test]
    fn iter_returns_every_quad() {
        let mut dataset = Dataset::from_default_graph(Graph::from_iter([Triple::new(
            ex("s"),
            ex("p"),
            ex("o"),
        )]));
        dataset.insert_named_graph(
            ex("g1"),
            Graph::from_iter([Triple::new(ex("a"), ex("b"), ex("c"))]),
        );

        let quads = dataset.iter().collect::<Vec<_>>();
        assert_eq!(quads.len(), 2);
        assert_eq!(Dataset::from_iter(quads), dataset);
    }
}
