use itertools::Itertools;
use rdf_query_model::{
    BlankNode, NamedNode, NamedNodePattern, TermPattern, TriplePattern, Variable,
};
use std::fmt::{Display, Formatter};

/// The graph a [QuadTemplate] writes into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphNameTemplate {
    /// The template is not nested in a `GRAPH` block.
    DefaultGraph,
    NamedNode(NamedNode),
    /// A fresh blank node per solution.
    BlankNode(BlankNode),
    Variable(Variable),
}

impl Display for GraphNameTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphNameTemplate::DefaultGraph => f.write_str("DEFAULT"),
            GraphNameTemplate::NamedNode(node) => write!(f, "{node}"),
            GraphNameTemplate::BlankNode(node) => write!(f, "{node}"),
            GraphNameTemplate::Variable(variable) => write!(f, "{variable}"),
        }
    }
}

/// A single template of a `CONSTRUCT` query.
///
/// Blank nodes in a template stand for fresh blank nodes that are allocated once per solution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuadTemplate {
    pub subject: TermPattern,
    pub predicate: NamedNodePattern,
    pub object: TermPattern,
    pub graph_name: GraphNameTemplate,
}

impl QuadTemplate {
    /// Returns true if the template is nested in a `GRAPH` block.
    pub fn is_in_named_graph(&self) -> bool {
        self.graph_name != GraphNameTemplate::DefaultGraph
    }

    /// Returns the variables of the template in subject, predicate, object, graph name order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        let subject = match &self.subject {
            TermPattern::Variable(variable) => Some(variable),
            _ => None,
        };
        let predicate = match &self.predicate {
            NamedNodePattern::Variable(variable) => Some(variable),
            NamedNodePattern::NamedNode(_) => None,
        };
        let object = match &self.object {
            TermPattern::Variable(variable) => Some(variable),
            _ => None,
        };
        let graph_name = match &self.graph_name {
            GraphNameTemplate::Variable(variable) => Some(variable),
            _ => None,
        };
        subject
            .into_iter()
            .chain(predicate)
            .chain(object)
            .chain(graph_name)
    }
}

impl From<TriplePattern> for QuadTemplate {
    fn from(pattern: TriplePattern) -> Self {
        Self {
            subject: pattern.subject,
            predicate: pattern.predicate,
            object: pattern.object,
            graph_name: GraphNameTemplate::DefaultGraph,
        }
    }
}

impl Display for QuadTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.graph_name {
            GraphNameTemplate::DefaultGraph => {
                write!(f, "{} {} {}", self.subject, self.predicate, self.object)
            }
            graph_name => write!(
                f,
                "GRAPH {graph_name} {{ {} {} {} }}",
                self.subject, self.predicate, self.object
            ),
        }
    }
}

/// The template of a `CONSTRUCT` query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConstructTemplate {
    quads: Vec<QuadTemplate>,
}

impl ConstructTemplate {
    pub fn new(quads: impl IntoIterator<Item = QuadTemplate>) -> Self {
        Self {
            quads: quads.into_iter().collect(),
        }
    }

    /// Creates a template that only writes into the default graph.
    pub fn from_triples(triples: impl IntoIterator<Item = TriplePattern>) -> Self {
        Self::new(triples.into_iter().map(QuadTemplate::from))
    }

    pub fn quads(&self) -> &[QuadTemplate] {
        &self.quads
    }

    /// Returns the templates that are not nested in a `GRAPH` block.
    pub fn default_graph_templates(&self) -> impl Iterator<Item = &QuadTemplate> {
        self.quads.iter().filter(|quad| !quad.is_in_named_graph())
    }

    /// Returns each variable of the template once, in order of first occurrence.
    pub fn variables(&self) -> Vec<&Variable> {
        self.quads
            .iter()
            .flat_map(QuadTemplate::variables)
            .unique()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }
}

impl Display for ConstructTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ {} }}", self.quads.iter().format(" . "))
    }
}
