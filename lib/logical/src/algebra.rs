use crate::Expression;
use itertools::Itertools;
use rdf_query_model::{
    BlankNode, NamedNode, NamedNodePattern, NamedOrBlankNode, TermPattern, TriplePattern,
    Variable,
};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// The graph that a [Algebra::Graph] node selects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NamedGraphPattern {
    NamedNode(NamedNode),
    /// A blank node graph name. Only produced by substituting an initial binding.
    BlankNode(BlankNode),
    /// Iterates over all named graphs, binding the graph name to the variable.
    Variable(Variable),
}

impl NamedGraphPattern {
    /// Returns the name of the graph if it is constant.
    pub fn as_graph_name(&self) -> Option<NamedOrBlankNode> {
        match self {
            NamedGraphPattern::NamedNode(node) => Some(node.clone().into()),
            NamedGraphPattern::BlankNode(node) => Some(node.clone().into()),
            NamedGraphPattern::Variable(_) => None,
        }
    }
}

impl From<NamedNodePattern> for NamedGraphPattern {
    fn from(pattern: NamedNodePattern) -> Self {
        match pattern {
            NamedNodePattern::NamedNode(node) => NamedGraphPattern::NamedNode(node),
            NamedNodePattern::Variable(variable) => NamedGraphPattern::Variable(variable),
        }
    }
}

impl Display for NamedGraphPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NamedGraphPattern::NamedNode(node) => write!(f, "{node}"),
            NamedGraphPattern::BlankNode(node) => write!(f, "{node}"),
            NamedGraphPattern::Variable(variable) => write!(f, "{variable}"),
        }
    }
}

/// An aggregate that is computed per group of a [Algebra::Group] node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AggregateExpression {
    /// `COUNT(*)` if `expression` is [None], otherwise `COUNT(expression)`.
    Count {
        expression: Option<Expression>,
        distinct: bool,
    },
}

impl Display for AggregateExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateExpression::Count {
                expression,
                distinct,
            } => {
                let distinct = if *distinct { "DISTINCT " } else { "" };
                match expression {
                    None => write!(f, "count({distinct}*)"),
                    Some(expression) => write!(f, "count({distinct}{expression})"),
                }
            }
        }
    }
}

/// A node of the query algebra.
///
/// Trees are immutable values. Rewrites (substitution, optimization) build new trees from the
/// smart constructors below, which allows comparing trees structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Algebra {
    /// A basic graph pattern. The empty pattern is the unit table: one solution binding nothing.
    Bgp { patterns: Vec<TriplePattern> },
    /// No solutions at all.
    Empty,
    Filter {
        inner: Box<Algebra>,
        expression: Expression,
    },
    /// Solutions of `inner` for which `pattern` has no solution.
    NotExists {
        inner: Box<Algebra>,
        pattern: Box<Algebra>,
    },
    Minus {
        left: Box<Algebra>,
        right: Box<Algebra>,
    },
    Join {
        left: Box<Algebra>,
        right: Box<Algebra>,
    },
    LeftJoin {
        left: Box<Algebra>,
        right: Box<Algebra>,
        expression: Option<Expression>,
    },
    Union {
        left: Box<Algebra>,
        right: Box<Algebra>,
    },
    Graph {
        name: NamedGraphPattern,
        inner: Box<Algebra>,
    },
    Extend {
        inner: Box<Algebra>,
        variable: Variable,
        expression: Expression,
    },
    Project {
        inner: Box<Algebra>,
        variables: Vec<Variable>,
    },
    Distinct { inner: Box<Algebra> },
    Slice {
        inner: Box<Algebra>,
        start: usize,
        length: Option<usize>,
    },
    Group {
        inner: Box<Algebra>,
        keys: Vec<Variable>,
        aggregates: Vec<(Variable, AggregateExpression)>,
    },
}

impl Algebra {
    /// The unit table: a single solution that binds nothing.
    pub fn unit() -> Self {
        Algebra::Bgp {
            patterns: Vec::new(),
        }
    }

    pub fn bgp(patterns: impl IntoIterator<Item = TriplePattern>) -> Self {
        Algebra::Bgp {
            patterns: patterns.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Algebra::Empty
    }

    pub fn filter(inner: Algebra, expression: Expression) -> Self {
        Algebra::Filter {
            inner: Box::new(inner),
            expression,
        }
    }

    pub fn not_exists(inner: Algebra, pattern: Algebra) -> Self {
        Algebra::NotExists {
            inner: Box::new(inner),
            pattern: Box::new(pattern),
        }
    }

    pub fn minus(left: Algebra, right: Algebra) -> Self {
        Algebra::Minus {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn join(left: Algebra, right: Algebra) -> Self {
        Algebra::Join {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn left_join(left: Algebra, right: Algebra, expression: Option<Expression>) -> Self {
        Algebra::LeftJoin {
            left: Box::new(left),
            right: Box::new(right),
            expression,
        }
    }

    pub fn union(left: Algebra, right: Algebra) -> Self {
        Algebra::Union {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn graph(name: impl Into<NamedGraphPattern>, inner: Algebra) -> Self {
        Algebra::Graph {
            name: name.into(),
            inner: Box::new(inner),
        }
    }

    pub fn extend(inner: Algebra, variable: Variable, expression: Expression) -> Self {
        Algebra::Extend {
            inner: Box::new(inner),
            variable,
            expression,
        }
    }

    pub fn project(inner: Algebra, variables: impl IntoIterator<Item = Variable>) -> Self {
        Algebra::Project {
            inner: Box::new(inner),
            variables: variables.into_iter().collect(),
        }
    }

    pub fn distinct(inner: Algebra) -> Self {
        Algebra::Distinct {
            inner: Box::new(inner),
        }
    }

    pub fn slice(inner: Algebra, start: usize, length: Option<usize>) -> Self {
        Algebra::Slice {
            inner: Box::new(inner),
            start,
            length,
        }
    }

    pub fn group(
        inner: Algebra,
        keys: impl IntoIterator<Item = Variable>,
        aggregates: impl IntoIterator<Item = (Variable, AggregateExpression)>,
    ) -> Self {
        Algebra::Group {
            inner: Box::new(inner),
            keys: keys.into_iter().collect(),
            aggregates: aggregates.into_iter().collect(),
        }
    }

    /// Rebuilds the tree bottom-up, applying `f` to every node after its children.
    pub fn transform_up(self, f: &mut impl FnMut(Algebra) -> Algebra) -> Algebra {
        let mut up = |child: Box<Algebra>| Box::new((*child).transform_up(&mut *f));
        let node = match self {
            Algebra::Bgp { .. } | Algebra::Empty => self,
            Algebra::Filter { inner, expression } => Algebra::Filter {
                inner: up(inner),
                expression,
            },
            Algebra::NotExists { inner, pattern } => {
                let inner = up(inner);
                Algebra::NotExists {
                    inner,
                    pattern: up(pattern),
                }
            }
            Algebra::Minus { left, right } => {
                let left = up(left);
                Algebra::Minus {
                    left,
                    right: up(right),
                }
            }
            Algebra::Join { left, right } => {
                let left = up(left);
                Algebra::Join {
                    left,
                    right: up(right),
                }
            }
            Algebra::LeftJoin {
                left,
                right,
                expression,
            } => {
                let left = up(left);
                Algebra::LeftJoin {
                    left,
                    right: up(right),
                    expression,
                }
            }
            Algebra::Union { left, right } => {
                let left = up(left);
                Algebra::Union {
                    left,
                    right: up(right),
                }
            }
            Algebra::Graph { name, inner } => Algebra::Graph {
                name,
                inner: up(inner),
            },
            Algebra::Extend {
                inner,
                variable,
                expression,
            } => Algebra::Extend {
                inner: up(inner),
                variable,
                expression,
            },
            Algebra::Project { inner, variables } => Algebra::Project {
                inner: up(inner),
                variables,
            },
            Algebra::Distinct { inner } => Algebra::Distinct { inner: up(inner) },
            Algebra::Slice {
                inner,
                start,
                length,
            } => Algebra::Slice {
                inner: up(inner),
                start,
                length,
            },
            Algebra::Group {
                inner,
                keys,
                aggregates,
            } => Algebra::Group {
                inner: up(inner),
                keys,
                aggregates,
            },
        };
        f(node)
    }

    /// Returns true if this node is the unit table.
    pub fn is_unit(&self) -> bool {
        matches!(self, Algebra::Bgp { patterns } if patterns.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Algebra::Empty)
    }

    /// Returns the variables that may be bound in the solutions of this node.
    pub fn in_scope_variables(&self) -> BTreeSet<Variable> {
        let mut variables = BTreeSet::new();
        self.collect_in_scope_variables(&mut variables);
        variables
    }

    fn collect_in_scope_variables(&self, variables: &mut BTreeSet<Variable>) {
        match self {
            Algebra::Bgp { patterns } => {
                for pattern in patterns {
                    if let TermPattern::Variable(variable) = &pattern.subject {
                        variables.insert(variable.clone());
                    }
                    if let NamedNodePattern::Variable(variable) = &pattern.predicate {
                        variables.insert(variable.clone());
                    }
                    if let TermPattern::Variable(variable) = &pattern.object {
                        variables.insert(variable.clone());
                    }
                }
            }
            Algebra::Empty => {}
            Algebra::Filter { inner, .. }
            | Algebra::NotExists { inner, .. }
            | Algebra::Distinct { inner }
            | Algebra::Slice { inner, .. } => inner.collect_in_scope_variables(variables),
            Algebra::Minus { left, .. } => left.collect_in_scope_variables(variables),
            Algebra::Join { left, right }
            | Algebra::LeftJoin { left, right, .. }
            | Algebra::Union { left, right } => {
                left.collect_in_scope_variables(variables);
                right.collect_in_scope_variables(variables);
            }
            Algebra::Graph { name, inner } => {
                if let NamedGraphPattern::Variable(variable) = name {
                    variables.insert(variable.clone());
                }
                inner.collect_in_scope_variables(variables);
            }
            Algebra::Extend {
                inner, variable, ..
            } => {
                inner.collect_in_scope_variables(variables);
                variables.insert(variable.clone());
            }
            Algebra::Project { variables: projected, .. } => {
                variables.extend(projected.iter().cloned());
            }
            Algebra::Group {
                keys, aggregates, ..
            } => {
                variables.extend(keys.iter().cloned());
                variables.extend(aggregates.iter().map(|(variable, _)| variable.clone()));
            }
        }
    }

    fn fmt_child(&self, f: &mut Formatter<'_>, indent: usize) -> std::fmt::Result {
        writeln!(f)?;
        self.fmt_indented(f, indent)
    }

    fn fmt_indented(&self, f: &mut Formatter<'_>, indent: usize) -> std::fmt::Result {
        write!(f, "{:indent$}", "")?;
        match self {
            Algebra::Bgp { patterns } => {
                if patterns.is_empty() {
                    write!(f, "Bgp: unit")
                } else {
                    let patterns = patterns.iter().map(|pattern| {
                        format!(
                            "({} {} {})",
                            pattern.subject, pattern.predicate, pattern.object
                        )
                    });
                    write!(f, "Bgp: {}", patterns.format(", "))
                }
            }
            Algebra::Empty => write!(f, "Empty"),
            Algebra::Filter { inner, expression } => {
                write!(f, "Filter: {expression}")?;
                inner.fmt_child(f, indent + 2)
            }
            Algebra::NotExists { inner, pattern } => {
                write!(f, "NotExists")?;
                inner.fmt_child(f, indent + 2)?;
                pattern.fmt_child(f, indent + 2)
            }
            Algebra::Minus { left, right } => {
                write!(f, "Minus")?;
                left.fmt_child(f, indent + 2)?;
                right.fmt_child(f, indent + 2)
            }
            Algebra::Join { left, right } => {
                write!(f, "Join")?;
                left.fmt_child(f, indent + 2)?;
                right.fmt_child(f, indent + 2)
            }
            Algebra::LeftJoin {
                left,
                right,
                expression,
            } => {
                match expression {
                    None => write!(f, "LeftJoin")?,
                    Some(expression) => write!(f, "LeftJoin: {expression}")?,
                }
                left.fmt_child(f, indent + 2)?;
                right.fmt_child(f, indent + 2)
            }
            Algebra::Union { left, right } => {
                write!(f, "Union")?;
                left.fmt_child(f, indent + 2)?;
                right.fmt_child(f, indent + 2)
            }
            Algebra::Graph { name, inner } => {
                write!(f, "Graph: {name}")?;
                inner.fmt_child(f, indent + 2)
            }
            Algebra::Extend {
                inner,
                variable,
                expression,
            } => {
                write!(f, "Extend: {variable} := {expression}")?;
                inner.fmt_child(f, indent + 2)
            }
            Algebra::Project { inner, variables } => {
                write!(f, "Project: {}", variables.iter().format(" "))?;
                inner.fmt_child(f, indent + 2)
            }
            Algebra::Distinct { inner } => {
                write!(f, "Distinct")?;
                inner.fmt_child(f, indent + 2)
            }
            Algebra::Slice {
                inner,
                start,
                length,
            } => {
                match length {
                    None => write!(f, "Slice: start={start}")?,
                    Some(length) => write!(f, "Slice: start={start}, length={length}")?,
                }
                inner.fmt_child(f, indent + 2)
            }
            Algebra::Group {
                inner,
                keys,
                aggregates,
            } => {
                let aggregates = aggregates
                    .iter()
                    .map(|(variable, aggregate)| format!("{variable} := {aggregate}"));
                write!(
                    f,
                    "Group: ({}) [{}]",
                    keys.iter().format(" "),
                    aggregates.format(", ")
                )?;
                inner.fmt_child(f, indent + 2)
            }
        }
    }
}

impl Display for Algebra {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_indented(f, 0)
    }
}
