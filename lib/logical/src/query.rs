use crate::rewriting::{parse_construct_quads, GraphPatternRewriter};
use crate::{Algebra, ConstructTemplate, QueryParseError};
use itertools::Itertools;
use rdf_query_model::Variable;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The form of a query, which decides which execution method can run it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryForm {
    Select,
    Ask,
    Construct,
}

impl Display for QueryForm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryForm::Select => f.write_str("SELECT"),
            QueryForm::Ask => f.write_str("ASK"),
            QueryForm::Construct => f.write_str("CONSTRUCT"),
        }
    }
}

/// A parsed query: its form and its pattern compiled to [Algebra].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    Select {
        pattern: Algebra,
        /// The variables of the result, in the order of the `SELECT` clause.
        variables: Vec<Variable>,
    },
    Ask {
        pattern: Algebra,
    },
    Construct {
        template: ConstructTemplate,
        pattern: Algebra,
    },
}

impl Query {
    /// Parses a query string.
    ///
    /// Besides standard SPARQL, `CONSTRUCT` templates may contain `GRAPH` blocks, which makes the
    /// query produce quads instead of triples.
    pub fn parse(query: &str, base_iri: Option<&str>) -> Result<Self, QueryParseError> {
        match spargebra::Query::parse(query, base_iri) {
            Ok(parsed) => GraphPatternRewriter::default().rewrite_query(&parsed),
            Err(error) => match parse_construct_quads(query, base_iri) {
                Some(result) => result,
                None => Err(error.into()),
            },
        }
    }

    pub fn form(&self) -> QueryForm {
        match self {
            Query::Select { .. } => QueryForm::Select,
            Query::Ask { .. } => QueryForm::Ask,
            Query::Construct { .. } => QueryForm::Construct,
        }
    }

    pub fn pattern(&self) -> &Algebra {
        match self {
            Query::Select { pattern, .. }
            | Query::Ask { pattern }
            | Query::Construct { pattern, .. } => pattern,
        }
    }

    /// Returns the same query with its pattern replaced.
    #[must_use]
    pub fn with_pattern(&self, pattern: Algebra) -> Self {
        match self {
            Query::Select { variables, .. } => Query::Select {
                pattern,
                variables: variables.clone(),
            },
            Query::Ask { .. } => Query::Ask { pattern },
            Query::Construct { template, .. } => Query::Construct {
                template: template.clone(),
                pattern,
            },
        }
    }
}

impl FromStr for Query {
    type Err = QueryParseError;

    fn from_str(query: &str) -> Result<Self, Self::Err> {
        Self::parse(query, None)
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::Select { variables, .. } => {
                writeln!(f, "SELECT {}", variables.iter().format(" "))?;
            }
            Query::Ask { .. } => writeln!(f, "ASK")?,
            Query::Construct { template, .. } => writeln!(f, "CONSTRUCT {template}")?,
        }
        write!(f, "{}", self.pattern())
    }
}
