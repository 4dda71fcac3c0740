use itertools::Itertools;
use oxrdf::{Term, Variable};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// A partial mapping from variables to terms.
///
/// A [Binding] is used both as the initial binding that constrains a query before it is executed
/// and as a single solution of a query. Entries are ordered by variable so that two equal
/// bindings also hash and display identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Binding {
    values: BTreeMap<Variable, Term>,
}

impl Binding {
    /// Creates an empty binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `variable` to `term`, returning the term that was previously bound.
    pub fn insert(&mut self, variable: Variable, term: impl Into<Term>) -> Option<Term> {
        self.values.insert(variable, term.into())
    }

    pub fn get(&self, variable: &Variable) -> Option<&Term> {
        self.values.get(variable)
    }

    /// Looks up a variable by its name (without the leading `?`).
    pub fn get_by_name(&self, name: &str) -> Option<&Term> {
        self.values
            .iter()
            .find_map(|(variable, term)| (variable.as_str() == name).then_some(term))
    }

    pub fn contains(&self, variable: &Variable) -> bool {
        self.values.contains_key(variable)
    }

    pub fn remove(&mut self, variable: &Variable) -> Option<Term> {
        self.values.remove(variable)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Variable, Term> {
        self.values.iter()
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.values.keys()
    }

    /// Two bindings are compatible if they agree on every variable they both bind.
    pub fn is_compatible(&self, other: &Binding) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.values.iter().all(|(variable, term)| {
            large
                .values
                .get(variable)
                .map_or(true, |other_term| other_term == term)
        })
    }

    /// Merges two bindings into one that binds the variables of both.
    ///
    /// Returns [None] if the bindings are not compatible. The operation is symmetric.
    pub fn merge(&self, other: &Binding) -> Option<Binding> {
        if !self.is_compatible(other) {
            return None;
        }

        let mut result = self.clone();
        for (variable, term) in &other.values {
            if !result.values.contains_key(variable) {
                result.values.insert(variable.clone(), term.clone());
            }
        }
        Some(result)
    }

    /// Returns a binding that only contains the given variables.
    pub fn project<'a>(&self, variables: impl IntoIterator<Item = &'a Variable>) -> Binding {
        variables
            .into_iter()
            .filter_map(|variable| {
                self.values
                    .get(variable)
                    .map(|term| (variable.clone(), term.clone()))
            })
            .collect()
    }
}

impl FromIterator<(Variable, Term)> for Binding {
    fn from_iter<T: IntoIterator<Item = (Variable, Term)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Extend<(Variable, Term)> for Binding {
    fn extend<T: IntoIterator<Item = (Variable, Term)>>(&mut self, iter: T) {
        self.values.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Binding {
    type Item = (&'a Variable, &'a Term);
    type IntoIter = btree_map::Iter<'a, Variable, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl IntoIterator for Binding {
    type Item = (Variable, Term);
    type IntoIter = btree_map::IntoIter<Variable, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl Display for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let entries = self
            .values
            .iter()
            .map(|(variable, term)| format!("{variable} -> {term}"));
        write!(f, "{{{}}}", entries.format(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, NamedNode};

    fn var(name: &str) -> Variable {
        Variable::new_unchecked(name)
    }

    #[test]
    fn insert_contains_and_clear() {
        let mut first = Binding::new();
        first.insert(var("o"), Literal::new_simple_literal("y1"));

        let mut second = Binding::new().merge(&first).unwrap();
        assert!(second.contains(&var("o")));
        second.clear();
        assert!(!second.contains(&var("o")));
        assert!(first.contains(&var("o")));
        assert_eq!(
            first.get_by_name("o"),
            Some(&Literal::new_simple_literal("y1").into())
        );
    }

    #[test]
    fn merge_is_symmetric() {
        let a = Binding::from_iter([(var("x"), NamedNode::new_unchecked("http://a").into())]);
        let b = Binding::from_iter([(var("y"), NamedNode::new_unchecked("http://b").into())]);

        assert_eq!(a.merge(&b), b.merge(&a));
        assert_eq!(a.merge(&b).map(|m| m.len()), Some(2));
    }

    #[test]
    fn merge_rejects_incompatible_bindings() {
        let a = Binding::from_iter([(var("x"), NamedNode::new_unchecked("http://a").into())]);
        let b = Binding::from_iter([(var("x"), NamedNode::new_unchecked("http://b").into())]);

        assert!(!a.is_compatible(&b));
        assert_eq!(a.merge(&b), None);
    }

    #[test]
    fn project_keeps_listed_variables() {
        let binding = Binding::from_iter([
            (var("s"), NamedNode::new_unchecked("http://s").into()),
            (var("o"), Literal::new_simple_literal("o").into()),
        ]);

        insta::assert_snapshot!(binding.project(&[var("s"), var("z")]), @"{?s -> <http://s>}");
        insta::assert_snapshot!(binding, @r#"{?o -> "o", ?s -> <http://s>}"#);
    }
}
