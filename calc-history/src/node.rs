use chrono::{DateTime, Utc};
use crate::backend::Backend;
use crate::id::NodeId;
use indexmap::IndexSet;

/// One solved symbol of an equation.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<V> {
    pub symbol: String,
    pub values: Vec<V>,
}

/// The cached result of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Computed<V> {
    /// The evaluated value of the node's formula.
    Value(V),

    /// The formula had no value, but could be solved for one or more of its free symbols.
    Solutions(Vec<Solution<V>>),
}

impl<V> Computed<V> {
    /// Returns the value that is substituted into formulas that reference this result.
    ///
    /// For solutions, this is the only solution when exactly one symbol has exactly one
    /// solution. Any other set of solutions cannot stand in for a single value.
    pub fn substitutable(&self) -> Option<&V> {
        match self {
            Self::Value(value) => Some(value),
            Self::Solutions(solutions) => match solutions.as_slice() {
                [Solution { values, .. }] if values.len() == 1 => values.first(),
                _ => None,
            },
        }
    }

    pub fn as_value(&self) -> Option<&V> {
        match self {
            Self::Value(value) => Some(value),
            Self::Solutions(_) => None,
        }
    }
}

/// A single entry of the history tree.
///
/// Nodes are created and modified only by the [`Tree`](crate::tree::Tree) and the
/// [`Calculator`](crate::calculator::Calculator), so their fields are read-only from outside the
/// crate.
#[derive(Debug, Clone)]
pub struct Node<B: Backend> {
    id: NodeId,
    alias: Option<String>,
    equation: String,
    formula: B::Expr,
    value: Option<Computed<B::Value>>,
    dependencies: IndexSet<NodeId>,
    dependents: IndexSet<NodeId>,
    note: Option<String>,
    collapsed: bool,
    last_modified: DateTime<Utc>,
}

impl<B: Backend> Node<B> {
    pub(crate) fn new(id: NodeId, equation: String, formula: B::Expr) -> Self {
        Self {
            id,
            alias: None,
            equation,
            formula,
            value: None,
            dependencies: IndexSet::new(),
            dependents: IndexSet::new(),
            note: None,
            collapsed: false,
            last_modified: Utc::now(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The equation as it was stored, after reference rewriting.
    pub fn equation(&self) -> &str {
        &self.equation
    }

    pub fn formula(&self) -> &B::Expr {
        &self.formula
    }

    /// The cached result, if the node has been evaluated.
    pub fn value(&self) -> Option<&Computed<B::Value>> {
        self.value.as_ref()
    }

    /// The nodes this node references.
    pub fn dependencies(&self) -> &IndexSet<NodeId> {
        &self.dependencies
    }

    /// The nodes that reference this node.
    pub fn dependents(&self) -> &IndexSet<NodeId> {
        &self.dependents
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    pub(crate) fn set_alias(&mut self, alias: Option<String>) {
        self.alias = alias;
    }

    pub(crate) fn set_equation(&mut self, equation: String, formula: B::Expr) {
        self.equation = equation;
        self.formula = formula;
        self.last_modified = Utc::now();
    }

    pub(crate) fn set_value(&mut self, value: Computed<B::Value>) {
        self.value = Some(value);
    }

    pub(crate) fn set_note(&mut self, note: Option<String>) {
        self.note = note;
    }

    pub(crate) fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
    }

    pub(crate) fn set_last_modified(&mut self, last_modified: DateTime<Utc>) {
        self.last_modified = last_modified;
    }

    pub(crate) fn dependencies_mut(&mut self) -> &mut IndexSet<NodeId> {
        &mut self.dependencies
    }

    pub(crate) fn dependents_mut(&mut self) -> &mut IndexSet<NodeId> {
        &mut self.dependents
    }
}

#[cfg(test)]
mod tests {
    use calc_compute::{Number, Value};
    use pretty_assertions::assert_eq;
    use super::*;

    fn solution(symbol: &str, values: &[i64]) -> Solution<Value> {
        Solution {
            symbol: symbol.to_string(),
            values: values.iter().map(|n| Value::Number(Number::int(*n))).collect(),
        }
    }

    #[test]
    fn single_solution_substitutes() {
        let computed = Computed::Solutions(vec![solution("x", &[3])]);
        assert_eq!(computed.substitutable(), Some(&Value::Number(Number::int(3))));
    }

    #[test]
    fn ambiguous_solutions_do_not_substitute() {
        assert_eq!(Computed::Solutions(vec![solution("x", &[-2, 2])]).substitutable(), None);
        assert_eq!(
            Computed::Solutions(vec![solution("x", &[1]), solution("y", &[1])]).substitutable(),
            None,
        );
    }
}
