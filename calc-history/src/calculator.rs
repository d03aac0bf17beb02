//! The evaluation engine.
//!
//! The [`Calculator`] connects the [`Tree`] to a [`Backend`]. Each formula is resolved against the
//! tree: its free symbols are looked up as node identifiers or aliases, the cached values of the
//! nodes found are substituted in, and the result is evaluated. The nodes found become the
//! dependencies of the formula.
//!
//! Whenever a node changes, [`Calculator::refresh`] recomputes it and then recomputes every
//! dependent, depth-first, before returning.

use crate::backend::Backend;
use crate::codec::Snapshot;
use crate::error::{SnapshotError, TreeError};
use crate::event::{Emitter, Event, Mutation, SubscriptionId};
use crate::id::NodeId;
use crate::node::{Computed, Solution};
use crate::tree::Tree;
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The symbol that refers to the most recently created node.
pub const PREVIOUS_ANSWER: &str = "ans";

/// A reference to a node written as `$name` or `\$name`.
static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\?\$([A-Za-z_][A-Za-z0-9_]*)").expect("reference pattern is valid")
});

/// Options that change how new entries are saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalculatorOptions {
    /// Replace literals equal to the previous answer with references to the node holding it.
    pub implicit_dependencies: bool,
}

impl Default for CalculatorOptions {
    fn default() -> Self {
        Self { implicit_dependencies: true }
    }
}

/// The result of resolving a formula against the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<V> {
    pub value: Computed<V>,

    /// The nodes the formula refers to.
    pub dependencies: IndexSet<NodeId>,
}

/// The result of evaluating raw input.
#[derive(Debug, Clone)]
pub struct Evaluation<B: Backend> {
    /// The input after references were rewritten into the form the backend parses.
    pub equation: String,
    pub formula: B::Expr,
    pub value: Computed<B::Value>,
    pub dependencies: IndexSet<NodeId>,
}

/// The result of saving raw input as a new entry.
#[derive(Debug, Clone)]
pub struct Saved<B: Backend> {
    pub evaluation: Evaluation<B>,

    /// The created node, or `None` if the input evaluated to an error.
    pub node: Option<NodeId>,
}

/// Finds every occurrence of `needle` in `source` and replaces each one for which `replace`
/// returns a replacement. `replace` receives the text before and after the occurrence.
fn replace_occurrences(
    source: &str,
    needle: &str,
    mut replace: impl FnMut(&str, &str) -> Option<String>,
) -> Option<String> {
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    let mut replaced = false;
    for (start, _) in source.match_indices(needle) {
        let end = start + needle.len();
        if let Some(replacement) = replace(&source[..start], &source[end..]) {
            out.push_str(&source[last..start]);
            out.push_str(&replacement);
            last = end;
            replaced = true;
        }
    }

    replaced.then(|| {
        out.push_str(&source[last..]);
        out
    })
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns true if a minus sign at the end of `before` must be a negation rather than a
/// subtraction.
fn is_unary_position(before: &str) -> bool {
    before
        .trim_end()
        .chars()
        .next_back()
        .map_or(true, |c| matches!(c, '+' | '-' | '*' | '/' | '^' | '(' | ',' | '=' | '{'))
}

/// Returns true if the literal is a single number token, possibly negated.
fn is_plain_literal(literal: &str) -> bool {
    let digits = literal.strip_prefix('-').unwrap_or(literal);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|c| *c == '.').count() <= 1
}

/// Whether the previous answer token may refer to the most recently created node.
///
/// Only input being evaluated on the spot uses the live previous answer. Stored formulas have
/// their `ans` rewritten into an explicit reference when saved, so any `ans` left in one is a free
/// symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Live,
    Free,
}

/// The calculator: a history tree evaluated by a backend.
#[derive(Debug)]
pub struct Calculator<B: Backend> {
    backend: B,
    tree: Tree<B>,
    options: CalculatorOptions,
    events: Emitter<Event>,
}

impl<B: Backend + Default> Default for Calculator<B> {
    fn default() -> Self {
        Self::new(B::default(), CalculatorOptions::default())
    }
}

impl<B: Backend> Calculator<B> {
    pub fn new(backend: B, options: CalculatorOptions) -> Self {
        Self {
            backend,
            tree: Tree::new(),
            options,
            events: Emitter::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn tree(&self) -> &Tree<B> {
        &self.tree
    }

    /// Gives access to the structural operations of the tree.
    ///
    /// Changes made this way are not re-evaluated until [`Calculator::refresh`] is called.
    pub fn tree_mut(&mut self) -> &mut Tree<B> {
        &mut self.tree
    }

    pub fn options(&self) -> CalculatorOptions {
        self.options
    }

    pub fn set_options(&mut self, options: CalculatorOptions) {
        self.options = options;
    }

    /// Rewrites `\$name` and `$name` references into `\mathrm{name}`, lowercasing the name.
    ///
    /// ```
    /// use calc_history::Calculator;
    /// use calc_history::backend::Cas;
    ///
    /// let sanitized = Calculator::<Cas>::sanitize(r"\$A0 + $Width");
    /// assert_eq!(sanitized, r"\mathrm{a0} + \mathrm{width}");
    /// assert_eq!(Calculator::<Cas>::sanitize(&sanitized), sanitized);
    /// ```
    pub fn sanitize(raw: &str) -> String {
        REFERENCE
            .replace_all(raw, |caps: &Captures| format!(r"\mathrm{{{}}}", caps[1].to_lowercase()))
            .into_owned()
    }

    /// Returns true if the computed result carries errors.
    pub fn has_errors(&self, computed: &Computed<B::Value>) -> bool {
        match computed {
            Computed::Value(value) => !self.backend.errors(value).is_empty(),
            Computed::Solutions(_) => false,
        }
    }

    /// Returns the errors of a computed result.
    pub fn errors<'a>(&self, computed: &'a Computed<B::Value>) -> &'a [B::Error] {
        match computed {
            Computed::Value(value) => self.backend.errors(value),
            Computed::Solutions(_) => &[],
        }
    }

    /// Formats a computed result for display. Solutions are listed per symbol, as in
    /// `x = -2, 2`.
    pub fn format(&self, computed: &Computed<B::Value>) -> String {
        match computed {
            Computed::Value(value) => self.backend.format(value),
            Computed::Solutions(solutions) => solutions
                .iter()
                .map(|solution| {
                    let values = solution.values
                        .iter()
                        .map(|value| self.backend.format(value))
                        .collect::<Vec<_>>();
                    format!("{} = {}", solution.symbol, values.join(", "))
                })
                .collect::<Vec<_>>()
                .join("; "),
        }
    }

    /// Finds the node a symbol of a formula refers to.
    fn lookup(&self, symbol: &str, answer: Answer) -> Option<NodeId> {
        if symbol == PREVIOUS_ANSWER && answer == Answer::Live {
            if let Some(last) = self.tree.last_created() {
                return Some(last.clone());
            }
        }
        self.tree.resolve_symbol(symbol).cloned()
    }

    /// Splits the free symbols of a formula into the nodes they refer to and the symbols that
    /// refer to no node.
    fn discover(&self, formula: &B::Expr, answer: Answer) -> (IndexSet<NodeId>, Vec<String>) {
        let mut dependencies = IndexSet::new();
        let mut unresolved = Vec::new();
        for symbol in self.backend.symbols(formula) {
            match self.lookup(&symbol, answer) {
                Some(id) => {
                    tracing::trace!(symbol = %symbol, id = %id, "resolved symbol");
                    dependencies.insert(id);
                },
                None => unresolved.push(symbol),
            }
        }
        (dependencies, unresolved)
    }

    /// Evaluates a node that has never been evaluated, without re-evaluating its dependents.
    fn ensure_value(&mut self, id: &NodeId, visiting: &mut Vec<NodeId>) {
        if visiting.contains(id) {
            return;
        }
        let Some(formula) = self.tree
            .get(id.as_str())
            .filter(|node| node.value().is_none())
            .map(|node| node.formula().clone())
        else {
            return;
        };

        visiting.push(id.clone());
        let resolution = self.resolve_with(&formula, visiting, Answer::Free);
        visiting.pop();
        self.tree.set_value(id.as_str(), resolution.value);
    }

    /// Resolves a formula against the tree and evaluates it.
    ///
    /// Symbols that refer to no node are not errors. If the formula has no value and such symbols
    /// remain, the formula is solved for each of them in turn. If a node the formula refers to
    /// holds an error, the result is an error naming that node.
    ///
    /// The formula is treated as fresh input: `ans` refers to the most recently created node.
    pub fn resolve(&mut self, formula: &B::Expr) -> Resolution<B::Value> {
        self.resolve_with(formula, &mut Vec::new(), Answer::Live)
    }

    fn resolve_with(
        &mut self,
        formula: &B::Expr,
        visiting: &mut Vec<NodeId>,
        answer: Answer,
    ) -> Resolution<B::Value> {
        let (dependencies, unresolved) = self.discover(formula, answer);
        for dependency in &dependencies {
            self.ensure_value(dependency, visiting);
        }

        let mut bindings = HashMap::new();
        let mut failed = None;
        for dependency in &dependencies {
            let Some(node) = self.tree.get(dependency.as_str()) else {
                continue;
            };
            if let Some(Computed::Value(value)) = node.value() {
                let errors = self.backend.errors(value);
                if !errors.is_empty() {
                    failed = Some(self.backend.dependency_failed(dependency.as_str(), errors));
                    break;
                }
            }
            let Some(value) = node.value().and_then(Computed::substitutable) else {
                continue;
            };
            bindings.insert(dependency.as_str().to_string(), value.clone());
            if let Some(alias) = node.alias() {
                bindings.insert(alias.to_string(), value.clone());
            }
            if answer == Answer::Live && self.tree.last_created() == Some(dependency) {
                bindings.insert(PREVIOUS_ANSWER.to_string(), value.clone());
            }
        }

        if let Some(value) = failed {
            return Resolution { value: Computed::Value(value), dependencies };
        }

        let substituted = self.backend.substitute(formula, &bindings);
        let value = self.backend.evaluate(&substituted);
        if !self.backend.is_undefined(&value) || unresolved.is_empty() {
            return Resolution { value: Computed::Value(value), dependencies };
        }

        let solutions = unresolved
            .into_iter()
            .filter_map(|symbol| {
                let values = self.backend.solve(&substituted, &symbol);
                (!values.is_empty()).then_some(Solution { symbol, values })
            })
            .collect::<Vec<_>>();
        let value = if solutions.is_empty() {
            Computed::Value(value)
        } else {
            Computed::Solutions(solutions)
        };
        Resolution { value, dependencies }
    }

    /// Re-evaluates a node, updates its dependency edges to match its formula, and then
    /// re-evaluates every node that depends on it.
    ///
    /// Fails without changing anything if the formula refers to the node itself or to one of its
    /// descendants.
    pub fn refresh(&mut self, id: &str) -> Result<Computed<B::Value>, TreeError> {
        let node = self.tree.get(id).ok_or_else(|| TreeError::NodeNotFound(id.into()))?;
        let id = node.id().clone();
        let formula = node.formula().clone();
        let current = node.dependencies().clone();

        let (discovered, _) = self.discover(&formula, Answer::Free);
        if let Some(dependency) = discovered.iter().find(|dependency| self.tree.would_cycle(id.as_str(), dependency.as_str())) {
            return Err(TreeError::Cycle { dependent: id, dependency: dependency.clone() });
        }

        tracing::trace!(id = %id, "refreshing node");
        let resolution = self.resolve_with(&formula, &mut vec![id.clone()], Answer::Free);
        self.tree.set_value(id.as_str(), resolution.value.clone());

        for stale in current.difference(&resolution.dependencies) {
            self.tree.remove_dependency(id.as_str(), stale.as_str())?;
        }
        for added in resolution.dependencies.difference(&current) {
            self.tree.add_dependency(id.as_str(), added.as_str())?;
        }

        let dependents = self.tree
            .get(id.as_str())
            .map(|node| node.dependents().clone())
            .unwrap_or_default();
        for dependent in dependents {
            if let Err(err) = self.refresh(dependent.as_str()) {
                tracing::warn!(id = %dependent, error = %err, "could not refresh dependent");
            }
        }

        Ok(resolution.value)
    }

    /// Rewrites the previous answer token into a reference to the most recently created node.
    fn rewrite_previous_answer(&self, equation: String) -> String {
        let Some(last) = self.tree.last_created() else {
            return equation;
        };

        let rewritten = replace_occurrences(&equation, PREVIOUS_ANSWER, |before, after| {
            if before.ends_with(|c: char| is_name_char(c) || c == '\\') || after.starts_with(is_name_char) {
                return None;
            }
            if before.ends_with(r"\mathrm{") {
                return Some(last.to_string());
            }
            Some(format!(r"\mathrm{{{}}}", last))
        });
        rewritten.unwrap_or(equation)
    }

    /// Replaces literals equal to the previous answer with references to the node holding it.
    fn link_implicit(&mut self, equation: String) -> String {
        if !self.options.implicit_dependencies {
            return equation;
        }
        let Some(last) = self.tree.last_created().cloned() else {
            return equation;
        };
        let Some(value) = self.tree
            .get(last.as_str())
            .and_then(|node| node.value())
            .and_then(Computed::substitutable)
            .filter(|value| self.backend.as_number(value).is_some())
        else {
            return equation;
        };

        let literal = self.backend.format(value);
        if !is_plain_literal(&literal) {
            return equation;
        }

        let negative = literal.starts_with('-');
        let rewritten = replace_occurrences(&equation, &literal, |before, after| {
            let joined_before = before.ends_with(|c: char| is_name_char(c) || matches!(c, '.' | '$' | '\\'));
            let joined_after = after.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '.' | '_'));
            if joined_before || joined_after || (negative && !is_unary_position(before)) {
                return None;
            }
            Some(format!(r"\mathrm{{{}}}", last))
        });

        match rewritten {
            Some(rewritten) => {
                tracing::debug!(id = %last, literal = %literal, "formed implicit dependency");
                self.events.emit(&Event::ImplicitDependencyFormed { node: last, literal });
                rewritten
            },
            None => equation,
        }
    }

    /// Evaluates raw input against the tree, without adding it to the tree.
    pub fn evaluate_expression(&mut self, raw: &str) -> Evaluation<B> {
        let equation = Self::sanitize(raw);
        self.evaluate_equation(equation, Answer::Live)
    }

    fn evaluate_equation(&mut self, equation: String, answer: Answer) -> Evaluation<B> {
        let formula = self.backend.parse(&equation);
        let Resolution { value, dependencies } = self.resolve_with(&formula, &mut Vec::new(), answer);
        Evaluation { equation, formula, value, dependencies }
    }

    /// Evaluates raw input and, if it evaluates without errors, adds it to the tree as a new
    /// node.
    ///
    /// The previous answer token is rewritten into an explicit reference first, so the stored
    /// equation keeps referring to the same node as the history grows.
    pub fn save_new_expression(&mut self, raw: &str) -> Result<Saved<B>, TreeError> {
        let equation = self.rewrite_previous_answer(Self::sanitize(raw));
        let equation = self.link_implicit(equation);
        let evaluation = self.evaluate_equation(equation, Answer::Free);
        if self.has_errors(&evaluation.value) {
            return Ok(Saved { evaluation, node: None });
        }

        let dependencies = evaluation.dependencies.iter().cloned().collect::<Vec<_>>();
        let id = self.tree.add_node(evaluation.equation.clone(), evaluation.formula.clone(), &dependencies)?;
        self.tree.set_value(id.as_str(), evaluation.value.clone());
        Ok(Saved { evaluation, node: Some(id) })
    }

    /// Replaces the equation of a node and re-evaluates the node and all of its descendants.
    pub fn edit_node(&mut self, id: &str, raw: &str) -> Result<Computed<B::Value>, TreeError> {
        let id = self.tree
            .get(id)
            .map(|node| node.id().clone())
            .ok_or_else(|| TreeError::NodeNotFound(id.into()))?;

        let equation = self.rewrite_previous_answer(Self::sanitize(raw));
        let formula = self.backend.parse(&equation);
        let (discovered, _) = self.discover(&formula, Answer::Free);
        if let Some(dependency) = discovered.iter().find(|dependency| self.tree.would_cycle(id.as_str(), dependency.as_str())) {
            return Err(TreeError::Cycle { dependent: id, dependency: dependency.clone() });
        }

        tracing::debug!(id = %id, equation = %equation, "editing node");
        self.tree.set_equation(id.as_str(), equation, formula);
        let value = self.refresh(id.as_str())?;
        self.events.emit(&Event::Mutate(Mutation::Edited(id)));
        Ok(value)
    }

    /// Sets or removes the alias of a node.
    ///
    /// Nodes that refer to the alias are not re-evaluated; call [`Calculator::refresh`] on them
    /// to pick up the change.
    pub fn set_alias(&mut self, id: &str, alias: Option<&str>) -> Result<(), TreeError> {
        self.tree.set_alias(id, alias)
    }

    /// Saves the tree as plain data.
    pub fn serialize(&self) -> Snapshot<B::Expr> {
        self.tree.serialize()
    }

    /// Replaces the tree with one loaded from a snapshot and evaluates every node.
    ///
    /// Subscriptions to the tree are carried over to the loaded tree. If the loaded tree cannot be
    /// evaluated consistently, the current tree is kept.
    pub fn load(&mut self, snapshot: Snapshot<B::Expr>) -> Result<(), SnapshotError> {
        let mut loaded = Tree::from_snapshot(snapshot)?;
        std::mem::swap(&mut loaded.events, &mut self.tree.events);
        let previous = std::mem::replace(&mut self.tree, loaded);

        let roots = self.tree.roots().iter().cloned().collect::<Vec<_>>();
        for root in roots {
            if let Err(err) = self.refresh(root.as_str()) {
                let mut loaded = std::mem::replace(&mut self.tree, previous);
                std::mem::swap(&mut loaded.events, &mut self.tree.events);
                return Err(SnapshotError::Inconsistent(err));
            }
        }

        tracing::debug!(nodes = self.tree.len(), "loaded tree");
        self.tree.emit(Mutation::Loaded);
        Ok(())
    }

    /// Registers a callback invoked with the events the calculator emits itself: edits and
    /// implicit dependencies. Structural changes are emitted by the [`Tree`].
    pub fn subscribe(&mut self, callback: impl FnMut(&Event) + 'static) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::Cas;
    use pretty_assertions::assert_eq;
    use super::*;

    fn sanitize(raw: &str) -> String {
        Calculator::<Cas>::sanitize(raw)
    }

    #[test]
    fn sanitize_references() {
        assert_eq!(sanitize("$a0 + 2"), r"\mathrm{a0} + 2");
        assert_eq!(sanitize(r"\$B12 \cdot 3"), r"\mathrm{b12} \cdot 3");
        assert_eq!(sanitize(r"\mathrm{Area} + 1"), r"\mathrm{Area} + 1");
        assert_eq!(sanitize("$ + 1"), "$ + 1");
    }

    #[test]
    fn occurrence_boundaries() {
        let replace = |source: &str, literal: &str| {
            replace_occurrences(source, literal, |before, after| {
                let joined = before.ends_with(is_name_char) || after.starts_with(is_name_char);
                (!joined).then(|| "#".to_string())
            })
        };
        assert_eq!(replace("3 + 3", "3"), Some("# + #".to_string()));
        assert_eq!(replace("33 + a3", "3"), None);
    }

    #[test]
    fn unary_positions() {
        assert!(is_unary_position(""));
        assert!(is_unary_position("2 * "));
        assert!(is_unary_position("("));
        assert!(!is_unary_position("5 "));
        assert!(!is_unary_position("x"));
    }

    #[test]
    fn plain_literals() {
        assert!(is_plain_literal("3"));
        assert!(is_plain_literal("-0.25"));
        assert!(!is_plain_literal("1/3"));
        assert!(!is_plain_literal("1e30"));
        assert!(!is_plain_literal("-"));
    }

    #[test]
    fn previous_answer_is_rewritten() {
        let mut calc = Calculator::<Cas>::default();
        calc.save_new_expression("4").unwrap();
        let saved = calc.save_new_expression("ans * 2 + answer").unwrap();
        assert_eq!(saved.evaluation.equation, r"\mathrm{a0} * 2 + answer");

        let saved = calc.save_new_expression(r"$ans + 1").unwrap();
        assert_eq!(saved.evaluation.equation, r"\mathrm{a1} + 1");
    }

    #[test]
    fn solutions_are_formatted() {
        let mut calc = Calculator::<Cas>::default();
        let evaluation = calc.evaluate_expression("x^2 = 4");
        assert_eq!(calc.format(&evaluation.value), "x = -2, 2");
        assert!(calc.tree().is_empty());
    }
}
