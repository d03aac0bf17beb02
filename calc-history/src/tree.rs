//! The dependency tree of calculator entries.
//!
//! The tree is an arena of [`Node`]s keyed by [`NodeId`]. Dependency edges are stored on both
//! endpoints as identifiers, never as owning references, so a node is removed by unlinking it
//! from its neighbours and dropping it from the arena.
//!
//! Every operation that changes the tree checks its preconditions first and emits a
//! [`Mutation`] afterwards, so subscribers observe each change exactly once and never observe a
//! partially applied operation.

use crate::backend::Backend;
use crate::error::TreeError;
use crate::event::{Emitter, Event, Mutation, SubscriptionId};
use crate::id::{is_id_shaped, IdGenerator, NodeId};
use crate::node::{Computed, Node};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, VecDeque};

/// The history tree.
#[derive(Debug)]
pub struct Tree<B: Backend> {
    /// Every live node, in creation order.
    pub(crate) nodes: IndexMap<NodeId, Node<B>>,

    /// The nodes without dependencies.
    pub(crate) roots: IndexSet<NodeId>,

    pub(crate) aliases: HashMap<String, NodeId>,

    /// The most recently added node, used to resolve the previous answer.
    pub(crate) last_created: Option<NodeId>,

    pub(crate) ids: IdGenerator,

    pub(crate) events: Emitter<Event>,
}

impl<B: Backend> Default for Tree<B> {
    fn default() -> Self {
        Self {
            nodes: IndexMap::new(),
            roots: IndexSet::new(),
            aliases: HashMap::new(),
            last_created: None,
            ids: IdGenerator::new(),
            events: Emitter::new(),
        }
    }
}

/// Returns true if `name` can be written as a symbol in an expression.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Checks that a lowercase name can be used as an alias: it must be an identifier that is neither
/// reserved by the backend nor shaped like a node identifier.
pub(crate) fn check_alias<B: Backend>(name: &str) -> Result<(), TreeError> {
    if B::is_reserved(name) {
        return Err(TreeError::ReservedAlias(name.to_string()));
    }
    if !is_identifier(name) || is_id_shaped(name) {
        return Err(TreeError::InvalidAlias(name.to_string()));
    }
    Ok(())
}

impl<B: Backend> Tree<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Node<B>> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Finds the node a symbol refers to, by identifier first and by alias second.
    pub fn resolve_symbol(&self, name: &str) -> Option<&NodeId> {
        self.nodes
            .get_key_value(name)
            .map(|(id, _)| id)
            .or_else(|| self.aliases.get(name))
    }

    /// The nodes without dependencies, in the order they became roots.
    pub fn roots(&self) -> &IndexSet<NodeId> {
        &self.roots
    }

    /// Every live node, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<B>> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn last_created(&self) -> Option<&NodeId> {
        self.last_created.as_ref()
    }

    /// Returns every node that depends on `id`, directly or transitively, in breadth-first order.
    pub fn descendants(&self, id: &str) -> IndexSet<NodeId> {
        let mut seen = IndexSet::new();
        let mut queue = VecDeque::new();
        if let Some(node) = self.nodes.get(id) {
            queue.extend(node.dependents().iter().cloned());
        }

        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(&next) {
                queue.extend(node.dependents().iter().filter(|d| !seen.contains(*d)).cloned());
            }
        }

        seen
    }

    /// Returns true if making `dependent` depend on `dependency` would create a cycle.
    pub fn would_cycle(&self, dependent: &str, dependency: &str) -> bool {
        dependent == dependency || self.descendants(dependent).contains(dependency)
    }

    /// Adds a node to the tree.
    ///
    /// A node with exactly one distinct dependency continues the identifier family of that
    /// dependency. Any other node starts a new family.
    pub fn add_node(
        &mut self,
        equation: impl Into<String>,
        formula: B::Expr,
        dependencies: &[NodeId],
    ) -> Result<NodeId, TreeError> {
        let dependencies = dependencies.iter().cloned().collect::<IndexSet<_>>();
        if let Some(missing) = dependencies.iter().find(|id| !self.contains(id.as_str())) {
            return Err(TreeError::DependencyNotFound(missing.clone()));
        }

        let family = match dependencies.first() {
            Some(dependency) if dependencies.len() == 1 => Some(dependency.family().to_string()),
            _ => None,
        };
        let id = self.ids.next(family.as_deref());

        let mut node = Node::new(id.clone(), equation.into(), formula);
        for dependency in &dependencies {
            node.dependencies_mut().insert(dependency.clone());
            if let Some(dependency) = self.nodes.get_mut(dependency) {
                dependency.dependents_mut().insert(id.clone());
            }
        }
        if dependencies.is_empty() {
            self.roots.insert(id.clone());
        }
        self.nodes.insert(id.clone(), node);
        self.last_created = Some(id.clone());

        tracing::debug!(id = %id, dependencies = dependencies.len(), "added node");
        self.emit(Mutation::NodeAdded(id.clone()));
        Ok(id)
    }

    fn check_edge(&self, dependent: &str, dependency: &str) -> Result<(NodeId, NodeId), TreeError> {
        let dependent = self.nodes
            .get_key_value(dependent)
            .map(|(id, _)| id.clone())
            .ok_or_else(|| TreeError::DependentNotFound(dependent.into()))?;
        let dependency = self.nodes
            .get_key_value(dependency)
            .map(|(id, _)| id.clone())
            .ok_or_else(|| TreeError::DependencyNotFound(dependency.into()))?;
        Ok((dependent, dependency))
    }

    /// Makes `dependent` depend on `dependency`.
    ///
    /// A mutation is emitted even if the edge already existed.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) -> Result<(), TreeError> {
        let (dependent, dependency) = self.check_edge(dependent, dependency)?;
        if self.would_cycle(dependent.as_str(), dependency.as_str()) {
            return Err(TreeError::Cycle { dependent, dependency });
        }

        if let Some(node) = self.nodes.get_mut(&dependency) {
            node.dependents_mut().insert(dependent.clone());
        }
        if let Some(node) = self.nodes.get_mut(&dependent) {
            node.dependencies_mut().insert(dependency.clone());
        }
        self.update_root(&dependent);

        tracing::debug!(dependent = %dependent, dependency = %dependency, "added dependency");
        self.emit(Mutation::DependencyAdded { dependent, dependency });
        Ok(())
    }

    /// Removes the dependency of `dependent` on `dependency`.
    ///
    /// A mutation is emitted even if there was no such edge.
    pub fn remove_dependency(&mut self, dependent: &str, dependency: &str) -> Result<(), TreeError> {
        let (dependent, dependency) = self.check_edge(dependent, dependency)?;

        if let Some(node) = self.nodes.get_mut(&dependency) {
            node.dependents_mut().shift_remove(&dependent);
        }
        if let Some(node) = self.nodes.get_mut(&dependent) {
            node.dependencies_mut().shift_remove(&dependency);
        }
        self.update_root(&dependent);

        tracing::debug!(dependent = %dependent, dependency = %dependency, "removed dependency");
        self.emit(Mutation::DependencyRemoved { dependent, dependency });
        Ok(())
    }

    /// Deletes a node along with every node that depends on it. Returns false if the node does
    /// not exist.
    pub fn delete_node(&mut self, id: &str) -> bool {
        let Some(dependents) = self.nodes.get(id).map(|node| node.dependents().clone()) else {
            return false;
        };
        for dependent in &dependents {
            self.delete_node(dependent.as_str());
        }

        let Some(node) = self.nodes.shift_remove(id) else {
            return false;
        };
        for dependency in node.dependencies() {
            if let Some(dependency) = self.nodes.get_mut(dependency) {
                dependency.dependents_mut().shift_remove(id);
            }
        }
        self.roots.shift_remove(id);
        if let Some(alias) = node.alias() {
            self.aliases.remove(alias);
        }
        if self.last_created.as_ref().is_some_and(|last| last.as_str() == id) {
            self.last_created = None;
        }

        tracing::debug!(id = %node.id(), "deleted node");
        self.emit(Mutation::NodeDeleted(node.id().clone()));
        true
    }

    /// Sets or removes the alias of a node.
    ///
    /// Aliases are stored in lowercase. Setting the current alias again, setting an empty alias,
    /// or removing a missing alias changes nothing.
    pub fn set_alias(&mut self, id: &str, alias: Option<&str>) -> Result<(), TreeError> {
        let node = self.nodes.get(id).ok_or_else(|| TreeError::NodeNotFound(id.into()))?;
        let alias = alias.map(str::to_lowercase);
        match alias.as_deref() {
            Some("") => return Ok(()),
            current if current == node.alias() => return Ok(()),
            Some(name) => {
                check_alias::<B>(name)?;
                if let Some(owner) = self.aliases.get(name).filter(|owner| owner.as_str() != id) {
                    return Err(TreeError::AliasConflict { alias: name.to_string(), owner: owner.clone() });
                }
            },
            None => (),
        }

        let id = node.id().clone();
        if let Some(old) = node.alias().map(str::to_string) {
            self.aliases.remove(&old);
        }
        if let Some(name) = &alias {
            self.aliases.insert(name.clone(), id.clone());
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.set_alias(alias.clone());
        }

        tracing::debug!(id = %id, alias = ?alias, "changed alias");
        self.emit(Mutation::AliasChanged(id));
        Ok(())
    }

    /// Sets or removes the note of a node. An empty note changes nothing.
    pub fn set_note(&mut self, id: &str, note: Option<&str>) -> Result<(), TreeError> {
        let node = self.nodes.get_mut(id).ok_or_else(|| TreeError::NodeNotFound(id.into()))?;
        if note == Some("") {
            return Ok(());
        }

        node.set_note(note.map(str::to_string));
        let id = node.id().clone();
        self.emit(Mutation::NoteChanged(id));
        Ok(())
    }

    /// Flips whether the subtree of a node is hidden, returning the new state.
    pub fn toggle_collapse(&mut self, id: &str) -> Result<bool, TreeError> {
        let node = self.nodes.get_mut(id).ok_or_else(|| TreeError::NodeNotFound(id.into()))?;
        let collapsed = !node.collapsed();
        node.set_collapsed(collapsed);

        let id = node.id().clone();
        self.emit(Mutation::CollapseToggled(id));
        Ok(collapsed)
    }

    /// Removes every node and resets the identifier counters. Subscriptions are kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.aliases.clear();
        self.last_created = None;
        self.ids = IdGenerator::new();

        tracing::debug!("cleared tree");
        self.emit(Mutation::Cleared);
    }

    /// Registers a callback invoked with every event the tree emits.
    pub fn subscribe(&mut self, callback: impl FnMut(&Event) + 'static) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub(crate) fn emit(&mut self, mutation: Mutation) {
        self.events.emit(&Event::Mutate(mutation));
    }

    pub(crate) fn set_value(&mut self, id: &str, value: Computed<B::Value>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_value(value);
        }
    }

    pub(crate) fn set_equation(&mut self, id: &str, equation: String, formula: B::Expr) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_equation(equation, formula);
        }
    }

    /// Keeps root membership of a node consistent with its dependencies.
    fn update_root(&mut self, id: &NodeId) {
        match self.nodes.get(id) {
            Some(node) if node.dependencies().is_empty() => {
                self.roots.insert(id.clone());
            },
            _ => {
                self.roots.shift_remove(id);
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::Cas;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;
    use super::*;

    fn add(tree: &mut Tree<Cas>, equation: &str, dependencies: &[&str]) -> NodeId {
        let dependencies = dependencies.iter().map(|id| NodeId::from(*id)).collect::<Vec<_>>();
        tree.add_node(equation, calc_compute::Formula::parse(equation), &dependencies).unwrap()
    }

    fn record(tree: &mut Tree<Cas>) -> Rc<RefCell<Vec<Event>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        tree.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    fn ids(set: &IndexSet<NodeId>) -> Vec<&str> {
        set.iter().map(NodeId::as_str).collect()
    }

    #[test]
    fn families() {
        let mut tree = Tree::new();
        let a0 = add(&mut tree, "1", &[]);
        let a1 = add(&mut tree, "a0 + 1", &["a0"]);
        let b0 = add(&mut tree, "2", &[]);
        let c0 = add(&mut tree, "a1 + b0", &["a1", "b0"]);
        let a2 = add(&mut tree, "a0 a0", &["a0", "a0"]);

        assert_eq!(
            [a0, a1, b0, c0, a2].iter().map(NodeId::as_str).collect::<Vec<_>>(),
            vec!["a0", "a1", "b0", "c0", "a2"],
        );
        assert_eq!(ids(tree.roots()), vec!["a0", "b0"]);
        assert_eq!(tree.last_created().map(NodeId::as_str), Some("a2"));
    }

    #[test]
    fn edges_are_symmetric() {
        let mut tree = Tree::new();
        add(&mut tree, "1", &[]);
        add(&mut tree, "a0 + 1", &["a0"]);

        assert_eq!(ids(tree.get("a0").unwrap().dependents()), vec!["a1"]);
        assert_eq!(ids(tree.get("a1").unwrap().dependencies()), vec!["a0"]);

        tree.remove_dependency("a1", "a0").unwrap();
        assert!(tree.get("a0").unwrap().dependents().is_empty());
        assert_eq!(ids(tree.roots()), vec!["a0", "a1"]);

        tree.add_dependency("a1", "a0").unwrap();
        assert_eq!(ids(tree.roots()), vec!["a0"]);
    }

    #[test]
    fn missing_dependency() {
        let mut tree = Tree::<Cas>::new();
        let err = tree.add_node("b0", calc_compute::Formula::parse("b0"), &[NodeId::from("b0")]).unwrap_err();
        assert_eq!(err, TreeError::DependencyNotFound(NodeId::from("b0")));
        assert!(tree.is_empty());
        assert_eq!(tree.add_dependency("x0", "a0"), Err(TreeError::DependentNotFound(NodeId::from("x0"))));
    }

    #[test]
    fn cycles_are_rejected() {
        let mut tree = Tree::new();
        add(&mut tree, "1", &[]);
        add(&mut tree, "a0", &["a0"]);
        add(&mut tree, "a1", &["a1"]);
        let events = record(&mut tree);

        assert!(matches!(tree.add_dependency("a0", "a2"), Err(TreeError::Cycle { .. })));
        assert!(matches!(tree.add_dependency("a0", "a0"), Err(TreeError::Cycle { .. })));
        assert!(events.borrow().is_empty());
        assert!(tree.would_cycle("a1", "a2"));
        assert!(!tree.would_cycle("a2", "a0"));
    }

    #[test]
    fn edge_operations_always_emit() {
        let mut tree = Tree::new();
        add(&mut tree, "1", &[]);
        add(&mut tree, "a0", &["a0"]);
        let events = record(&mut tree);

        tree.add_dependency("a1", "a0").unwrap();
        tree.remove_dependency("a1", "a0").unwrap();
        tree.remove_dependency("a1", "a0").unwrap();
        assert_eq!(events.borrow().len(), 3);
    }

    #[test]
    fn cascading_delete() {
        let mut tree = Tree::new();
        add(&mut tree, "1", &[]);
        add(&mut tree, "a0 + 1", &["a0"]);
        add(&mut tree, "2", &[]);
        add(&mut tree, "a1 + b0", &["a1", "b0"]);
        tree.set_alias("c0", Some("total")).unwrap();
        let events = record(&mut tree);

        assert!(tree.delete_node("a0"));
        assert_eq!(tree.nodes().map(|node| node.id().as_str()).collect::<Vec<_>>(), vec!["b0"]);
        assert_eq!(ids(tree.roots()), vec!["b0"]);
        assert!(tree.get("b0").unwrap().dependents().is_empty());
        assert_eq!(tree.resolve_symbol("total"), None);
        assert_eq!(tree.last_created(), None);
        assert_eq!(*events.borrow(), vec![
            Event::Mutate(Mutation::NodeDeleted("c0".into())),
            Event::Mutate(Mutation::NodeDeleted("a1".into())),
            Event::Mutate(Mutation::NodeDeleted("a0".into())),
        ]);

        assert!(!tree.delete_node("a0"));
    }

    #[test]
    fn aliases() {
        let mut tree = Tree::new();
        add(&mut tree, "1", &[]);
        add(&mut tree, "2", &[]);

        tree.set_alias("a0", Some("Width")).unwrap();
        assert_eq!(tree.get("a0").unwrap().alias(), Some("width"));
        assert_eq!(tree.resolve_symbol("width").map(NodeId::as_str), Some("a0"));
        assert_eq!(tree.resolve_symbol("b0").map(NodeId::as_str), Some("b0"));

        assert_eq!(
            tree.set_alias("b0", Some("width")),
            Err(TreeError::AliasConflict { alias: "width".to_string(), owner: "a0".into() }),
        );
        assert_eq!(tree.set_alias("b0", Some("ans")), Err(TreeError::ReservedAlias("ans".to_string())));
        assert_eq!(tree.set_alias("b0", Some("pi")), Err(TreeError::ReservedAlias("pi".to_string())));
        assert_eq!(tree.set_alias("b0", Some("c7")), Err(TreeError::InvalidAlias("c7".to_string())));
        assert_eq!(tree.set_alias("b0", Some("two words")), Err(TreeError::InvalidAlias("two words".to_string())));
        assert_eq!(tree.set_alias("z0", Some("x")), Err(TreeError::NodeNotFound("z0".into())));

        tree.set_alias("a0", Some("height")).unwrap();
        assert_eq!(tree.resolve_symbol("width"), None);
        tree.set_alias("a0", None).unwrap();
        assert_eq!(tree.resolve_symbol("height"), None);
        assert_eq!(tree.get("a0").unwrap().alias(), None);
    }

    #[test]
    fn no_op_alias_and_note() {
        let mut tree = Tree::new();
        add(&mut tree, "1", &[]);
        tree.set_alias("a0", Some("one")).unwrap();
        let events = record(&mut tree);

        tree.set_alias("a0", Some("one")).unwrap();
        tree.set_alias("a0", Some("ONE")).unwrap();
        tree.set_alias("a0", Some("")).unwrap();
        tree.set_note("a0", Some("")).unwrap();
        assert!(events.borrow().is_empty());

        tree.set_note("a0", Some("unit")).unwrap();
        assert_eq!(tree.get("a0").unwrap().note(), Some("unit"));
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn collapse_and_clear() {
        let mut tree = Tree::new();
        add(&mut tree, "1", &[]);
        assert_eq!(tree.toggle_collapse("a0"), Ok(true));
        assert!(tree.get("a0").unwrap().collapsed());
        assert_eq!(tree.toggle_collapse("a0"), Ok(false));

        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.roots().is_empty());
        assert_eq!(add(&mut tree, "2", &[]).as_str(), "a0");
    }

    #[test]
    fn descendants_are_transitive() {
        let mut tree = Tree::new();
        add(&mut tree, "1", &[]);
        add(&mut tree, "a0", &["a0"]);
        add(&mut tree, "2", &[]);
        add(&mut tree, "a1 b0", &["a1", "b0"]);
        assert_eq!(ids(&tree.descendants("a0")), vec!["a1", "c0"]);
        assert_eq!(ids(&tree.descendants("c0")), Vec::<&str>::new());
    }
}
