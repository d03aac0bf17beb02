//! Conversion between a [`Tree`] and plain data, for persistence.
//!
//! A [`Snapshot`] stores each node with the identifiers of its dependencies rather than the
//! nodes themselves, along with the identifier counters and the explicit list of roots. Cached
//! values are not stored; they are recomputed when the snapshot is loaded by a
//! [`Calculator`](crate::calculator::Calculator).

use chrono::{DateTime, Utc};
use crate::backend::Backend;
use crate::error::SnapshotError;
use crate::id::{IdGenerator, NodeId};
use crate::node::Node;
use crate::tree::{check_alias, Tree};
use indexmap::IndexSet;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;

/// A saved node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode<E> {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<NodeId>,
    pub equation: String,
    pub formula: E,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub collapsed: bool,
}

/// A saved tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<E> {
    /// The index of the next fresh identifier family.
    pub letter: usize,

    /// The next number of each identifier family.
    pub numbers: BTreeMap<String, u32>,

    pub roots: Vec<NodeId>,

    #[serde(default)]
    pub last_created: Option<NodeId>,

    /// The nodes, in creation order.
    pub nodes: Vec<SnapshotNode<E>>,
}

impl<E> Snapshot<E> {
    pub fn to_json(&self) -> Result<String, SnapshotError>
    where
        E: Serialize,
    {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError>
    where
        E: DeserializeOwned,
    {
        Ok(serde_json::from_str(json)?)
    }
}

impl<B: Backend> Tree<B> {
    /// Saves the tree as plain data.
    pub fn serialize(&self) -> Snapshot<B::Expr> {
        let (letter, numbers) = self.ids.parts();
        Snapshot {
            letter,
            numbers: numbers.clone(),
            roots: self.roots.iter().cloned().collect(),
            last_created: self.last_created.clone(),
            nodes: self.nodes.values().map(|node| SnapshotNode {
                id: node.id().clone(),
                alias: node.alias().map(str::to_string),
                dependencies: node.dependencies().iter().cloned().collect(),
                equation: node.equation().to_string(),
                formula: node.formula().clone(),
                note: node.note().map(str::to_string),
                last_modified: node.last_modified(),
                collapsed: node.collapsed(),
            }).collect(),
        }
    }

    /// Rebuilds a tree from a snapshot. The nodes of the new tree have no cached values.
    ///
    /// Nodes are instantiated first, then linked, since a node may be saved before the nodes it
    /// depends on. The snapshot is rejected if the result would violate any invariant of the
    /// tree.
    pub fn from_snapshot(snapshot: Snapshot<B::Expr>) -> Result<Self, SnapshotError> {
        let mut tree = Self::new();
        tree.ids = IdGenerator::restore(snapshot.letter, snapshot.numbers);

        let mut edges = Vec::with_capacity(snapshot.nodes.len());
        for saved in snapshot.nodes {
            if tree.contains(saved.id.as_str()) {
                return Err(SnapshotError::DuplicateId(saved.id));
            }

            let mut node = Node::<B>::new(saved.id.clone(), saved.equation, saved.formula);
            node.set_note(saved.note.filter(|note| !note.is_empty()));
            node.set_collapsed(saved.collapsed);
            node.set_last_modified(saved.last_modified);
            if let Some(alias) = saved.alias.filter(|alias| !alias.is_empty()) {
                let alias = alias.to_lowercase();
                check_alias::<B>(&alias).map_err(|err| SnapshotError::Alias { id: saved.id.clone(), err })?;
                if let Some(first) = tree.aliases.insert(alias.clone(), saved.id.clone()) {
                    return Err(SnapshotError::AliasConflict { alias, first, second: saved.id });
                }
                node.set_alias(Some(alias));
            }

            tree.ids.reserve(&saved.id);
            tree.nodes.insert(saved.id.clone(), node);
            edges.push((saved.id, saved.dependencies));
        }

        for (dependent, dependencies) in edges {
            for dependency in dependencies {
                if !tree.contains(dependency.as_str()) {
                    return Err(SnapshotError::UnknownId(dependency));
                }
                if tree.would_cycle(dependent.as_str(), dependency.as_str()) {
                    return Err(SnapshotError::Cycle { dependent, dependency });
                }
                if let Some(node) = tree.nodes.get_mut(&dependency) {
                    node.dependents_mut().insert(dependent.clone());
                }
                if let Some(node) = tree.nodes.get_mut(&dependent) {
                    node.dependencies_mut().insert(dependency);
                }
            }
        }

        for root in &snapshot.roots {
            if !tree.contains(root.as_str()) {
                return Err(SnapshotError::UnknownId(root.clone()));
            }
        }
        let expected = tree.nodes
            .values()
            .filter(|node| node.dependencies().is_empty())
            .map(|node| node.id().clone())
            .collect::<IndexSet<_>>();
        tree.roots = snapshot.roots.into_iter().collect();
        if tree.roots.len() != expected.len() || !tree.roots.iter().all(|root| expected.contains(root)) {
            return Err(SnapshotError::RootMismatch);
        }

        if let Some(last) = &snapshot.last_created {
            if !tree.contains(last.as_str()) {
                return Err(SnapshotError::UnknownId(last.clone()));
            }
        }
        tree.last_created = snapshot.last_created;

        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use calc_compute::Formula;
    use crate::backend::Cas;
    use pretty_assertions::assert_eq;
    use super::*;

    fn sample() -> Tree<Cas> {
        let mut tree = Tree::new();
        tree.add_node("1", Formula::parse("1"), &[]).unwrap();
        tree.add_node("a0 + 1", Formula::parse("a0 + 1"), &["a0".into()]).unwrap();
        tree.add_node("2", Formula::parse("2"), &[]).unwrap();
        tree.add_node("a1 b0", Formula::parse("a1 b0"), &["a1".into(), "b0".into()]).unwrap();
        tree.set_alias("b0", Some("two")).unwrap();
        tree.set_note("c0", Some("product")).unwrap();
        tree.toggle_collapse("a1").unwrap();
        tree
    }

    #[test]
    fn round_trip() {
        let tree = sample();
        let snapshot = tree.serialize();
        let json = snapshot.to_json().unwrap();
        let restored = Tree::<Cas>::from_snapshot(Snapshot::from_json(&json).unwrap()).unwrap();

        assert_eq!(restored.serialize(), snapshot);
        assert_eq!(restored.resolve_symbol("two").map(NodeId::as_str), Some("b0"));
        assert_eq!(restored.get("c0").unwrap().note(), Some("product"));
        assert!(restored.get("a1").unwrap().collapsed());
        assert!(restored.get("a0").unwrap().value().is_none());
    }

    #[test]
    fn aliases_are_lowercased() {
        let mut snapshot = sample().serialize();
        snapshot.nodes[2].alias = Some("Two".to_string());
        let restored = Tree::<Cas>::from_snapshot(snapshot).unwrap();
        assert_eq!(restored.resolve_symbol("two").map(NodeId::as_str), Some("b0"));
        assert_eq!(restored.get("b0").unwrap().alias(), Some("two"));
    }

    #[test]
    fn counters_continue() {
        let mut restored = Tree::<Cas>::from_snapshot(sample().serialize()).unwrap();
        let id = restored.add_node("3", Formula::parse("3"), &[]).unwrap();
        assert_eq!(id.as_str(), "d0");
        let id = restored.add_node("a0", Formula::parse("a0"), &["a0".into()]).unwrap();
        assert_eq!(id.as_str(), "a2");
    }

    #[test]
    fn field_names() {
        let json = sample().serialize().to_json().unwrap();
        assert!(json.contains("\"lastModified\""));
        assert!(json.contains("\"lastCreated\""));
    }

    #[test]
    fn invalid_snapshots() {
        let mut snapshot = sample().serialize();
        snapshot.nodes[1].dependencies.push("z9".into());
        assert!(matches!(Tree::<Cas>::from_snapshot(snapshot), Err(SnapshotError::UnknownId(id)) if id.as_str() == "z9"));

        let mut snapshot = sample().serialize();
        snapshot.nodes[0].dependencies.push("c0".into());
        assert!(matches!(Tree::<Cas>::from_snapshot(snapshot), Err(SnapshotError::Cycle { .. })));

        let mut snapshot = sample().serialize();
        snapshot.roots.pop();
        assert!(matches!(Tree::<Cas>::from_snapshot(snapshot), Err(SnapshotError::RootMismatch)));

        let mut snapshot = sample().serialize();
        let duplicate = snapshot.nodes[0].clone();
        snapshot.nodes.push(duplicate);
        assert!(matches!(Tree::<Cas>::from_snapshot(snapshot), Err(SnapshotError::DuplicateId(_))));

        let mut snapshot = sample().serialize();
        snapshot.nodes[0].alias = Some("two".to_string());
        assert!(matches!(Tree::<Cas>::from_snapshot(snapshot), Err(SnapshotError::AliasConflict { .. })));

        for alias in ["ans", "pi", "b7", "2x"] {
            let mut snapshot = sample().serialize();
            snapshot.nodes[0].alias = Some(alias.to_string());
            assert!(
                matches!(Tree::<Cas>::from_snapshot(snapshot), Err(SnapshotError::Alias { id, .. }) if id.as_str() == "a0"),
                "alias `{}` was accepted",
                alias,
            );
        }

        assert!(matches!(Snapshot::<Formula>::from_json("{"), Err(SnapshotError::Json(_))));
    }
}
