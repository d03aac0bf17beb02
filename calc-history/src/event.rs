//! Change notifications emitted by the tree and the calculator.

use crate::id::NodeId;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A change to the state of the history tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    NodeAdded(NodeId),
    NodeDeleted(NodeId),
    DependencyAdded { dependent: NodeId, dependency: NodeId },
    DependencyRemoved { dependent: NodeId, dependency: NodeId },
    AliasChanged(NodeId),
    NoteChanged(NodeId),
    CollapseToggled(NodeId),

    /// Every node was removed.
    Cleared,

    /// The tree was replaced by a loaded snapshot.
    Loaded,

    /// The equation of a node was edited, and the node and its dependents were re-evaluated.
    ///
    /// This is emitted once per edit by the calculator, in addition to the structural mutations
    /// the edit caused in the tree.
    Edited(NodeId),
}

/// A notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Mutate(Mutation),

    /// A literal in a new entry matched the previous answer and was replaced by a reference to
    /// the node holding it.
    ImplicitDependencyFormed {
        node: NodeId,
        literal: String,
    },
}

/// Identifies a subscription, so that it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

type Callback<E> = Box<dyn FnMut(&E)>;

/// A synchronous publish / subscribe channel.
pub struct Emitter<E> {
    subscribers: Vec<(SubscriptionId, Callback<E>)>,
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self { subscribers: Vec::new() }
    }
}

impl<E> Emitter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback that is invoked with every emitted event, in subscription order.
    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let len = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != len
    }

    pub fn emit(&mut self, event: &E) {
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;
    use super::*;

    #[test]
    fn subscribers_receive_events_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut emitter = Emitter::new();

        let first = Rc::clone(&seen);
        emitter.subscribe(move |n: &u32| first.borrow_mut().push(("first", *n)));
        let second = Rc::clone(&seen);
        emitter.subscribe(move |n: &u32| second.borrow_mut().push(("second", *n)));

        emitter.emit(&1);
        assert_eq!(*seen.borrow(), vec![("first", 1), ("second", 1)]);
    }

    #[test]
    fn unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut emitter = Emitter::new();
        let counter = Rc::clone(&count);
        let id = emitter.subscribe(move |_: &()| *counter.borrow_mut() += 1);

        emitter.emit(&());
        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        emitter.emit(&());

        assert_eq!(*count.borrow(), 1);
        assert!(emitter.is_empty());
    }
}
