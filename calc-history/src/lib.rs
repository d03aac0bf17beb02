//! A history calculator: every entry is recorded as a node of a dependency tree, and later
//! entries can refer to earlier results by identifier (`a0`, `b3`) or by alias.
//!
//! The [`Tree`] stores the nodes and the dependency edges between them. The [`Calculator`]
//! evaluates entries against the tree through a [`Backend`], discovers which nodes an entry
//! refers to, and re-evaluates every dependent of a node when it changes.
//!
//! ```
//! use calc_history::Calculator;
//! use calc_history::backend::Cas;
//!
//! let mut calc = Calculator::<Cas>::default();
//! calc.save_new_expression("1").unwrap();
//! let saved = calc.save_new_expression("$a0 + 2").unwrap();
//! let id = saved.node.unwrap();
//! assert_eq!(id.as_str(), "a1");
//! assert_eq!(calc.format(calc.tree().get("a1").unwrap().value().unwrap()), "3");
//!
//! calc.edit_node("a0", "5").unwrap();
//! assert_eq!(calc.format(calc.tree().get("a1").unwrap().value().unwrap()), "7");
//! ```

pub mod backend;
pub mod calculator;
pub mod codec;
pub mod error;
pub mod event;
pub mod id;
pub mod node;
pub mod tree;

pub use backend::Backend;
pub use calculator::{Calculator, CalculatorOptions, Evaluation, Resolution, Saved, PREVIOUS_ANSWER};
pub use codec::{Snapshot, SnapshotNode};
pub use error::{SnapshotError, TreeError};
pub use event::{Event, Mutation, SubscriptionId};
pub use id::NodeId;
pub use node::{Computed, Node, Solution};
pub use tree::Tree;
