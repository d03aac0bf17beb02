use crate::id::NodeId;
use thiserror::Error;

/// A structural violation of the history tree. Operations that return this error make no changes
/// to the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node `{0}` does not exist")]
    NodeNotFound(NodeId),

    #[error("dependency `{0}` does not exist")]
    DependencyNotFound(NodeId),

    #[error("dependent `{0}` does not exist")]
    DependentNotFound(NodeId),

    #[error("`{dependent}` cannot depend on `{dependency}`, since `{dependency}` already depends on `{dependent}`")]
    Cycle { dependent: NodeId, dependency: NodeId },

    #[error("alias `{alias}` is already used by `{owner}`")]
    AliasConflict { alias: String, owner: NodeId },

    #[error("`{0}` is a reserved name")]
    ReservedAlias(String),

    #[error("`{0}` is not a valid alias")]
    InvalidAlias(String),
}

/// A snapshot that cannot be loaded into a consistent tree.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("node `{0}` appears more than once")]
    DuplicateId(NodeId),

    #[error("`{0}` refers to a node that is not in the snapshot")]
    UnknownId(NodeId),

    #[error("dependency of `{dependent}` on `{dependency}` forms a cycle")]
    Cycle { dependent: NodeId, dependency: NodeId },

    #[error("alias `{alias}` is used by both `{first}` and `{second}`")]
    AliasConflict { alias: String, first: NodeId, second: NodeId },

    #[error("node `{id}` has an unusable alias: {err}")]
    Alias { id: NodeId, err: TreeError },

    #[error("root list does not match the nodes without dependencies")]
    RootMismatch,

    #[error("snapshot cannot be evaluated: {0}")]
    Inconsistent(#[from] TreeError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
