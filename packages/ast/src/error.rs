use crate::path::NodePath;
use thiserror::Error;

pub type StructuralResult<T> = Result<T, StructuralError>;

/// Contract violations raised by tree edits and condition composition.
/// Always fatal to the call that raised them; the tree is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructuralError {
    #[error("Path does not resolve: {0}")]
    InvalidPath(NodePath),

    #[error("Cannot move {from} into its own subtree at {to}")]
    CyclicMove { from: NodePath, to: NodePath },

    #[error("Conditions mix 'and' and 'or' clauses")]
    MixedLogicalOperators,

    #[error("Node at {path} accepts at most {max} operands")]
    ArityExceeded { path: NodePath, max: usize },

    #[error("Cannot compose an empty list of conditions")]
    EmptyConditions,

    #[error("Condition {index} cannot be labeled '{label}'")]
    InvalidConditionLabel { index: usize, label: String },
}

impl StructuralError {
    pub fn invalid_path(path: &NodePath) -> Self {
        Self::InvalidPath(path.clone())
    }

    pub fn cyclic_move(from: &NodePath, to: &NodePath) -> Self {
        Self::CyclicMove {
            from: from.clone(),
            to: to.clone(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SerializeError {
    #[error("Invalid rule JSON: {0}")]
    Json(#[from] serde_json::Error),
}
