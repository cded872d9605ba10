//! Error types for the editor

use crate::persistence::PersistenceError;
use marble_ast::{EditTarget, StructuralError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("Cannot save with {errors} local error(s)")]
    SaveBlocked { errors: usize },

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("Save failed: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Unknown edit target: {0}")]
    UnknownTarget(EditTarget),

    #[error("Invalid editor config: {0}")]
    Config(String),

    #[error("Editor session is closed")]
    SessionClosed,
}
