//! Saving edited expressions.

use crate::remote::ValidationContext;
use async_trait::async_trait;
use marble_ast::{ScenarioIteration, SerializedNode};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid scenario document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    #[error("Rejected: {0}")]
    Rejected(String),
}

/// One expression to persist
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub context: ValidationContext,
    pub expression: SerializedNode,
}

#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn save(&self, request: &SaveRequest) -> Result<(), PersistenceError>;
}

/// Writes expressions back into a scenario iteration JSON file
#[derive(Debug, Clone)]
pub struct IterationFileStore {
    path: PathBuf,
}

impl IterationFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RuleStore for IterationFileStore {
    async fn save(&self, request: &SaveRequest) -> Result<(), PersistenceError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let mut iteration: ScenarioIteration = serde_json::from_str(&content)?;

        let target = &request.context.target;
        if !iteration.set_expression(target, request.expression.clone()) {
            return Err(PersistenceError::UnknownRule(target.to_string()));
        }

        // Write next to the original, then swap it in
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, serde_json::to_string_pretty(&iteration)?).await?;
        tokio::fs::rename(&staging, &self.path).await?;

        debug!(path = %self.path.display(), target = %target, "Saved expression");
        Ok(())
    }
}
