//! Remote validation contract.
//!
//! The session never talks to a transport itself. It hands out
//! [`RemoteSubmission`]s and accepts [`RemoteResponse`]s; whatever sits in
//! between implements [`RemoteValidator`] and must echo the token back.

use async_trait::async_trait;
use marble_ast::{EditTarget, NodePath, ScenarioIteration, SerializedNode};
use marble_linter::{codes, ValidationIssue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Correlates a response with the submission that produced it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoToken {
    pub session_id: String,
    pub seq: u64,
}

/// What the remote evaluator needs besides the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationContext {
    pub scenario_id: String,
    pub iteration_id: String,
    pub target: EditTarget,
}

impl ValidationContext {
    pub fn new(scenario_id: impl Into<String>, iteration_id: impl Into<String>, target: EditTarget) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            iteration_id: iteration_id.into(),
            target,
        }
    }

    pub fn for_iteration(iteration: &ScenarioIteration, target: EditTarget) -> Self {
        Self::new(iteration.scenario_id.clone(), iteration.iteration_id.clone(), target)
    }

    /// Id scope for nodes created while editing this target
    pub fn scope(&self) -> String {
        format!("{}/{}/{}", self.scenario_id, self.iteration_id, self.target)
    }
}

/// The tree as it was when the debounce window closed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSubmission {
    pub token: EchoToken,
    pub context: ValidationContext,
    pub tree: SerializedNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteResponse {
    pub token: EchoToken,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
}

impl RemoteResponse {
    pub fn new(token: EchoToken, issues: Vec<ValidationIssue>) -> Self {
        Self { token, issues }
    }

    /// Stand-in response for a failed submission: one warning at the root
    pub fn unavailable(token: EchoToken, error: &RemoteError) -> Self {
        let issue = ValidationIssue::warning(
            codes::REMOTE_UNAVAILABLE,
            format!("remote validation unavailable: {}", error),
            NodePath::root(),
        );
        Self::new(token, vec![issue])
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Asynchronous semantic validation against live data
#[async_trait]
pub trait RemoteValidator: Send + Sync {
    /// Validate one submission. The response must carry the submission's token.
    async fn submit(&self, submission: &RemoteSubmission) -> Result<RemoteResponse, RemoteError>;
}
