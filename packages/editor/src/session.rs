//! # Editor Session
//!
//! Owns one expression under edit (a trigger condition or a scoring rule
//! formula) together with its validation overlay.
//!
//! ## Lifecycle
//!
//! ```text
//! Clean ──edit──▶ LocallyValidated ──debounce──▶ AwaitingRemote ──response──▶ Reconciled
//!                        ▲                                                      │
//!                        └──────────────────────────edit────────────────────────┘
//!
//! any state except Saving ──save──▶ Saving ──▶ Saved | SaveFailed
//! ```
//!
//! Every edit synchronously revalidates locally, marks the session dirty and
//! restarts the debounce window for a remote submission tagged with a fresh
//! sequence number. Remote responses go through the overlay's sequence gate,
//! so a slow response can never overwrite a newer one.

use crate::config::EditorConfig;
use crate::debounce::Debouncer;
use crate::errors::EditorError;
use crate::mutations::Mutation;
use crate::overlay::{IssueSource, MergeOutcome, ValidationOverlay};
use crate::persistence::{PersistenceError, RuleStore, SaveRequest};
use crate::remote::{EchoToken, RemoteResponse, RemoteSubmission, ValidationContext};
use crate::undo_stack::UndoStack;
use chrono::{DateTime, Utc};
use marble_ast::{
    decompose, to_serialized, AstNode, DataModel, EditTarget, Edited, FunctionRegistry, IdGenerator,
    NestedCondition, NodePath, PathEffect, ScenarioIteration, TreeEditor,
};
use marble_linter::{error_count, validate_with, LintOptions, ValidationIssue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "camelCase")]
pub enum SessionState {
    Clean,
    LocallyValidated,
    AwaitingRemote,
    Reconciled,
    Saving,
    Saved,
    SaveFailed(String),
}

/// Immutable view of a session for readers
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub tree: Arc<AstNode>,
    pub overlay: ValidationOverlay,
    pub state: SessionState,
    pub dirty: bool,
    pub can_save: bool,
    pub selection: Option<NodePath>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub pending_request_seq: u64,
}

pub struct EditorSession {
    id: String,
    context: ValidationContext,
    root: Arc<AstNode>,
    editor: TreeEditor,
    schema: Arc<DataModel>,
    lint: LintOptions,
    local_issues: Vec<ValidationIssue>,
    overlay: ValidationOverlay,
    state: SessionState,
    dirty: bool,
    pending_request_seq: u64,
    debouncer: Debouncer,
    history: UndoStack,
    selection: Option<NodePath>,
    config: EditorConfig,
    opened_at: DateTime<Utc>,
    saved_at: Option<DateTime<Utc>>,
}

impl EditorSession {
    /// Open `tree` for editing with the built-in function registry
    pub fn new(context: ValidationContext, tree: &AstNode, schema: Arc<DataModel>, config: EditorConfig) -> Self {
        Self::with_functions(context, tree, schema, Arc::new(FunctionRegistry::new()), config)
    }

    pub fn with_functions(
        context: ValidationContext,
        tree: &AstNode,
        schema: Arc<DataModel>,
        functions: Arc<FunctionRegistry>,
        config: EditorConfig,
    ) -> Self {
        let opened_at = Utc::now();
        let scope = context.scope();
        let mut ids = IdGenerator::new(&scope);
        let root = Arc::new(ids.normalize(tree));

        let mut session = Self {
            id: format!("{}@{}", scope, opened_at.timestamp_millis()),
            context,
            root,
            editor: TreeEditor::new(ids, Arc::clone(&functions)),
            schema,
            lint: LintOptions::with_functions(functions),
            local_issues: Vec::new(),
            overlay: ValidationOverlay::new(),
            state: SessionState::Clean,
            dirty: false,
            pending_request_seq: 0,
            debouncer: Debouncer::new(config.debounce()),
            history: UndoStack::with_max_levels(config.undo_levels),
            selection: None,
            config,
            opened_at,
            saved_at: None,
        };
        session.revalidate();

        info!(
            session = %session.id,
            nodes = session.root.node_count(),
            issues = session.local_issues.len(),
            "Opened editor session"
        );
        session
    }

    /// Open one target of a scenario iteration
    pub fn open(
        iteration: &ScenarioIteration,
        target: EditTarget,
        schema: Arc<DataModel>,
        config: EditorConfig,
    ) -> Result<Self, EditorError> {
        let tree = iteration
            .expression(&target)
            .ok_or_else(|| EditorError::UnknownTarget(target.clone()))?;
        let context = ValidationContext::for_iteration(iteration, target);
        Ok(Self::new(context, &tree, schema, config))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    pub fn tree(&self) -> Arc<AstNode> {
        Arc::clone(&self.root)
    }

    pub fn overlay(&self) -> &ValidationOverlay {
        &self.overlay
    }

    pub fn local_issues(&self) -> &[ValidationIssue] {
        &self.local_issues
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn pending_request_seq(&self) -> u64 {
        self.pending_request_seq
    }

    pub fn selection(&self) -> Option<&NodePath> {
        self.selection.as_ref()
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.saved_at
    }

    /// True iff the latest local pass found no errors. Remote issues never block saving.
    pub fn can_save(&self) -> bool {
        error_count(&self.local_issues) == 0
    }

    // Mutation API

    pub fn replace_node(&mut self, path: &NodePath, node: &AstNode) -> Result<(), EditorError> {
        self.apply(Mutation::ReplaceNode {
            path: path.clone(),
            node: node.clone(),
        })
    }

    pub fn insert_child(&mut self, parent: &NodePath, index: usize, node: &AstNode) -> Result<(), EditorError> {
        self.apply(Mutation::InsertChild {
            parent: parent.clone(),
            index,
            node: node.clone(),
        })
    }

    pub fn remove_node(&mut self, path: &NodePath) -> Result<(), EditorError> {
        self.apply(Mutation::RemoveNode { path: path.clone() })
    }

    pub fn move_node(&mut self, from: &NodePath, to: &NodePath) -> Result<(), EditorError> {
        self.apply(Mutation::MoveNode {
            from: from.clone(),
            to: to.clone(),
        })
    }

    /// Flattened where/and/or view of the current root
    pub fn conditions(&self) -> Vec<NestedCondition> {
        decompose(&self.root)
    }

    pub fn set_conditions(&mut self, conditions: Vec<NestedCondition>) -> Result<(), EditorError> {
        self.apply(Mutation::SetConditions { conditions })
    }

    /// Apply one mutation. On error nothing changes.
    pub fn apply(&mut self, mutation: Mutation) -> Result<(), EditorError> {
        self.ensure_not_saving()?;
        let edited = mutation.apply(&mut self.editor, &self.root).map_err(|err| {
            debug!(session = %self.id, operation = mutation.name(), error = %err, "Rejected edit");
            err
        })?;

        self.history.record(Arc::clone(&self.root));
        self.commit(mutation.name(), edited);
        Ok(())
    }

    /// Group following edits into one undo step
    pub fn begin_batch(&mut self, description: Option<&str>) {
        self.history.begin_batch();
        if let Some(description) = description {
            self.history.set_batch_description(description);
        }
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    /// Returns false when there is nothing to undo
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.ensure_not_saving()?;
        match self.history.undo(Arc::clone(&self.root)) {
            Some(tree) => {
                self.restore("undo", tree);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns false when there is nothing to redo
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.ensure_not_saving()?;
        match self.history.redo(Arc::clone(&self.root)) {
            Some(tree) => {
                self.restore("redo", tree);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Focus a node. Paths that do not resolve clear the selection.
    pub fn select(&mut self, path: Option<NodePath>) {
        self.selection = path.filter(|p| self.root.get(p).is_some());
    }

    // Remote validation

    /// When the pending remote submission becomes due, if any
    pub fn remote_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Submission for the current tree once the debounce window has closed
    pub fn poll_remote(&mut self, now: Instant) -> Option<RemoteSubmission> {
        if !self.debouncer.take_due(now) {
            return None;
        }
        Some(self.submission())
    }

    /// Submission for the current tree right away, skipping the debounce window
    pub fn flush_remote(&mut self) -> Option<RemoteSubmission> {
        if !self.debouncer.is_pending() {
            return None;
        }
        self.debouncer.cancel();
        Some(self.submission())
    }

    fn submission(&mut self) -> RemoteSubmission {
        if self.state == SessionState::LocallyValidated || self.state == SessionState::Reconciled {
            self.state = SessionState::AwaitingRemote;
        }
        debug!(session = %self.id, seq = self.pending_request_seq, "Submitting for remote validation");
        RemoteSubmission {
            token: EchoToken {
                session_id: self.id.clone(),
                seq: self.pending_request_seq,
            },
            context: self.context.clone(),
            tree: to_serialized(&self.root),
        }
    }

    /// Merge a remote response through the sequence gate
    pub fn receive_remote(&mut self, response: RemoteResponse) -> MergeOutcome {
        if response.token.session_id != self.id {
            warn!(session = %self.id, token = %response.token.session_id, "Ignoring response for another session");
            return MergeOutcome::Foreign;
        }

        let seq = response.token.seq;
        let outcome = self.overlay.merge(response.issues, IssueSource::Remote, seq);
        match outcome {
            MergeOutcome::Applied => {
                debug!(session = %self.id, seq, "Applied remote validation");
                if self.state == SessionState::AwaitingRemote
                    && seq == self.pending_request_seq
                    && !self.debouncer.is_pending()
                {
                    self.state = SessionState::Reconciled;
                }
            }
            MergeOutcome::Stale { last_applied, .. } => {
                debug!(session = %self.id, seq, last_applied, "Discarding stale remote validation");
            }
            MergeOutcome::Foreign => {}
        }
        outcome
    }

    // Saving

    /// Enter `Saving` and hand out what to persist
    pub fn begin_save(&mut self) -> Result<SaveRequest, EditorError> {
        self.ensure_not_saving()?;
        let errors = error_count(&self.local_issues);
        if errors > 0 {
            return Err(EditorError::SaveBlocked { errors });
        }

        self.state = SessionState::Saving;
        Ok(SaveRequest {
            context: self.context.clone(),
            expression: to_serialized(&self.root),
        })
    }

    /// Leave `Saving` with the store's verdict. The tree and overlay are kept either way.
    pub fn finish_save(&mut self, result: Result<(), PersistenceError>) -> Result<(), EditorError> {
        if self.state != SessionState::Saving {
            warn!(session = %self.id, state = ?self.state, "Save completion without a save in progress");
            return Ok(());
        }

        match result {
            Ok(()) => {
                self.state = SessionState::Saved;
                self.dirty = false;
                self.saved_at = Some(Utc::now());
                info!(session = %self.id, "Saved");
                Ok(())
            }
            Err(err) => {
                warn!(session = %self.id, error = %err, "Save failed");
                self.state = SessionState::SaveFailed(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Persist the current tree through `store`
    pub async fn save(&mut self, store: &dyn RuleStore) -> Result<(), EditorError> {
        let request = self.begin_save()?;
        let result = store.save(&request).await;
        self.finish_save(result)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            tree: Arc::clone(&self.root),
            overlay: self.overlay.clone(),
            state: self.state.clone(),
            dirty: self.dirty,
            can_save: self.can_save(),
            selection: self.selection.clone(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            pending_request_seq: self.pending_request_seq,
        }
    }

    fn ensure_not_saving(&self) -> Result<(), EditorError> {
        if self.state == SessionState::Saving {
            Err(EditorError::SaveInProgress)
        } else {
            Ok(())
        }
    }

    fn restore(&mut self, operation: &'static str, tree: Arc<AstNode>) {
        let edited = Edited {
            tree,
            effects: vec![PathEffect::Replaced(NodePath::root())],
        };
        let selection = self.selection.take();
        self.commit(operation, edited);
        self.select(selection);
    }

    fn commit(&mut self, operation: &'static str, edited: Edited) {
        self.root = edited.tree;
        self.overlay.apply_effects(&edited.effects);
        self.selection = self
            .selection
            .take()
            .and_then(|path| readdress_selection(path, &edited.effects));

        self.revalidate();
        self.dirty = true;
        self.state = SessionState::LocallyValidated;
        self.pending_request_seq += 1;
        if self.config.remote_validation {
            self.debouncer.schedule(Instant::now());
        }

        debug!(
            session = %self.id,
            operation,
            effects = ?edited.effects,
            seq = self.pending_request_seq,
            local_errors = error_count(&self.local_issues),
            "Committed edit"
        );
    }

    fn revalidate(&mut self) {
        self.local_issues = validate_with(&self.root, &self.schema, &self.lint);
        self.overlay.merge(self.local_issues.clone(), IssueSource::Local, self.pending_request_seq);
    }
}

/// Follow the selected node through an edit. Selections inside a removed
/// subtree are dropped; a replaced node stays selected.
fn readdress_selection(mut path: NodePath, effects: &[PathEffect]) -> Option<NodePath> {
    for effect in effects {
        path = match effect {
            PathEffect::Replaced(at) if at.is_prefix_of(&path) && *at != path => return None,
            PathEffect::Replaced(_) => path,
            PathEffect::Removed(at) if at.is_prefix_of(&path) => return None,
            PathEffect::Removed(at) => path.shifted_after_removal(at),
            PathEffect::Inserted(at) => path.shifted_after_insertion(at),
        };
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use marble_ast::{DataType, LogicalOperator, Operator, StructuralError};
    use marble_linter::{codes, Severity};
    use std::sync::Mutex;

    fn schema() -> Arc<DataModel> {
        Arc::new(DataModel::new().with_table(
            "transactions",
            &[("amount", DataType::Float), ("country", DataType::String)],
        ))
    }

    fn gt_amount() -> AstNode {
        AstNode::binary(Operator::Gt, AstNode::field("transactions", "amount"), AstNode::number(1000.0))
    }

    fn eq_country() -> AstNode {
        AstNode::binary(Operator::Eq, AstNode::field("transactions", "country"), AstNode::string("FR"))
    }

    fn session_with(tree: AstNode) -> EditorSession {
        let context = ValidationContext::new("sc", "it", EditTarget::Trigger);
        EditorSession::new(context, &tree, schema(), EditorConfig::default())
    }

    fn session() -> EditorSession {
        session_with(AstNode::and(vec![gt_amount(), eq_country()]))
    }

    fn remote(session: &EditorSession, seq: u64, code: &str) -> RemoteResponse {
        let token = EchoToken {
            session_id: session.id().to_string(),
            seq,
        };
        RemoteResponse::new(token, vec![ValidationIssue::error(code, code, NodePath::from(vec![0]))])
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Vec<SaveRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl RuleStore for MemoryStore {
        async fn save(&self, request: &SaveRequest) -> Result<(), PersistenceError> {
            if self.fail {
                return Err(PersistenceError::Rejected("conflict".to_string()));
            }
            self.saved.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    #[test]
    fn test_open_assigns_ids_and_validates() {
        let session = session();

        assert_eq!(session.state(), &SessionState::Clean);
        assert!(!session.is_dirty());
        assert!(session.can_save());
        let mut ids = Vec::new();
        session.tree().walk(&mut |_, node| ids.push(node.id.clone()));
        assert!(ids.iter().all(|id| !id.is_empty()));
    }

    #[test]
    fn test_open_from_iteration() {
        let iteration = ScenarioIteration::from_json(
            r#"{ "scenarioId": "sc", "iterationId": "it", "rules": [{ "id": "r1", "name": "n", "scoreModifier": 1 }] }"#,
        )
        .unwrap();

        let session = EditorSession::open(&iteration, EditTarget::rule("r1"), schema(), EditorConfig::default()).unwrap();
        assert!(session.tree().is_undefined());
        assert!(!session.can_save());

        let err = EditorSession::open(&iteration, EditTarget::rule("r9"), schema(), EditorConfig::default());
        assert!(matches!(err, Err(EditorError::UnknownTarget(_))));
    }

    #[test]
    fn test_delete_scenario() {
        let mut session = session();

        let conditions = session.conditions();
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].logical_operator, LogicalOperator::Where);
        assert_eq!(conditions[1].logical_operator, LogicalOperator::And);

        session.remove_node(&NodePath::from(vec![1])).unwrap();

        let tree = session.tree();
        assert_eq!(tree.to_string(), "(transactions.amount > 1000) AND ?");
        assert_eq!(session.local_issues().len(), 1);
        assert_eq!(session.local_issues()[0].severity, Severity::Error);
        assert_eq!(session.local_issues()[0].node_path, NodePath::from(vec![1]));
        assert!(!session.can_save());
        assert!(session.is_dirty());
        assert_eq!(session.state(), &SessionState::LocallyValidated);
        assert_eq!(session.pending_request_seq(), 1);
    }

    #[test]
    fn test_failed_edit_changes_nothing() {
        let mut session = session();
        let before = session.tree();

        let err = session.move_node(&NodePath::from(vec![0]), &NodePath::from(vec![0, 0])).unwrap_err();

        assert!(matches!(err, EditorError::Structural(StructuralError::CyclicMove { .. })));
        assert!(Arc::ptr_eq(&before, &session.tree()));
        assert!(!session.is_dirty());
        assert_eq!(session.pending_request_seq(), 0);
    }

    #[test]
    fn test_move_onto_itself_keeps_overlay() {
        let mut session = session_with(AstNode::and(vec![gt_amount(), eq_country(), gt_amount()]));
        session.receive_remote(remote(&session, 0, "flagged"));

        let err = session.move_node(&NodePath::from(vec![0]), &NodePath::from(vec![0])).unwrap_err();

        assert!(matches!(err, EditorError::Structural(StructuralError::CyclicMove { .. })));
        assert_eq!(session.overlay().entries_at(&NodePath::from(vec![0])).len(), 1);
        assert!(!session.is_dirty());
        assert_eq!(session.remote_deadline(), None);
    }

    #[test]
    fn test_remote_round_trip() {
        let mut session = session();
        session.replace_node(&NodePath::from(vec![0, 1]), &AstNode::number(5.0)).unwrap();

        assert!(session.poll_remote(Instant::now()).is_none());
        let submission = session.flush_remote().unwrap();
        assert_eq!(submission.token.seq, 1);
        assert_eq!(session.state(), &SessionState::AwaitingRemote);

        let outcome = session.receive_remote(remote(&session, 1, "score-range"));

        assert_eq!(outcome, MergeOutcome::Applied);
        assert_eq!(session.state(), &SessionState::Reconciled);
        assert_eq!(session.overlay().remote_issues().count(), 1);
        assert!(session.can_save());
    }

    #[test]
    fn test_merge_ordering() {
        let mut session = session();
        for value in [1.0, 2.0, 3.0] {
            session.replace_node(&NodePath::from(vec![0, 1]), &AstNode::number(value)).unwrap();
        }

        assert_eq!(session.receive_remote(remote(&session, 2, "two")), MergeOutcome::Applied);
        assert!(matches!(session.receive_remote(remote(&session, 1, "one")), MergeOutcome::Stale { .. }));
        assert_eq!(session.receive_remote(remote(&session, 3, "three")), MergeOutcome::Applied);

        let codes: Vec<&str> = session.overlay().remote_issues().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["three"]);
        assert_eq!(session.overlay().last_applied_remote_seq(), Some(3));
    }

    #[test]
    fn test_foreign_response_is_ignored() {
        let mut session = session();
        let response = RemoteResponse::new(
            EchoToken {
                session_id: "someone-else".to_string(),
                seq: 99,
            },
            vec![],
        );

        assert_eq!(session.receive_remote(response), MergeOutcome::Foreign);
        assert_eq!(session.overlay().last_applied_remote_seq(), None);
    }

    #[test]
    fn test_remote_errors_do_not_block_save() {
        let mut session = session();
        session.receive_remote(remote(&session, 0, "remote-error"));

        assert_eq!(session.overlay().remote_issues().count(), 1);
        assert!(session.can_save());
    }

    #[test]
    fn test_delete_collects_overlay_entries() {
        let mut session = session_with(AstNode::and(vec![gt_amount(), eq_country(), gt_amount()]));
        let token = EchoToken {
            session_id: session.id().to_string(),
            seq: 0,
        };
        session.receive_remote(RemoteResponse::new(
            token,
            vec![
                ValidationIssue::error("a", "a", NodePath::from(vec![1])),
                ValidationIssue::error("b", "b", NodePath::from(vec![1, 0])),
                ValidationIssue::warning("c", "c", NodePath::from(vec![2])),
            ],
        ));

        session.remove_node(&NodePath::from(vec![1])).unwrap();

        let remaining: Vec<&str> = session
            .overlay()
            .entries_under(&NodePath::from(vec![1]))
            .iter()
            .map(|e| e.issue.code.as_str())
            .collect();
        assert_eq!(remaining, vec!["c"]);
        assert_eq!(session.tree().children.len(), 2);
    }

    #[test]
    fn test_undo_redo() {
        let mut session = session();
        let original = session.tree();

        session.remove_node(&NodePath::from(vec![1])).unwrap();
        assert!(session.undo().unwrap());

        assert!(Arc::ptr_eq(&session.tree(), &original));
        assert!(session.can_save());
        assert!(session.is_dirty());
        assert_eq!(session.pending_request_seq(), 2);

        assert!(session.redo().unwrap());
        assert!(!session.can_save());
        assert!(!session.redo().unwrap());
    }

    #[test]
    fn test_batch_is_one_undo_step() {
        let mut session = session();
        let original = session.tree();

        session.begin_batch(Some("swap operands"));
        session.replace_node(&NodePath::from(vec![0, 1]), &AstNode::number(1.0)).unwrap();
        session.replace_node(&NodePath::from(vec![1, 1]), &AstNode::string("DE")).unwrap();
        session.end_batch();

        assert!(session.undo().unwrap());
        assert!(Arc::ptr_eq(&session.tree(), &original));
        assert!(!session.can_undo());
    }

    #[test]
    fn test_selection_follows_edits() {
        let mut session = session_with(AstNode::and(vec![gt_amount(), eq_country(), gt_amount()]));
        session.select(Some(NodePath::from(vec![2, 0])));

        session.remove_node(&NodePath::from(vec![0])).unwrap();
        assert_eq!(session.selection(), Some(&NodePath::from(vec![1, 0])));

        session.replace_node(&NodePath::from(vec![1]), &AstNode::boolean(true)).unwrap();
        assert_eq!(session.selection(), None);

        session.select(Some(NodePath::from(vec![7])));
        assert_eq!(session.selection(), None);
    }

    #[test]
    fn test_set_conditions() {
        let mut session = session();
        let mut conditions = session.conditions();
        conditions.swap(0, 1);
        conditions[0].logical_operator = LogicalOperator::Where;
        conditions[1].logical_operator = LogicalOperator::Or;

        session.set_conditions(conditions).unwrap();

        assert_eq!(
            session.tree().to_string(),
            "(transactions.country = \"FR\") OR (transactions.amount > 1000)"
        );
    }

    #[tokio::test]
    async fn test_save_success() {
        let mut session = session();
        session.replace_node(&NodePath::from(vec![0, 1]), &AstNode::number(5.0)).unwrap();
        let store = MemoryStore::default();

        session.save(&store).await.unwrap();

        assert_eq!(session.state(), &SessionState::Saved);
        assert!(!session.is_dirty());
        assert!(session.saved_at().is_some());
        assert_eq!(store.saved.lock().unwrap()[0].context.target, EditTarget::Trigger);
    }

    #[tokio::test]
    async fn test_save_blocked_by_local_errors() {
        let mut session = session();
        session.remove_node(&NodePath::from(vec![1])).unwrap();

        let err = session.save(&MemoryStore::default()).await.unwrap_err();

        assert!(matches!(err, EditorError::SaveBlocked { errors: 1 }));
        assert_eq!(session.state(), &SessionState::LocallyValidated);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_tree() {
        let mut session = session();
        session.replace_node(&NodePath::from(vec![0, 1]), &AstNode::number(5.0)).unwrap();
        let before = session.tree();
        let store = MemoryStore {
            fail: true,
            ..MemoryStore::default()
        };

        let err = session.save(&store).await.unwrap_err();

        assert!(matches!(err, EditorError::Persistence(_)));
        assert!(matches!(session.state(), SessionState::SaveFailed(_)));
        assert!(session.is_dirty());
        assert!(Arc::ptr_eq(&before, &session.tree()));
    }

    #[test]
    fn test_edits_rejected_while_saving() {
        let mut session = session();
        session.begin_save().unwrap();

        assert!(matches!(session.begin_save(), Err(EditorError::SaveInProgress)));
        assert!(matches!(
            session.remove_node(&NodePath::from(vec![0])),
            Err(EditorError::SaveInProgress)
        ));

        session.finish_save(Ok(())).unwrap();
        assert_eq!(session.state(), &SessionState::Saved);
    }

    #[test]
    fn test_remote_disabled() {
        let context = ValidationContext::new("sc", "it", EditTarget::Trigger);
        let config = EditorConfig {
            remote_validation: false,
            ..EditorConfig::default()
        };
        let mut session = EditorSession::new(context, &gt_amount(), schema(), config);

        session.replace_node(&NodePath::from(vec![1]), &AstNode::number(1.0)).unwrap();

        assert_eq!(session.remote_deadline(), None);
        assert!(session.flush_remote().is_none());
    }

    #[test]
    fn test_snapshot_reflects_session() {
        let mut session = session_with(AstNode::binary(
            Operator::Div,
            AstNode::field("transactions", "amount"),
            AstNode::number(0.0),
        ));
        session.select(Some(NodePath::root()));

        assert_eq!(session.local_issues()[0].code, codes::DIVISION_BY_ZERO);
        assert_eq!(session.snapshot().selection, Some(NodePath::root()));
    }
}
