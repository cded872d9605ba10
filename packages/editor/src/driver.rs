//! # Session Driver
//!
//! Runs an [`EditorSession`] on its own task. Callers talk to it through a
//! cloneable [`SessionHandle`]; the driver owns the debounce timer, spawns
//! remote submissions and saves, and feeds their results back into the
//! session one at a time. Every change is published as a
//! [`SessionSnapshot`] on a watch channel.

use crate::errors::EditorError;
use crate::mutations::Mutation;
use crate::persistence::{PersistenceError, RuleStore};
use crate::remote::{RemoteResponse, RemoteSubmission, RemoteValidator};
use crate::session::{EditorSession, SessionSnapshot};
use marble_ast::{NestedCondition, NodePath};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

type Reply<T> = oneshot::Sender<Result<T, EditorError>>;

enum Command {
    Apply { mutation: Mutation, reply: Reply<()> },
    Undo { reply: Reply<bool> },
    Redo { reply: Reply<bool> },
    BeginBatch { description: Option<String> },
    EndBatch,
    Select { path: Option<NodePath> },
    Conditions { reply: oneshot::Sender<Vec<NestedCondition>> },
    FlushRemote,
    Save { reply: Reply<()> },
}

/// Cloneable access to a running session
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub async fn apply(&self, mutation: Mutation) -> Result<(), EditorError> {
        self.request(|reply| Command::Apply { mutation, reply }).await?
    }

    pub async fn undo(&self) -> Result<bool, EditorError> {
        self.request(|reply| Command::Undo { reply }).await?
    }

    pub async fn redo(&self) -> Result<bool, EditorError> {
        self.request(|reply| Command::Redo { reply }).await?
    }

    pub async fn begin_batch(&self, description: Option<String>) -> Result<(), EditorError> {
        self.send(Command::BeginBatch { description }).await
    }

    pub async fn end_batch(&self) -> Result<(), EditorError> {
        self.send(Command::EndBatch).await
    }

    pub async fn select(&self, path: Option<NodePath>) -> Result<(), EditorError> {
        self.send(Command::Select { path }).await
    }

    pub async fn conditions(&self) -> Result<Vec<NestedCondition>, EditorError> {
        self.request(|reply| Command::Conditions { reply }).await
    }

    /// Submit the pending edit for remote validation without waiting out the debounce
    pub async fn flush_remote(&self) -> Result<(), EditorError> {
        self.send(Command::FlushRemote).await
    }

    /// Save and wait for the store's answer
    pub async fn save(&self) -> Result<(), EditorError> {
        self.request(|reply| Command::Save { reply }).await?
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    async fn send(&self, command: Command) -> Result<(), EditorError> {
        self.tx.send(command).await.map_err(|_| EditorError::SessionClosed)
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, EditorError> {
        let (reply, rx) = oneshot::channel();
        self.send(command(reply)).await?;
        rx.await.map_err(|_| EditorError::SessionClosed)
    }
}

/// Owns a session and its collaborators while it runs
pub struct SessionDriver {
    session: EditorSession,
    validator: Arc<dyn RemoteValidator>,
    store: Arc<dyn RuleStore>,
}

impl SessionDriver {
    pub fn new(session: EditorSession, validator: Arc<dyn RemoteValidator>, store: Arc<dyn RuleStore>) -> Self {
        Self {
            session,
            validator,
            store,
        }
    }

    /// Start the driver task. It stops once every handle has been dropped.
    pub fn spawn(self) -> (SessionHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(64);
        let (snapshot_tx, snapshots) = watch::channel(self.session.snapshot());
        let join = tokio::spawn(self.run(rx, snapshot_tx));
        (SessionHandle { tx, snapshots }, join)
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>, snapshot_tx: watch::Sender<SessionSnapshot>) {
        let (remote_tx, mut remote_rx) = mpsc::channel::<RemoteResponse>(16);
        let (save_tx, mut save_rx) = mpsc::channel::<(Result<(), PersistenceError>, Reply<()>)>(4);

        loop {
            let deadline = self.session.remote_deadline();

            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command, &remote_tx, &save_tx),
                    None => break,
                },
                Some(response) = remote_rx.recv() => {
                    self.session.receive_remote(response);
                }
                Some((result, reply)) = save_rx.recv() => {
                    let _ = reply.send(self.session.finish_save(result));
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(submission) = self.session.poll_remote(Instant::now()) {
                        self.submit(submission, &remote_tx);
                    }
                }
            }

            snapshot_tx.send_replace(self.session.snapshot());
        }

        debug!(session = %self.session.id(), "Session driver stopped");
    }

    fn handle(
        &mut self,
        command: Command,
        remote_tx: &mpsc::Sender<RemoteResponse>,
        save_tx: &mpsc::Sender<(Result<(), PersistenceError>, Reply<()>)>,
    ) {
        match command {
            Command::Apply { mutation, reply } => {
                let _ = reply.send(self.session.apply(mutation));
            }
            Command::Undo { reply } => {
                let _ = reply.send(self.session.undo());
            }
            Command::Redo { reply } => {
                let _ = reply.send(self.session.redo());
            }
            Command::BeginBatch { description } => self.session.begin_batch(description.as_deref()),
            Command::EndBatch => self.session.end_batch(),
            Command::Select { path } => self.session.select(path),
            Command::Conditions { reply } => {
                let _ = reply.send(self.session.conditions());
            }
            Command::FlushRemote => {
                if let Some(submission) = self.session.flush_remote() {
                    self.submit(submission, remote_tx);
                }
            }
            Command::Save { reply } => match self.session.begin_save() {
                Ok(request) => {
                    let store = Arc::clone(&self.store);
                    let save_tx = save_tx.clone();
                    tokio::spawn(async move {
                        let result = store.save(&request).await;
                        let _ = save_tx.send((result, reply)).await;
                    });
                }
                Err(err) => {
                    let _ = reply.send(Err(err));
                }
            },
        }
    }

    fn submit(&self, submission: RemoteSubmission, remote_tx: &mpsc::Sender<RemoteResponse>) {
        let validator = Arc::clone(&self.validator);
        let remote_tx = remote_tx.clone();
        tokio::spawn(async move {
            let response = match validator.submit(&submission).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(seq = submission.token.seq, error = %err, "Remote validation unavailable");
                    RemoteResponse::unavailable(submission.token.clone(), &err)
                }
            };
            let _ = remote_tx.send(response).await;
        });
    }
}
