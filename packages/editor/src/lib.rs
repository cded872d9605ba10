//! # Marble Editor
//!
//! Editing engine for scenario rule expressions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ ast: persistent rule trees + tree edits     │
//! │ linter: synchronous local validation        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: one session per edited expression   │
//! │  - Apply mutations, revalidate locally      │
//! │  - Debounced remote validation              │
//! │  - Sequence-gated overlay merge             │
//! │  - Undo/redo, save                          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ collaborators: RemoteValidator, RuleStore   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marble_editor::{EditorConfig, EditorSession, SessionDriver};
//!
//! let session = EditorSession::open(&iteration, EditTarget::Trigger, schema, EditorConfig::default())?;
//! let (handle, _task) = SessionDriver::new(session, validator, store).spawn();
//!
//! handle.apply(Mutation::RemoveNode { path: NodePath::from(vec![1]) }).await?;
//! if handle.snapshot().can_save {
//!     handle.save().await?;
//! }
//! ```

mod config;
mod debounce;
mod driver;
mod errors;
mod mutations;
mod overlay;
mod persistence;
mod remote;
mod session;
mod undo_stack;

pub use config::EditorConfig;
pub use debounce::Debouncer;
pub use driver::{SessionDriver, SessionHandle};
pub use errors::EditorError;
pub use mutations::Mutation;
pub use overlay::{IssueSource, MergeOutcome, OverlayEntry, ValidationOverlay};
pub use persistence::{IterationFileStore, PersistenceError, RuleStore, SaveRequest};
pub use remote::{EchoToken, RemoteError, RemoteResponse, RemoteSubmission, RemoteValidator, ValidationContext};
pub use session::{EditorSession, SessionSnapshot, SessionState};
pub use undo_stack::{HistoryEntry, UndoStack};
