//! # Undo/Redo Stack
//!
//! Trees are persistent, so history is just a list of earlier roots.
//!
//! - Every committed edit records the root it replaced
//! - Undo swaps the current root for the most recent recorded one
//! - New edits clear the redo stack
//! - Batches record only the root from before their first edit, so the
//!   whole batch undoes in one step

use marble_ast::AstNode;
use std::sync::Arc;

/// One restorable state
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub tree: Arc<AstNode>,
    pub description: Option<String>,
}

#[derive(Debug, Default)]
struct OpenBatch {
    recorded: bool,
    description: Option<String>,
}

#[derive(Debug)]
pub struct UndoStack {
    /// Earlier roots (most recent last)
    undo_stack: Vec<HistoryEntry>,

    /// Undone roots (most recent last)
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    batch: Option<OpenBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            batch: None,
        }
    }

    /// Record `before`, the root an edit is about to replace
    pub fn record(&mut self, before: Arc<AstNode>) {
        let description = match &mut self.batch {
            Some(batch) if batch.recorded => return,
            Some(batch) => {
                batch.recorded = true;
                batch.description.clone()
            }
            None => None,
        };

        self.undo_stack.push(HistoryEntry {
            tree: before,
            description,
        });
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Start a batch of edits (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.batch = Some(OpenBatch::default());
    }

    pub fn end_batch(&mut self) {
        self.batch = None;
    }

    pub fn in_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        let Some(batch) = &mut self.batch else {
            return;
        };
        let description = description.into();
        if batch.recorded {
            if let Some(entry) = self.undo_stack.last_mut() {
                entry.description = Some(description.clone());
            }
        }
        batch.description = Some(description);
    }

    /// Root to restore for undo; `current` becomes redoable
    pub fn undo(&mut self, current: Arc<AstNode>) -> Option<Arc<AstNode>> {
        self.batch = None;
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(HistoryEntry {
            tree: current,
            description: entry.description.clone(),
        });
        Some(entry.tree)
    }

    /// Root to restore for redo; `current` becomes undoable again
    pub fn redo(&mut self, current: Arc<AstNode>) -> Option<Arc<AstNode>> {
        self.batch = None;
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(HistoryEntry {
            tree: current,
            description: entry.description.clone(),
        });
        Some(entry.tree)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch = None;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
