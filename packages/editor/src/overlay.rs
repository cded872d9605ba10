//! # Validation Overlay
//!
//! Per-path diagnostics from two independent sources:
//!
//! - **Local** issues come from the synchronous validator and always describe
//!   the current tree, so each local pass replaces the whole local layer.
//! - **Remote** issues arrive asynchronously. Each response carries the
//!   sequence number of its submission and is applied only if it is at least
//!   as new as the last applied one; older responses are discarded.
//!
//! Both layers are surfaced side by side; neither suppresses the other.

use marble_ast::{NodePath, PathEffect};
use marble_linter::{Severity, ValidationIssue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSource {
    Local,
    Remote,
}

/// Result of merging a batch of issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Applied,
    /// Older than what the overlay already shows; nothing changed
    Stale { seq: u64, last_applied: u64 },
    /// Response tagged for another session; nothing changed
    Foreign,
}

/// One overlay entry, borrowed from the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayEntry<'a> {
    pub issue: &'a ValidationIssue,
    pub source: IssueSource,
    /// Submission that produced a remote entry
    pub request_seq: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOverlay {
    local: BTreeMap<NodePath, Vec<ValidationIssue>>,
    remote: BTreeMap<NodePath, Vec<ValidationIssue>>,
    last_applied_remote_seq: Option<u64>,
}

impl ValidationOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `issues` from `source`. `request_seq` only matters for remote issues.
    pub fn merge(&mut self, issues: Vec<ValidationIssue>, source: IssueSource, request_seq: u64) -> MergeOutcome {
        match source {
            IssueSource::Local => {
                self.local = group(issues);
                MergeOutcome::Applied
            }
            IssueSource::Remote => match self.last_applied_remote_seq {
                Some(last_applied) if request_seq < last_applied => MergeOutcome::Stale {
                    seq: request_seq,
                    last_applied,
                },
                _ => {
                    self.remote = group(issues);
                    self.last_applied_remote_seq = Some(request_seq);
                    MergeOutcome::Applied
                }
            },
        }
    }

    /// Re-address entries after a structural edit.
    ///
    /// Entries at or below a replaced or removed path are dropped; entries on
    /// later siblings follow the shift.
    pub fn apply_effects(&mut self, effects: &[PathEffect]) {
        for effect in effects {
            for layer in [&mut self.local, &mut self.remote] {
                *layer = std::mem::take(layer)
                    .into_iter()
                    .filter_map(|(path, issues)| readdress(path, effect).map(|path| (path, issues)))
                    .fold(BTreeMap::new(), |mut acc, (path, issues)| {
                        let moved = issues.into_iter().map(|mut issue| {
                            issue.node_path = path.clone();
                            issue
                        });
                        acc.entry(path.clone()).or_insert_with(Vec::new).extend(moved);
                        acc
                    });
            }
        }
    }

    /// Entries at exactly `path`, local first
    pub fn entries_at(&self, path: &NodePath) -> Vec<OverlayEntry<'_>> {
        let local = self.local.get(path).into_iter().flatten().map(|issue| self.local_entry(issue));
        let remote = self.remote.get(path).into_iter().flatten().map(|issue| self.remote_entry(issue));
        local.chain(remote).collect()
    }

    /// Entries at `path` or anywhere below it
    pub fn entries_under(&self, path: &NodePath) -> Vec<OverlayEntry<'_>> {
        self.entries()
            .into_iter()
            .filter(|(entry_path, _)| path.is_prefix_of(entry_path))
            .map(|(_, entry)| entry)
            .collect()
    }

    /// Every entry ordered by path, local before remote at the same path
    pub fn entries(&self) -> Vec<(&NodePath, OverlayEntry<'_>)> {
        let mut entries: Vec<(&NodePath, OverlayEntry<'_>)> = self
            .local
            .iter()
            .flat_map(|(path, issues)| issues.iter().map(move |issue| (path, self.local_entry(issue))))
            .chain(
                self.remote
                    .iter()
                    .flat_map(|(path, issues)| issues.iter().map(move |issue| (path, self.remote_entry(issue)))),
            )
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries
    }

    pub fn local_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.local.values().flatten()
    }

    pub fn remote_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.remote.values().flatten()
    }

    pub fn local_error_count(&self) -> usize {
        self.local_issues()
            .filter(|issue| issue.severity == Severity::Error)
            .count()
    }

    pub fn last_applied_remote_seq(&self) -> Option<u64> {
        self.last_applied_remote_seq
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.remote.is_empty()
    }

    pub fn len(&self) -> usize {
        self.local_issues().count() + self.remote_issues().count()
    }

    fn local_entry<'a>(&self, issue: &'a ValidationIssue) -> OverlayEntry<'a> {
        OverlayEntry {
            issue,
            source: IssueSource::Local,
            request_seq: None,
        }
    }

    fn remote_entry<'a>(&self, issue: &'a ValidationIssue) -> OverlayEntry<'a> {
        OverlayEntry {
            issue,
            source: IssueSource::Remote,
            request_seq: self.last_applied_remote_seq,
        }
    }
}

fn group(issues: Vec<ValidationIssue>) -> BTreeMap<NodePath, Vec<ValidationIssue>> {
    let mut grouped: BTreeMap<NodePath, Vec<ValidationIssue>> = BTreeMap::new();
    for issue in issues {
        grouped.entry(issue.node_path.clone()).or_default().push(issue);
    }
    grouped
}

/// New address of an entry at `path` after `effect`, or `None` if it is gone
fn readdress(path: NodePath, effect: &PathEffect) -> Option<NodePath> {
    match effect {
        PathEffect::Replaced(at) => (!at.is_prefix_of(&path)).then_some(path),
        PathEffect::Removed(at) => (!at.is_prefix_of(&path)).then(|| path.shifted_after_removal(at)),
        PathEffect::Inserted(at) => Some(path.shifted_after_insertion(at)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marble_linter::codes;

    fn issue(path: &[usize], code: &str) -> ValidationIssue {
        ValidationIssue::error(code, code, NodePath::from_indices(path))
    }

    fn remote_codes(overlay: &ValidationOverlay) -> Vec<&str> {
        overlay.remote_issues().map(|i| i.code.as_str()).collect()
    }

    #[test]
    fn test_local_pass_replaces_local_layer() {
        let mut overlay = ValidationOverlay::new();
        overlay.merge(vec![issue(&[0], "a"), issue(&[1], "b")], IssueSource::Local, 0);
        overlay.merge(vec![issue(&[1], "c")], IssueSource::Local, 0);

        assert!(overlay.entries_at(&NodePath::from(vec![0])).is_empty());
        assert_eq!(overlay.entries_at(&NodePath::from(vec![1]))[0].issue.code, "c");
    }

    #[test]
    fn test_out_of_order_remote_responses() {
        let mut overlay = ValidationOverlay::new();

        assert_eq!(overlay.merge(vec![issue(&[0], "two")], IssueSource::Remote, 2), MergeOutcome::Applied);
        assert_eq!(
            overlay.merge(vec![issue(&[0], "one")], IssueSource::Remote, 1),
            MergeOutcome::Stale { seq: 1, last_applied: 2 }
        );
        assert_eq!(remote_codes(&overlay), vec!["two"]);

        assert_eq!(overlay.merge(vec![issue(&[1], "three")], IssueSource::Remote, 3), MergeOutcome::Applied);
        assert_eq!(remote_codes(&overlay), vec!["three"]);
        assert_eq!(overlay.last_applied_remote_seq(), Some(3));
    }

    #[test]
    fn test_sources_are_concatenated() {
        let mut overlay = ValidationOverlay::new();
        overlay.merge(vec![issue(&[0], "local")], IssueSource::Local, 0);
        overlay.merge(vec![issue(&[0], "remote")], IssueSource::Remote, 4);

        let entries = overlay.entries_at(&NodePath::from(vec![0]));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].source, IssueSource::Local);
        assert_eq!(entries[1].source, IssueSource::Remote);
        assert_eq!(entries[1].request_seq, Some(4));
    }

    #[test]
    fn test_removal_drops_subtree_and_shifts_siblings() {
        let mut overlay = ValidationOverlay::new();
        overlay.merge(
            vec![
                issue(&[0], "first"),
                issue(&[1], "removed"),
                issue(&[1, 0], "removed-child"),
                issue(&[2, 1], "shifted"),
            ],
            IssueSource::Remote,
            1,
        );

        overlay.apply_effects(&[PathEffect::Removed(NodePath::from(vec![1]))]);

        assert!(overlay.entries_under(&NodePath::from(vec![1])).iter().all(|e| e.issue.code == "shifted"));
        let shifted = overlay.entries_at(&NodePath::from(vec![1, 1]));
        assert_eq!(shifted[0].issue.code, "shifted");
        assert_eq!(shifted[0].issue.node_path, NodePath::from(vec![1, 1]));
        assert_eq!(overlay.entries_at(&NodePath::from(vec![0]))[0].issue.code, "first");
        assert_eq!(overlay.len(), 2);
    }

    #[test]
    fn test_replacement_and_insertion() {
        let mut overlay = ValidationOverlay::new();
        overlay.merge(
            vec![issue(&[0, 1], codes::TYPE_MISMATCH), issue(&[1], codes::UNKNOWN_FIELD)],
            IssueSource::Remote,
            1,
        );

        overlay.apply_effects(&[
            PathEffect::Replaced(NodePath::from(vec![0])),
            PathEffect::Inserted(NodePath::from(vec![0])),
        ]);

        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.entries_at(&NodePath::from(vec![2]))[0].issue.code, codes::UNKNOWN_FIELD);
    }

    #[test]
    fn test_local_error_count_ignores_remote() {
        let mut overlay = ValidationOverlay::new();
        overlay.merge(vec![issue(&[0], "remote")], IssueSource::Remote, 1);
        assert_eq!(overlay.local_error_count(), 0);

        overlay.merge(
            vec![ValidationIssue::warning("w", "w", NodePath::root()), issue(&[0], "e")],
            IssueSource::Local,
            0,
        );
        assert_eq!(overlay.local_error_count(), 1);
    }
}
