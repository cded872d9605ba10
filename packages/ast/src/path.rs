//! Node paths: the addressing scheme shared by the editor and validators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step from a node to one of its operands
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Index into the ordered children
    Child(usize),
    /// Key of a named argument
    Named(String),
}

impl PathSegment {
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Child(index) => Some(*index),
            PathSegment::Named(_) => None,
        }
    }
}

/// Sequence of segments from the root. The empty path is the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(Vec<PathSegment>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    pub fn from_indices(indices: &[usize]) -> Self {
        Self(indices.iter().copied().map(PathSegment::Child).collect())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    pub fn parent(&self) -> Option<NodePath> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn child(&self, index: usize) -> NodePath {
        self.join(PathSegment::Child(index))
    }

    pub fn named(&self, name: impl Into<String>) -> NodePath {
        self.join(PathSegment::Named(name.into()))
    }

    pub fn join(&self, segment: PathSegment) -> NodePath {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    /// True if `self` equals `other` or is one of its ancestors
    pub fn is_prefix_of(&self, other: &NodePath) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Rewrites this path after the child at `removed` was taken out of a
    /// variadic parent: later siblings (and everything under them) move up.
    pub fn shifted_after_removal(&self, removed: &NodePath) -> NodePath {
        self.shifted(removed, |index, removed_index| {
            if index > removed_index {
                index - 1
            } else {
                index
            }
        })
    }

    /// Rewrites this path after a child was inserted at `inserted`:
    /// siblings at or after the insertion point move down.
    pub fn shifted_after_insertion(&self, inserted: &NodePath) -> NodePath {
        self.shifted(inserted, |index, inserted_index| {
            if index >= inserted_index {
                index + 1
            } else {
                index
            }
        })
    }

    fn shifted<F>(&self, at: &NodePath, shift: F) -> NodePath
    where
        F: Fn(usize, usize) -> usize,
    {
        let (Some(parent), Some(PathSegment::Child(at_index))) = (at.parent(), at.last()) else {
            return self.clone();
        };
        let depth = parent.depth();
        if !parent.is_prefix_of(self) || self.depth() <= depth {
            return self.clone();
        }
        let mut segments = self.0.clone();
        if let PathSegment::Child(index) = segments[depth] {
            segments[depth] = PathSegment::Child(shift(index, *at_index));
        }
        Self(segments)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self::from_indices(&indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Child(index) => write!(f, ".{}", index)?,
                PathSegment::Named(name) => write!(f, ".@{}", name)?,
            }
        }
        Ok(())
    }
}
