//! # Tree Edits
//!
//! Persistent edit operations on rule trees. Each operation takes the current
//! root and returns a new one; the input tree is never touched, so callers
//! can keep old roots around for undo.
//!
//! ## Semantics
//!
//! ### Remove
//! - A required operand (one whose removal would drop the parent below its
//!   minimum arity) is replaced with an `Undefined` placeholder
//! - Any other positional child is taken out and later siblings shift left
//! - Removing the root leaves a lone placeholder
//!
//! ### Insert
//! - Variadic parents take the node at `index` (`index == len` appends)
//! - Fixed-arity parents only accept it onto an `Undefined` placeholder
//!
//! ### Move
//! - Fails if the destination lies inside the moved subtree
//! - Destination coordinates refer to the tree before the move
//! - The moved node keeps its id

use crate::ast::{AstNode, NodeKind};
use crate::error::{StructuralError, StructuralResult};
use crate::functions::FunctionRegistry;
use crate::id_generator::IdGenerator;
use crate::path::{NodePath, PathSegment};
use std::sync::Arc;

/// How an edit changed the addressing of existing nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathEffect {
    /// Subtree at the path was swapped for another one
    Replaced(NodePath),
    /// Node at the path was taken out; later siblings shifted left
    Removed(NodePath),
    /// A node now sits at the path; siblings from there on shifted right
    Inserted(NodePath),
}

/// Result of a tree edit
#[derive(Debug, Clone)]
pub struct Edited {
    pub tree: Arc<AstNode>,
    pub effects: Vec<PathEffect>,
}

/// Applies edits to rule trees, stamping ids on every node it creates.
#[derive(Debug, Clone)]
pub struct TreeEditor {
    ids: IdGenerator,
    functions: Arc<FunctionRegistry>,
}

impl TreeEditor {
    pub fn new(ids: IdGenerator, functions: Arc<FunctionRegistry>) -> Self {
        Self { ids, functions }
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn ids_mut(&mut self) -> &mut IdGenerator {
        &mut self.ids
    }

    /// Give `node` and its whole subtree fresh ids
    pub fn adopt(&mut self, node: &AstNode) -> AstNode {
        self.ids.stamp(node)
    }

    fn placeholder(&mut self) -> Arc<AstNode> {
        Arc::new(self.ids.stamp(&AstNode::undefined()))
    }

    /// Swap the subtree at `path` for `node`
    pub fn replace_node(
        &mut self,
        tree: &Arc<AstNode>,
        path: &NodePath,
        node: &AstNode,
    ) -> StructuralResult<Edited> {
        let replacement = Arc::new(self.adopt(node));
        let tree = update_at(tree, path.segments(), path, |_| Ok(replacement))?;
        Ok(Edited {
            tree,
            effects: vec![PathEffect::Replaced(path.clone())],
        })
    }

    /// Insert `node` as the `index`-th child of the node at `parent`
    pub fn insert_child(
        &mut self,
        tree: &Arc<AstNode>,
        parent: &NodePath,
        index: usize,
        node: &AstNode,
    ) -> StructuralResult<Edited> {
        let node = Arc::new(self.adopt(node));
        self.insert_arc(tree, parent, index, node)
    }

    fn insert_arc(
        &mut self,
        tree: &Arc<AstNode>,
        parent: &NodePath,
        index: usize,
        node: Arc<AstNode>,
    ) -> StructuralResult<Edited> {
        let slot = parent.child(index);
        let functions = Arc::clone(&self.functions);
        let mut effect = None;

        let tree = update_at(tree, parent.segments(), parent, |target| {
            let mut copy = AstNode::clone(target);
            match target.arity(&functions).and_then(|arity| arity.max()) {
                Some(max) => {
                    let fills_placeholder = copy
                        .children
                        .get(index)
                        .map_or(false, |existing| existing.is_undefined());
                    if !fills_placeholder {
                        return Err(StructuralError::ArityExceeded {
                            path: parent.clone(),
                            max,
                        });
                    }
                    copy.children[index] = node;
                    effect = Some(PathEffect::Replaced(slot.clone()));
                }
                None => {
                    if index > copy.children.len() {
                        return Err(StructuralError::invalid_path(&slot));
                    }
                    copy.children.insert(index, node);
                    effect = Some(PathEffect::Inserted(slot.clone()));
                }
            }
            Ok(Arc::new(copy))
        })?;

        Ok(Edited {
            tree,
            effects: effect.into_iter().collect(),
        })
    }

    /// Remove the node at `path`, leaving a placeholder where it is required
    pub fn remove_node(&mut self, tree: &Arc<AstNode>, path: &NodePath) -> StructuralResult<Edited> {
        let (Some(parent), Some(segment)) = (path.parent(), path.last()) else {
            return Ok(Edited {
                tree: self.placeholder(),
                effects: vec![PathEffect::Replaced(NodePath::root())],
            });
        };

        let placeholder = self.placeholder();
        let functions = Arc::clone(&self.functions);
        let mut effect = None;

        let tree = update_at(tree, parent.segments(), path, |target| {
            if target.child_at(segment).is_none() {
                return Err(StructuralError::invalid_path(path));
            }
            let mut copy = AstNode::clone(target);
            let required = match segment {
                PathSegment::Child(_) => target
                    .arity(&functions)
                    .map_or(false, |arity| target.children.len() <= arity.min()),
                PathSegment::Named(name) => match &target.kind {
                    NodeKind::FunctionCall { name: function } => functions
                        .get(function)
                        .map_or(false, |sig| sig.has_named_parameter(name)),
                    _ => false,
                },
            };

            if required {
                copy.set_child(segment, placeholder);
                effect = Some(PathEffect::Replaced(path.clone()));
            } else {
                match segment {
                    PathSegment::Child(index) => {
                        copy.children.remove(*index);
                    }
                    PathSegment::Named(name) => {
                        copy.named_arguments.remove(name);
                    }
                }
                effect = Some(PathEffect::Removed(path.clone()));
            }
            Ok(Arc::new(copy))
        })?;

        Ok(Edited {
            tree,
            effects: effect.into_iter().collect(),
        })
    }

    /// Move the node at `from` to the child slot `to`
    pub fn move_node(
        &mut self,
        tree: &Arc<AstNode>,
        from: &NodePath,
        to: &NodePath,
    ) -> StructuralResult<Edited> {
        if from.is_root() {
            return Err(StructuralError::invalid_path(from));
        }
        let (Some(to_parent), Some(PathSegment::Child(_))) = (to.parent(), to.last()) else {
            return Err(StructuralError::invalid_path(to));
        };
        if from == to || from.is_prefix_of(&to_parent) {
            return Err(StructuralError::cyclic_move(from, to));
        }

        let moved = resolve(tree, from).ok_or_else(|| StructuralError::invalid_path(from))?;
        let target_parent = resolve(tree, &to_parent).ok_or_else(|| StructuralError::invalid_path(to))?;

        let variadic = target_parent
            .arity(&self.functions)
            .map_or(true, |arity| arity.max().is_none());
        if variadic && from.parent().as_ref() == Some(&to_parent) {
            return self.reorder(tree, from, to);
        }

        let detached = self.remove_node(tree, from)?;
        let mut destination = to.clone();
        for effect in &detached.effects {
            if let PathEffect::Removed(removed) = effect {
                destination = destination.shifted_after_removal(removed);
            }
        }

        let (Some(parent), Some(PathSegment::Child(index))) = (destination.parent(), destination.last())
        else {
            return Err(StructuralError::invalid_path(to));
        };
        let inserted = self.insert_arc(&detached.tree, &parent, *index, moved)?;

        let mut effects = detached.effects;
        effects.extend(inserted.effects);
        Ok(Edited {
            tree: inserted.tree,
            effects,
        })
    }

    /// Move within one variadic parent. The slot is never left empty, so no
    /// placeholder is created even when the parent sits at its minimum arity.
    fn reorder(&mut self, tree: &Arc<AstNode>, from: &NodePath, to: &NodePath) -> StructuralResult<Edited> {
        let (Some(parent), Some(PathSegment::Child(from_index)), Some(PathSegment::Child(to_index))) =
            (from.parent(), from.last(), to.last())
        else {
            return Err(StructuralError::invalid_path(to));
        };
        let (from_index, to_index) = (*from_index, *to_index);
        let destination = to.shifted_after_removal(from);

        let tree = update_at(tree, parent.segments(), &parent, |target| {
            if to_index > target.children.len() {
                return Err(StructuralError::invalid_path(to));
            }
            let mut copy = AstNode::clone(target);
            let node = copy.children.remove(from_index);
            let insert_at = if to_index > from_index { to_index - 1 } else { to_index };
            copy.children.insert(insert_at, node);
            Ok(Arc::new(copy))
        })?;

        Ok(Edited {
            tree,
            effects: vec![
                PathEffect::Removed(from.clone()),
                PathEffect::Inserted(destination),
            ],
        })
    }
}

/// Shared handle to the node at `path`
pub fn resolve(tree: &Arc<AstNode>, path: &NodePath) -> Option<Arc<AstNode>> {
    let mut current = tree;
    for segment in path.segments() {
        current = current.child_at(segment)?;
    }
    Some(Arc::clone(current))
}

/// Rebuild the spine from `node` down `segments`, handing the addressed
/// node to `f` and splicing its result back in.
fn update_at<F>(
    node: &Arc<AstNode>,
    segments: &[PathSegment],
    full: &NodePath,
    f: F,
) -> StructuralResult<Arc<AstNode>>
where
    F: FnOnce(&Arc<AstNode>) -> StructuralResult<Arc<AstNode>>,
{
    match segments.split_first() {
        None => f(node),
        Some((segment, rest)) => {
            let child = node
                .child_at(segment)
                .ok_or_else(|| StructuralError::invalid_path(full))?;
            let updated = update_at(child, rest, full, f)?;
            let mut copy = AstNode::clone(node);
            copy.set_child(segment, updated);
            Ok(Arc::new(copy))
        }
    }
}
