//! # Mutations
//!
//! The edit commands a session accepts. Each one maps onto a persistent tree
//! operation and reports how it moved existing paths.

use marble_ast::{compose, AstNode, Edited, NestedCondition, NodePath, PathEffect, StructuralResult, TreeEditor};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Swap the subtree at `path`
    ReplaceNode { path: NodePath, node: AstNode },

    /// Insert `node` as the `index`-th child of `parent`
    InsertChild {
        parent: NodePath,
        index: usize,
        node: AstNode,
    },

    /// Remove a node, leaving a placeholder where an operand is required
    RemoveNode { path: NodePath },

    /// Move a node; `to` is the destination slot in the current tree
    MoveNode { from: NodePath, to: NodePath },

    /// Rebuild the root from an edited where/and/or list
    SetConditions { conditions: Vec<NestedCondition> },
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::ReplaceNode { .. } => "replace_node",
            Mutation::InsertChild { .. } => "insert_child",
            Mutation::RemoveNode { .. } => "remove_node",
            Mutation::MoveNode { .. } => "move_node",
            Mutation::SetConditions { .. } => "set_conditions",
        }
    }

    /// Apply to `tree`, returning the new root. `tree` is left untouched.
    pub fn apply(&self, editor: &mut TreeEditor, tree: &Arc<AstNode>) -> StructuralResult<Edited> {
        match self {
            Mutation::ReplaceNode { path, node } => editor.replace_node(tree, path, node),
            Mutation::InsertChild { parent, index, node } => editor.insert_child(tree, parent, *index, node),
            Mutation::RemoveNode { path } => editor.remove_node(tree, path),
            Mutation::MoveNode { from, to } => editor.move_node(tree, from, to),
            Mutation::SetConditions { conditions } => {
                let composed = compose(conditions, editor.ids_mut())?;
                // Conditions may come from outside the tree; give blank or
                // clashing ids fresh values.
                let root = editor.ids_mut().normalize(&composed);
                Ok(Edited {
                    tree: Arc::new(root),
                    effects: vec![PathEffect::Replaced(NodePath::root())],
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marble_ast::{decompose, FunctionRegistry, IdGenerator, LogicalOperator, Operator, StructuralError};

    fn editor() -> TreeEditor {
        TreeEditor::new(IdGenerator::from_seed("m".to_string()), Arc::new(FunctionRegistry::new()))
    }

    fn gt() -> AstNode {
        AstNode::binary(Operator::Gt, AstNode::field("transactions", "amount"), AstNode::number(1000.0))
    }

    #[test]
    fn test_remove_reports_effect() {
        let mut editor = editor();
        let tree = Arc::new(editor.adopt(&AstNode::and(vec![gt(), gt(), gt()])));

        let edited = Mutation::RemoveNode { path: NodePath::from(vec![1]) }
            .apply(&mut editor, &tree)
            .unwrap();

        assert_eq!(edited.tree.children.len(), 2);
        assert_eq!(edited.effects, vec![PathEffect::Removed(NodePath::from(vec![1]))]);
        assert_eq!(tree.children.len(), 3);
    }

    #[test]
    fn test_set_conditions_switches_joiner() {
        let mut editor = editor();
        let tree = Arc::new(editor.adopt(&AstNode::and(vec![gt(), gt()])));
        let conditions: Vec<NestedCondition> = decompose(&tree)
            .into_iter()
            .enumerate()
            .map(|(i, mut c)| {
                if i > 0 {
                    c.logical_operator = LogicalOperator::Or;
                }
                c
            })
            .collect();

        let edited = Mutation::SetConditions { conditions }.apply(&mut editor, &tree).unwrap();

        assert_eq!(edited.tree.as_operator(), Some(Operator::Or));
        assert_eq!(edited.tree.children[0].id, tree.children[0].id);
    }

    #[test]
    fn test_set_conditions_stamps_new_nodes() {
        let mut editor = editor();
        let tree = Arc::new(editor.adopt(&gt()));
        let conditions = vec![
            NestedCondition::new(LogicalOperator::Where, Arc::clone(&tree)),
            NestedCondition::new(LogicalOperator::And, Arc::new(gt())),
        ];

        let edited = Mutation::SetConditions { conditions }.apply(&mut editor, &tree).unwrap();

        let mut ids = Vec::new();
        edited.tree.walk(&mut |_, node| ids.push(node.id.clone()));
        assert!(ids.iter().all(|id| !id.is_empty()));
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_mixed_conditions_rejected() {
        let mut editor = editor();
        let tree = Arc::new(editor.adopt(&gt()));
        let conditions = vec![
            NestedCondition::new(LogicalOperator::Where, Arc::new(gt())),
            NestedCondition::new(LogicalOperator::And, Arc::new(gt())),
            NestedCondition::new(LogicalOperator::Or, Arc::new(gt())),
        ];

        let err = Mutation::SetConditions { conditions }.apply(&mut editor, &tree).unwrap_err();

        assert_eq!(err, StructuralError::MixedLogicalOperators);
    }
}
