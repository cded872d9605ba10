//! Nested conditions: the flat "where / and / or" view of a rule.
//!
//! Only an AND or OR at the root is flattened, and only when it has at least
//! two operands. Anything below the root (including an OR nested under an
//! AND) stays an opaque condition.

use crate::ast::{AstNode, NodeKind, Operator};
use crate::error::{StructuralError, StructuralResult};
use crate::id_generator::IdGenerator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    Where,
    And,
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogicalOperator::Where => "where",
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        };
        f.write_str(label)
    }
}

/// One line of the flattened view
#[derive(Debug, Clone, PartialEq)]
pub struct NestedCondition {
    pub logical_operator: LogicalOperator,
    pub condition: Arc<AstNode>,
}

impl NestedCondition {
    pub fn new(logical_operator: LogicalOperator, condition: Arc<AstNode>) -> Self {
        Self {
            logical_operator,
            condition,
        }
    }
}

/// Flatten an AND/OR root into ordered conditions
pub fn decompose(tree: &Arc<AstNode>) -> Vec<NestedCondition> {
    let joiner = match tree.kind {
        NodeKind::Operator(Operator::And) if tree.children.len() >= 2 => LogicalOperator::And,
        NodeKind::Operator(Operator::Or) if tree.children.len() >= 2 => LogicalOperator::Or,
        // AND/OR with fewer than two operands stays one opaque condition
        _ => return vec![NestedCondition::new(LogicalOperator::Where, Arc::clone(tree))],
    };

    tree.children
        .iter()
        .enumerate()
        .map(|(index, child)| {
            let label = if index == 0 { LogicalOperator::Where } else { joiner };
            NestedCondition::new(label, Arc::clone(child))
        })
        .collect()
}

/// Rebuild a tree from flattened conditions.
///
/// A single `where` condition becomes the root itself. Longer lists must use
/// one joiner throughout; the new AND/OR root gets a fresh id while the
/// conditions keep theirs.
pub fn compose(conditions: &[NestedCondition], ids: &mut IdGenerator) -> StructuralResult<Arc<AstNode>> {
    let (first, rest) = conditions
        .split_first()
        .ok_or(StructuralError::EmptyConditions)?;
    if first.logical_operator != LogicalOperator::Where {
        return Err(invalid_label(0, first.logical_operator));
    }
    if rest.is_empty() {
        return Ok(Arc::clone(&first.condition));
    }

    let mut joiner = None;
    for (offset, condition) in rest.iter().enumerate() {
        match (condition.logical_operator, joiner) {
            (LogicalOperator::Where, _) => return Err(invalid_label(offset + 1, LogicalOperator::Where)),
            (label, None) => joiner = Some(label),
            (label, Some(seen)) if label != seen => return Err(StructuralError::MixedLogicalOperators),
            _ => {}
        }
    }

    let operator = match joiner {
        Some(LogicalOperator::Or) => Operator::Or,
        _ => Operator::And,
    };
    let mut root = AstNode::new(NodeKind::Operator(operator));
    root.id = ids.new_id();
    root.children = conditions.iter().map(|c| Arc::clone(&c.condition)).collect();
    Ok(Arc::new(root))
}

fn invalid_label(index: usize, label: LogicalOperator) -> StructuralError {
    StructuralError::InvalidConditionLabel {
        index,
        label: label.to_string(),
    }
}
