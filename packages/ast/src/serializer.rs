//! Wire/storage format for rule trees.
//!
//! ```json
//! {
//!   "type": "operator", "operator": ">",
//!   "children": [
//!     { "type": "field", "table": "transactions", "field": "amount" },
//!     { "type": "constant", "value": 1000 }
//!   ]
//! }
//! ```
//!
//! Ids are optional on input; nodes without one get an id when a session
//! opens the tree.

use crate::ast::{AstNode, Constant, FieldRef, NodeKind, Operator};
use crate::error::SerializeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub body: SerializedBody,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SerializedNode>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub named_arguments: BTreeMap<String, SerializedNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SerializedBody {
    Operator { operator: Operator },
    Function { name: String },
    Field { table: String, field: String },
    Constant { value: Constant },
    Undefined,
}

/// Convert a tree to its wire form
pub fn to_serialized(node: &AstNode) -> SerializedNode {
    let body = match &node.kind {
        NodeKind::Operator(operator) => SerializedBody::Operator { operator: *operator },
        NodeKind::FunctionCall { name } => SerializedBody::Function { name: name.clone() },
        NodeKind::FieldAccessor(field) => SerializedBody::Field {
            table: field.table.clone(),
            field: field.field.clone(),
        },
        NodeKind::Constant(value) => SerializedBody::Constant { value: value.clone() },
        NodeKind::Undefined => SerializedBody::Undefined,
    };

    SerializedNode {
        id: (!node.id.is_empty()).then(|| node.id.clone()),
        body,
        children: node.children.iter().map(|c| to_serialized(c)).collect(),
        named_arguments: node
            .named_arguments
            .iter()
            .map(|(k, v)| (k.clone(), to_serialized(v)))
            .collect(),
    }
}

/// Rebuild a tree from its wire form. Missing ids stay blank.
pub fn from_serialized(node: &SerializedNode) -> AstNode {
    let kind = match &node.body {
        SerializedBody::Operator { operator } => NodeKind::Operator(*operator),
        SerializedBody::Function { name } => NodeKind::FunctionCall { name: name.clone() },
        SerializedBody::Field { table, field } => NodeKind::FieldAccessor(FieldRef::new(table, field)),
        SerializedBody::Constant { value } => NodeKind::Constant(value.clone()),
        SerializedBody::Undefined => NodeKind::Undefined,
    };

    AstNode {
        id: node.id.clone().unwrap_or_default(),
        kind,
        children: node
            .children
            .iter()
            .map(|c| Arc::new(from_serialized(c)))
            .collect(),
        named_arguments: node
            .named_arguments
            .iter()
            .map(|(k, v)| (k.clone(), Arc::new(from_serialized(v))))
            .collect(),
    }
}

pub fn to_json(node: &AstNode) -> Result<String, SerializeError> {
    Ok(serde_json::to_string(&to_serialized(node))?)
}

pub fn to_json_pretty(node: &AstNode) -> Result<String, SerializeError> {
    Ok(serde_json::to_string_pretty(&to_serialized(node))?)
}

pub fn from_json(json: &str) -> Result<AstNode, SerializeError> {
    let serialized: SerializedNode = serde_json::from_str(json)?;
    Ok(from_serialized(&serialized))
}
