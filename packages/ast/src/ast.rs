use crate::functions::FunctionRegistry;
use crate::path::{NodePath, PathSegment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Identifier of a node, unique within one editing session.
///
/// Nodes built with the constructors below carry an empty id until an
/// [`IdGenerator`](crate::IdGenerator) stamps them.
pub type NodeId = String;

/// A rule expression node.
///
/// Children sit behind `Arc` so an edit only copies the spine from the root
/// down to the edited node; every other subtree is shared with the previous
/// tree, which therefore stays valid for undo.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub children: Vec<Arc<AstNode>>,
    pub named_arguments: BTreeMap<String, Arc<AstNode>>,
}

/// Closed set of node kinds
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Operator(Operator),
    FunctionCall { name: String },
    FieldAccessor(FieldRef),
    Constant(Constant),
    /// Placeholder for an incomplete edit
    Undefined,
}

/// Built-in operators. Serialized with ASCII symbols; `symbol` gives the display form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "And")]
    And,
    #[serde(rename = "Or")]
    Or,
    #[serde(rename = "Not")]
    Not,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    Logical,
    Comparison,
    Arithmetic,
}

impl Operator {
    pub const ALL: [Operator; 13] = [
        Operator::And,
        Operator::Or,
        Operator::Not,
        Operator::Eq,
        Operator::NotEq,
        Operator::Lt,
        Operator::Lte,
        Operator::Gt,
        Operator::Gte,
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
    ];

    pub fn class(&self) -> OperatorClass {
        match self {
            Operator::And | Operator::Or | Operator::Not => OperatorClass::Logical,
            Operator::Eq
            | Operator::NotEq
            | Operator::Lt
            | Operator::Lte
            | Operator::Gt
            | Operator::Gte => OperatorClass::Comparison,
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div => {
                OperatorClass::Arithmetic
            }
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Operator::And | Operator::Or => Arity::AtLeast(2),
            Operator::Not => Arity::Fixed(1),
            _ => Arity::Fixed(2),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
            Operator::Eq => "=",
            Operator::NotEq => "≠",
            Operator::Lt => "<",
            Operator::Lte => "≤",
            Operator::Gt => ">",
            Operator::Gte => "≥",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "×",
            Operator::Div => "÷",
        }
    }

    /// Ordering comparisons (`<`, `≤`, `>`, `≥`)
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte
        )
    }
}

/// Operand count accepted by an operator or function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arity {
    Fixed(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Fixed(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }

    pub fn min(&self) -> usize {
        match *self {
            Arity::Fixed(n) | Arity::AtLeast(n) => n,
        }
    }

    pub fn max(&self) -> Option<usize> {
        match *self {
            Arity::Fixed(n) => Some(n),
            Arity::AtLeast(_) => None,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// Reference to `table.field` in the data model
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub table: String,
    pub field: String,
}

impl FieldRef {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.field)
    }
}

/// Typed literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constant {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Constant>),
}

impl Constant {
    pub fn is_zero(&self) -> bool {
        matches!(self, Constant::Number(n) if *n == 0.0)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Number(n) => write!(f, "{}", n),
            Constant::String(s) => write!(f, "{:?}", s),
            Constant::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl AstNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            children: Vec::new(),
            named_arguments: BTreeMap::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<AstNode>) -> Self {
        Self {
            children: children.into_iter().map(Arc::new).collect(),
            ..Self::new(kind)
        }
    }

    pub fn operator(op: Operator, children: Vec<AstNode>) -> Self {
        Self::with_children(NodeKind::Operator(op), children)
    }

    pub fn and(children: Vec<AstNode>) -> Self {
        Self::operator(Operator::And, children)
    }

    pub fn or(children: Vec<AstNode>) -> Self {
        Self::operator(Operator::Or, children)
    }

    pub fn not(operand: AstNode) -> Self {
        Self::operator(Operator::Not, vec![operand])
    }

    pub fn binary(op: Operator, left: AstNode, right: AstNode) -> Self {
        Self::operator(op, vec![left, right])
    }

    pub fn function(name: impl Into<String>, children: Vec<AstNode>) -> Self {
        Self::with_children(NodeKind::FunctionCall { name: name.into() }, children)
    }

    pub fn with_named_argument(mut self, name: impl Into<String>, value: AstNode) -> Self {
        self.named_arguments.insert(name.into(), Arc::new(value));
        self
    }

    pub fn field(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(NodeKind::FieldAccessor(FieldRef::new(table, field)))
    }

    pub fn constant(value: Constant) -> Self {
        Self::new(NodeKind::Constant(value))
    }

    pub fn number(value: f64) -> Self {
        Self::constant(Constant::Number(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::constant(Constant::String(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Self::constant(Constant::Bool(value))
    }

    pub fn undefined() -> Self {
        Self::new(NodeKind::Undefined)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self.kind, NodeKind::Undefined)
    }

    pub fn as_operator(&self) -> Option<Operator> {
        match self.kind {
            NodeKind::Operator(op) => Some(op),
            _ => None,
        }
    }

    /// Declared arity of this node. `None` for calls to unregistered functions.
    pub fn arity(&self, functions: &FunctionRegistry) -> Option<Arity> {
        match &self.kind {
            NodeKind::Operator(op) => Some(op.arity()),
            NodeKind::FunctionCall { name } => functions.get(name).map(|sig| sig.arity),
            NodeKind::FieldAccessor(_) | NodeKind::Constant(_) | NodeKind::Undefined => {
                Some(Arity::Fixed(0))
            }
        }
    }

    /// True when every node's positional child count matches its declared arity.
    /// Unregistered functions are not judged here; the validator reports them.
    pub fn has_valid_arity(&self, functions: &FunctionRegistry) -> bool {
        let own = self
            .arity(functions)
            .map_or(true, |arity| arity.accepts(self.children.len()));
        own && self.children.iter().all(|c| c.has_valid_arity(functions))
            && self
                .named_arguments
                .values()
                .all(|c| c.has_valid_arity(functions))
    }

    pub fn child_at(&self, segment: &PathSegment) -> Option<&Arc<AstNode>> {
        match segment {
            PathSegment::Child(index) => self.children.get(*index),
            PathSegment::Named(name) => self.named_arguments.get(name),
        }
    }

    pub(crate) fn set_child(&mut self, segment: &PathSegment, node: Arc<AstNode>) {
        match segment {
            PathSegment::Child(index) => self.children[*index] = node,
            PathSegment::Named(name) => {
                self.named_arguments.insert(name.clone(), node);
            }
        }
    }

    /// Resolve a path relative to this node
    pub fn get(&self, path: &NodePath) -> Option<&AstNode> {
        let mut current = self;
        for segment in path.segments() {
            current = current.child_at(segment)?;
        }
        Some(current)
    }

    /// Depth-first pre-order visit with each node's path.
    /// Positional children are visited before named arguments.
    pub fn walk<F>(&self, visit: &mut F)
    where
        F: FnMut(&NodePath, &AstNode),
    {
        self.walk_from(&NodePath::root(), visit);
    }

    fn walk_from<F>(&self, path: &NodePath, visit: &mut F)
    where
        F: FnMut(&NodePath, &AstNode),
    {
        visit(path, self);
        for (index, child) in self.children.iter().enumerate() {
            child.walk_from(&path.child(index), visit);
        }
        for (name, child) in &self.named_arguments {
            child.walk_from(&path.named(name.clone()), visit);
        }
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_, _| count += 1);
        count
    }

    /// Path of the node carrying `id`, if any
    pub fn find_path(&self, id: &str) -> Option<NodePath> {
        let mut found = None;
        self.walk(&mut |path, node| {
            if found.is_none() && node.id == id {
                found = Some(path.clone());
            }
        });
        found
    }

    /// Structural equality ignoring node ids
    pub fn same_shape(&self, other: &AstNode) -> bool {
        self.kind == other.kind
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_shape(b))
            && self.named_arguments.len() == other.named_arguments.len()
            && self
                .named_arguments
                .iter()
                .zip(&other.named_arguments)
                .all(|((ka, a), (kb, b))| ka == kb && a.same_shape(b))
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Operator(Operator::Not) => match self.children.first() {
                Some(operand) => write!(f, "NOT {}", Parenthesized(operand)),
                None => write!(f, "NOT ?"),
            },
            NodeKind::Operator(op) if self.children.len() < 2 => {
                write!(f, "{}(", op.symbol())?;
                if let Some(only) = self.children.first() {
                    write!(f, "{}", only)?;
                }
                write!(f, ")")
            }
            NodeKind::Operator(op) => {
                for (i, child) in self.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", op.symbol())?;
                    }
                    write!(f, "{}", Parenthesized(child))?;
                }
                Ok(())
            }
            NodeKind::FunctionCall { name } => {
                write!(f, "{}(", name)?;
                let mut first = true;
                for child in &self.children {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{}", child)?;
                }
                for (key, value) in &self.named_arguments {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, ")")
            }
            NodeKind::FieldAccessor(field) => write!(f, "{}", field),
            NodeKind::Constant(value) => write!(f, "{}", value),
            NodeKind::Undefined => write!(f, "?"),
        }
    }
}

/// Wraps infix operator nodes in parentheses when nested
struct Parenthesized<'a>(&'a AstNode);

impl fmt::Display for Parenthesized<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_operator() {
            Some(op) if op != Operator::Not && self.0.children.len() >= 2 => {
                write!(f, "({})", self.0)
            }
            _ => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount_over(limit: f64) -> AstNode {
        AstNode::binary(
            Operator::Gt,
            AstNode::field("transactions", "amount"),
            AstNode::number(limit),
        )
    }

    #[test]
    fn test_operator_arity() {
        assert_eq!(Operator::And.arity(), Arity::AtLeast(2));
        assert_eq!(Operator::Not.arity(), Arity::Fixed(1));
        assert_eq!(Operator::Div.arity(), Arity::Fixed(2));
        assert!(Arity::AtLeast(2).accepts(5));
        assert!(!Arity::Fixed(2).accepts(1));
    }

    #[test]
    fn test_get_by_path() {
        let tree = AstNode::and(vec![amount_over(1000.0), AstNode::undefined()]);

        let field = tree.get(&NodePath::from_indices(&[0, 0])).unwrap();
        assert!(matches!(field.kind, NodeKind::FieldAccessor(_)));
        assert!(tree.get(&NodePath::from_indices(&[1])).unwrap().is_undefined());
        assert!(tree.get(&NodePath::from_indices(&[2])).is_none());
    }

    #[test]
    fn test_walk_visits_named_arguments() {
        let call = AstNode::function("Aggregator", vec![])
            .with_named_argument("tableName", AstNode::string("transactions"));

        let mut paths = Vec::new();
        call.walk(&mut |path, _| paths.push(path.to_string()));

        assert_eq!(paths, vec!["$", "$.@tableName"]);
    }

    #[test]
    fn test_same_shape_ignores_ids() {
        let mut a = amount_over(10.0);
        let b = amount_over(10.0);
        a.id = "x-1".to_string();

        assert!(a.same_shape(&b));
        assert_ne!(a, b);
        assert!(!a.same_shape(&amount_over(11.0)));
    }

    #[test]
    fn test_display() {
        let tree = AstNode::and(vec![
            amount_over(1000.0),
            AstNode::binary(
                Operator::Eq,
                AstNode::field("transactions", "country"),
                AstNode::string("FR"),
            ),
        ]);

        assert_eq!(
            tree.to_string(),
            "(transactions.amount > 1000) AND (transactions.country = \"FR\")"
        );
    }
}
