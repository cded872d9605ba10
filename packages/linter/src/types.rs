use marble_ast::{AstNode, Constant, DataModel, DataType, FunctionRegistry, NodeKind, OperatorClass};

/// Static type of `node`, looking only at the node itself.
///
/// `None` means "unknown" (placeholders, unresolved fields, unknown
/// functions, list literals); unknown types never produce type errors.
pub fn infer_type(node: &AstNode, schema: &DataModel, functions: &FunctionRegistry) -> Option<DataType> {
    match &node.kind {
        NodeKind::Operator(op) => match op.class() {
            OperatorClass::Logical | OperatorClass::Comparison => Some(DataType::Bool),
            OperatorClass::Arithmetic => Some(DataType::Float),
        },
        NodeKind::FunctionCall { name } => functions.get(name).and_then(|sig| sig.return_type),
        NodeKind::FieldAccessor(field) => schema.resolve(field).ok(),
        NodeKind::Constant(value) => match value {
            Constant::Bool(_) => Some(DataType::Bool),
            Constant::Number(_) => Some(DataType::Float),
            Constant::String(_) => Some(DataType::String),
            Constant::List(_) => None,
        },
        NodeKind::Undefined => None,
    }
}

/// Whether values of the two types may be compared with `=`/`≠`
pub(crate) fn equatable(left: DataType, right: DataType) -> bool {
    left == right || (left.is_numeric() && right.is_numeric())
}

/// Whether values of the two types may be compared with `<`, `≤`, `>`, `≥`
pub(crate) fn orderable(left: DataType, right: DataType) -> bool {
    match (left, right) {
        (l, r) if l.is_numeric() && r.is_numeric() => true,
        (DataType::Timestamp, DataType::Timestamp) | (DataType::String, DataType::String) => true,
        _ => false,
    }
}
