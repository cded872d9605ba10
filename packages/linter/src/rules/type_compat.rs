use crate::diagnostic::{codes, ValidationIssue};
use crate::rules::{LintContext, LintRule};
use crate::types::{equatable, orderable};
use marble_ast::{AstNode, DataType, NodePath, Operator, OperatorClass};

/// Operand types must fit the operator: comparable comparisons,
/// boolean logic and numeric arithmetic. Unknown types are skipped.
pub struct TypeCompatibilityRule;

impl LintRule for TypeCompatibilityRule {
    fn name(&self) -> &'static str {
        "type-compatibility"
    }

    fn description(&self) -> &'static str {
        "Operands must have types the operator accepts"
    }

    fn check_node(&self, node: &AstNode, path: &NodePath, ctx: &LintContext<'_>) -> Vec<ValidationIssue> {
        let Some(op) = node.as_operator() else {
            return Vec::new();
        };
        let types: Vec<Option<DataType>> = node.children.iter().map(|c| ctx.infer(c)).collect();

        match op.class() {
            OperatorClass::Comparison => match types.as_slice() {
                [Some(left), Some(right)] => {
                    let compatible = if op.is_ordering() {
                        orderable(*left, *right)
                    } else {
                        equatable(*left, *right)
                    };
                    if compatible {
                        Vec::new()
                    } else {
                        vec![ValidationIssue::error(
                            codes::TYPE_MISMATCH,
                            format!("cannot compare {:?} {} {:?}", left, op.symbol(), right),
                            path.clone(),
                        )
                        .with_suggestion("convert one side with ToFloat or ToString")]
                    }
                }
                _ => Vec::new(),
            },
            OperatorClass::Logical => operand_errors(op, &types, path, "Bool", |ty| ty == DataType::Bool),
            OperatorClass::Arithmetic => operand_errors(op, &types, path, "numeric", |ty| ty.is_numeric()),
        }
    }
}

fn operand_errors(
    op: Operator,
    types: &[Option<DataType>],
    path: &NodePath,
    expected: &str,
    accepts: impl Fn(DataType) -> bool,
) -> Vec<ValidationIssue> {
    types
        .iter()
        .enumerate()
        .filter_map(|(index, ty)| {
            let ty = (*ty)?;
            (!accepts(ty)).then(|| {
                ValidationIssue::error(
                    codes::TYPE_MISMATCH,
                    format!(
                        "operand {} of {} is {:?}, expected {}",
                        index + 1,
                        op.symbol(),
                        ty,
                        expected
                    ),
                    path.clone(),
                )
            })
        })
        .collect()
}
