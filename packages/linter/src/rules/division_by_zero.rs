use crate::diagnostic::{codes, ValidationIssue};
use crate::rules::{LintContext, LintRule};
use marble_ast::{AstNode, NodeKind, NodePath, Operator};

/// Literal zero divisors. Divisors that are only zero at runtime are not detected.
pub struct DivisionByZeroRule;

impl LintRule for DivisionByZeroRule {
    fn name(&self) -> &'static str {
        "division-by-zero"
    }

    fn description(&self) -> &'static str {
        "Disallow dividing by the constant 0"
    }

    fn check_node(&self, node: &AstNode, path: &NodePath, _ctx: &LintContext<'_>) -> Vec<ValidationIssue> {
        if node.as_operator() != Some(Operator::Div) {
            return Vec::new();
        }
        match node.children.get(1).map(|divisor| &divisor.kind) {
            Some(NodeKind::Constant(value)) if value.is_zero() => vec![ValidationIssue::error(
                codes::DIVISION_BY_ZERO,
                "division by zero",
                path.clone(),
            )],
            _ => Vec::new(),
        }
    }
}
