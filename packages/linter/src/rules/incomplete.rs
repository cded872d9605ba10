use crate::diagnostic::{codes, ValidationIssue};
use crate::rules::{LintContext, LintRule};
use marble_ast::{AstNode, NodePath};

/// Placeholders left behind by edits must be filled before saving
pub struct IncompleteExpressionRule;

impl LintRule for IncompleteExpressionRule {
    fn name(&self) -> &'static str {
        "incomplete-expression"
    }

    fn description(&self) -> &'static str {
        "Disallow unfilled placeholders"
    }

    fn check_node(&self, node: &AstNode, path: &NodePath, _ctx: &LintContext<'_>) -> Vec<ValidationIssue> {
        if node.is_undefined() {
            vec![ValidationIssue::error(
                codes::INCOMPLETE_EXPRESSION,
                "incomplete expression",
                path.clone(),
            )]
        } else {
            Vec::new()
        }
    }
}
