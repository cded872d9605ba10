use crate::diagnostic::{codes, ValidationIssue};
use crate::rules::{LintContext, LintRule};
use marble_ast::{AstNode, NodePath, Operator};

pub struct DoubleNegationRule;

impl LintRule for DoubleNegationRule {
    fn name(&self) -> &'static str {
        "redundant-double-negation"
    }

    fn description(&self) -> &'static str {
        "Warn about NOT NOT x"
    }

    fn check_node(&self, node: &AstNode, path: &NodePath, _ctx: &LintContext<'_>) -> Vec<ValidationIssue> {
        let doubled = node.as_operator() == Some(Operator::Not)
            && node
                .children
                .first()
                .is_some_and(|inner| inner.as_operator() == Some(Operator::Not));

        if doubled {
            vec![ValidationIssue::warning(
                codes::REDUNDANT_DOUBLE_NEGATION,
                "NOT NOT is redundant",
                path.clone(),
            )
            .with_suggestion("remove both negations")]
        } else {
            Vec::new()
        }
    }
}
