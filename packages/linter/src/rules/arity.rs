use crate::diagnostic::{codes, ValidationIssue};
use crate::rules::{LintContext, LintRule};
use crate::suggest::closest;
use marble_ast::{Arity, AstNode, NodeKind, NodePath};

/// Operand counts and named arguments against operator and function signatures
pub struct ArityRule;

impl LintRule for ArityRule {
    fn name(&self) -> &'static str {
        "arity"
    }

    fn description(&self) -> &'static str {
        "Operators and functions must receive the operands they declare"
    }

    fn check_node(&self, node: &AstNode, path: &NodePath, ctx: &LintContext<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        match &node.kind {
            NodeKind::FunctionCall { name } => {
                let Some(signature) = ctx.functions.get(name) else {
                    let mut issue = ValidationIssue::error(
                        codes::UNKNOWN_FUNCTION,
                        format!("unknown function '{}'", name),
                        path.clone(),
                    );
                    if let Some(similar) = closest(name, ctx.functions.names()) {
                        issue = issue.with_suggestion(format!("did you mean '{}'?", similar));
                    }
                    issues.push(issue);
                    return issues;
                };

                if !signature.arity.accepts(node.children.len()) {
                    issues.push(mismatch(name, signature.arity, node.children.len(), path));
                }
                for parameter in &signature.named_parameters {
                    if !node.named_arguments.contains_key(parameter) {
                        issues.push(ValidationIssue::error(
                            codes::MISSING_NAMED_ARGUMENT,
                            format!("{} requires argument '{}'", name, parameter),
                            path.clone(),
                        ));
                    }
                }
                for argument in node.named_arguments.keys() {
                    if !signature.has_named_parameter(argument) {
                        issues.push(unexpected_argument(name, argument, path));
                    }
                }
            }
            _ => {
                let label = match &node.kind {
                    NodeKind::Operator(op) => op.symbol(),
                    NodeKind::FieldAccessor(_) => "field",
                    NodeKind::Constant(_) => "constant",
                    _ => "placeholder",
                };
                if let Some(arity) = node.arity(ctx.functions) {
                    if !arity.accepts(node.children.len()) {
                        issues.push(mismatch(label, arity, node.children.len(), path));
                    }
                }
                for argument in node.named_arguments.keys() {
                    issues.push(unexpected_argument(label, argument, path));
                }
            }
        }

        issues
    }
}

fn mismatch(label: &str, arity: Arity, found: usize, path: &NodePath) -> ValidationIssue {
    ValidationIssue::error(
        codes::ARITY_MISMATCH,
        format!("'{}' expects {} operand(s), found {}", label, arity, found),
        path.clone(),
    )
}

fn unexpected_argument(label: &str, argument: &str, path: &NodePath) -> ValidationIssue {
    ValidationIssue::error(
        codes::UNEXPECTED_NAMED_ARGUMENT,
        format!("'{}' does not take argument '{}'", label, argument),
        path.clone(),
    )
}
