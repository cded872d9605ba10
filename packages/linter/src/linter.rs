use crate::diagnostic::ValidationIssue;
use crate::rules::{LintContext, RuleRegistry};
use marble_ast::{AstNode, DataModel, FunctionRegistry, NodeKind};
use std::sync::Arc;

/// Options for configuring the validator
#[derive(Debug, Default)]
pub struct LintOptions {
    /// Rules to run (all built-ins by default)
    pub registry: RuleRegistry,

    /// Functions calls are checked against
    pub functions: Arc<FunctionRegistry>,
}

impl LintOptions {
    pub fn with_functions(functions: Arc<FunctionRegistry>) -> Self {
        Self {
            registry: RuleRegistry::new(),
            functions,
        }
    }
}

/// Validate a tree with the built-in rules and functions
pub fn validate_local(tree: &AstNode, schema: &DataModel) -> Vec<ValidationIssue> {
    validate_with(tree, schema, &LintOptions::default())
}

/// Validate a tree in one depth-first pass, issues in pre-order
pub fn validate_with(tree: &AstNode, schema: &DataModel, options: &LintOptions) -> Vec<ValidationIssue> {
    let ctx = LintContext::new(schema, &options.functions);
    let mut issues = Vec::new();

    tree.walk(&mut |path, node| {
        for rule in options.registry.rules() {
            issues.extend(rule.check_node(node, path, &ctx));
        }
    });

    issues
}

/// Every node has a valid arity and every field accessor resolves
pub fn is_well_formed(tree: &AstNode, schema: &DataModel, functions: &FunctionRegistry) -> bool {
    let mut fields_resolve = true;
    tree.walk(&mut |_, node| {
        if let NodeKind::FieldAccessor(field) = &node.kind {
            fields_resolve &= schema.resolve(field).is_ok();
        }
    });
    fields_resolve && tree.has_valid_arity(functions)
}

pub fn error_count(issues: &[ValidationIssue]) -> usize {
    issues.iter().filter(|issue| issue.is_error()).count()
}
