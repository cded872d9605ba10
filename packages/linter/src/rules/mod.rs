mod arity;
mod division_by_zero;
mod double_negation;
mod field_resolution;
mod incomplete;
mod type_compat;

pub use arity::ArityRule;
pub use division_by_zero::DivisionByZeroRule;
pub use double_negation::DoubleNegationRule;
pub use field_resolution::FieldResolutionRule;
pub use incomplete::IncompleteExpressionRule;
pub use type_compat::TypeCompatibilityRule;

use crate::diagnostic::ValidationIssue;
use crate::types::infer_type;
use marble_ast::{AstNode, DataModel, DataType, FunctionRegistry, NodePath};

/// What a rule can see besides the node under inspection
#[derive(Debug, Clone, Copy)]
pub struct LintContext<'a> {
    pub schema: &'a DataModel,
    pub functions: &'a FunctionRegistry,
}

impl<'a> LintContext<'a> {
    pub fn new(schema: &'a DataModel, functions: &'a FunctionRegistry) -> Self {
        Self { schema, functions }
    }

    pub fn infer(&self, node: &AstNode) -> Option<DataType> {
        infer_type(node, self.schema, self.functions)
    }
}

/// Trait for implementing lint rules
pub trait LintRule: Send + Sync {
    /// Unique identifier for this rule
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Check one node. Called once per node, in pre-order.
    fn check_node(&self, node: &AstNode, path: &NodePath, ctx: &LintContext<'_>) -> Vec<ValidationIssue>;
}

/// Registry of all available lint rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn LintRule>>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(ArityRule),
                Box::new(IncompleteExpressionRule),
                Box::new(FieldResolutionRule),
                Box::new(TypeCompatibilityRule),
                Box::new(DivisionByZeroRule),
                Box::new(DoubleNegationRule),
            ],
        }
    }

    /// Get all registered rules
    pub fn rules(&self) -> &[Box<dyn LintRule>] {
        &self.rules
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a custom rule to the registry
    pub fn add_rule(&mut self, rule: Box<dyn LintRule>) {
        self.rules.push(rule);
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.rules.iter().map(|r| r.name()).collect();
        f.debug_struct("RuleRegistry").field("rules", &names).finish()
    }
}
