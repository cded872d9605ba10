//! Local validation of rule trees.
//!
//! Synchronous, single-pass checks that only need the tree, the data model
//! and the function registry.

mod diagnostic;
mod linter;
mod rules;
mod suggest;
mod types;

pub use diagnostic::{codes, Severity, ValidationIssue};
pub use linter::{error_count, is_well_formed, validate_local, validate_with, LintOptions};
pub use rules::{LintContext, LintRule, RuleRegistry};
pub use types::infer_type;
