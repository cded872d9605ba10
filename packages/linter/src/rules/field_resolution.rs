use crate::diagnostic::{codes, ValidationIssue};
use crate::rules::{LintContext, LintRule};
use crate::suggest::closest;
use marble_ast::{AstNode, NodeKind, NodePath, Unresolved};

/// Field accessors must name a table and field of the data model
pub struct FieldResolutionRule;

impl LintRule for FieldResolutionRule {
    fn name(&self) -> &'static str {
        "field-resolution"
    }

    fn description(&self) -> &'static str {
        "Field accessors must resolve against the data model"
    }

    fn check_node(&self, node: &AstNode, path: &NodePath, ctx: &LintContext<'_>) -> Vec<ValidationIssue> {
        let NodeKind::FieldAccessor(field) = &node.kind else {
            return Vec::new();
        };

        let issue = match ctx.schema.resolve(field) {
            Ok(_) => return Vec::new(),
            Err(Unresolved::Table) => {
                let issue = ValidationIssue::error(
                    codes::UNKNOWN_TABLE,
                    format!("unknown table '{}'", field.table),
                    path.clone(),
                );
                match closest(&field.table, ctx.schema.tables.keys().map(String::as_str)) {
                    Some(table) => issue.with_suggestion(format!("did you mean '{}'?", table)),
                    None => issue,
                }
            }
            Err(Unresolved::Field) => {
                let issue = ValidationIssue::error(
                    codes::UNKNOWN_FIELD,
                    format!("table '{}' has no field '{}'", field.table, field.field),
                    path.clone(),
                );
                let similar = ctx
                    .schema
                    .table(&field.table)
                    .and_then(|table| closest(&field.field, table.fields.keys().map(String::as_str)));
                match similar {
                    Some(name) => issue.with_suggestion(format!("did you mean '{}.{}'?", field.table, name)),
                    None => issue,
                }
            }
        };

        vec![issue]
    }
}
