use super::{load_data_model, load_iteration};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use marble_ast::{DataModel, EditTarget, ScenarioIteration};
use marble_editor::{EditorConfig, EditorSession};
use marble_linter::{Severity, ValidationIssue};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Scenario iteration JSON file
    pub input: PathBuf,

    /// Data model JSON (defaults to the configured one)
    #[arg(short, long)]
    pub data_model: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Issues found on one expression of the iteration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetReport {
    target: EditTarget,
    expression: String,
    issues: Vec<ValidationIssue>,
}

impl TargetReport {
    fn errors(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }
}

pub fn validate(args: ValidateArgs, cwd: &Path) -> Result<()> {
    if args.format != "text" && args.format != "json" {
        return Err(anyhow!("Invalid format: {}. Use: text or json", args.format));
    }

    let config = Config::load(cwd)?;
    let schema = load_data_model(&config.data_model_path(cwd, args.data_model.as_deref()))?;
    let iteration = load_iteration(&cwd.join(&args.input))?;

    let reports = check_iteration(&iteration, &schema, &config.editor)?;
    let errors: usize = reports.iter().map(TargetReport::errors).sum();

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_reports(&args.input, &reports);
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn check_iteration(
    iteration: &ScenarioIteration,
    schema: &Arc<DataModel>,
    editor: &EditorConfig,
) -> Result<Vec<TargetReport>> {
    iteration
        .targets()
        .into_iter()
        .map(|target| -> Result<TargetReport> {
            let session = EditorSession::open(iteration, target.clone(), Arc::clone(schema), editor.clone())?;
            Ok(TargetReport {
                target,
                expression: session.tree().to_string(),
                issues: session.local_issues().to_vec(),
            })
        })
        .collect()
}

fn print_reports(input: &Path, reports: &[TargetReport]) {
    println!("🔍 {} {}", "Validating".green().bold(), input.display());
    println!();

    let mut errors = 0;
    let mut warnings = 0;

    for report in reports {
        let marker = if report.errors() > 0 { "✗".red() } else { "✓".green() };
        println!("{} {}  {}", marker, report.target.to_string().bold(), report.expression.dimmed());

        for issue in &report.issues {
            let level = match issue.severity {
                Severity::Error => {
                    errors += 1;
                    "error".red().bold()
                }
                Severity::Warning => {
                    warnings += 1;
                    "warning".yellow().bold()
                }
            };
            println!("    {} {} [{}] {}", issue.node_path, level, issue.code, issue.message);

            if let Some(suggestion) = &issue.suggestion {
                println!("      {} {}", "💡".dimmed(), suggestion.dimmed());
            }
        }
    }

    println!();
    println!("   Expressions checked: {}", reports.len());
    if errors > 0 {
        println!("   {} {}", "Errors:".red(), errors);
    }
    if warnings > 0 {
        println!("   {} {}", "Warnings:".yellow(), warnings);
    }
    if errors == 0 && warnings == 0 {
        println!("   {} No issues found!", "✓".green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marble_ast::DataType;
    use marble_linter::codes;

    const ITERATION: &str = r#"{
        "scenarioId": "sc-1",
        "iterationId": "it-1",
        "triggerCondition": {
            "type": "operator",
            "operator": "And",
            "children": [
                {
                    "type": "operator",
                    "operator": ">",
                    "children": [
                        { "type": "field", "table": "transactions", "field": "amount" },
                        { "type": "constant", "value": 1000 }
                    ]
                },
                { "type": "undefined" }
            ]
        },
        "rules": [
            {
                "id": "r1",
                "name": "French merchant",
                "scoreModifier": 20,
                "formula": {
                    "type": "operator",
                    "operator": "=",
                    "children": [
                        { "type": "field", "table": "transactions", "field": "country" },
                        { "type": "constant", "value": "FR" }
                    ]
                }
            },
            { "id": "r2", "name": "Empty", "scoreModifier": 5 }
        ]
    }"#;

    fn schema() -> Arc<DataModel> {
        Arc::new(DataModel::new().with_table(
            "transactions",
            &[("amount", DataType::Float), ("country", DataType::String)],
        ))
    }

    #[test]
    fn test_reports_every_target() {
        let iteration = ScenarioIteration::from_json(ITERATION).unwrap();

        let reports = check_iteration(&iteration, &schema(), &EditorConfig::default()).unwrap();

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].target, EditTarget::Trigger);
        assert_eq!(reports[0].expression, "(transactions.amount > 1000) AND ?");
        assert_eq!(reports[0].errors(), 1);
        assert_eq!(reports[0].issues[0].code, codes::INCOMPLETE_EXPRESSION);
        assert_eq!(reports[1].errors(), 0);
        assert_eq!(reports[2].expression, "?");
        assert_eq!(reports[2].errors(), 1);
    }

    #[test]
    fn test_report_json_shape() {
        let iteration = ScenarioIteration::from_json(ITERATION).unwrap();
        let reports = check_iteration(&iteration, &schema(), &EditorConfig::default()).unwrap();

        let json = serde_json::to_value(&reports[1]).unwrap();

        assert_eq!(json["target"]["kind"], "rule");
        assert_eq!(json["target"]["ruleId"], "r1");
        assert_eq!(json["issues"].as_array().unwrap().len(), 0);
    }
}
