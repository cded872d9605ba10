use super::load_iteration;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use marble_ast::{decompose, EditTarget, LogicalOperator, NestedCondition, ScenarioIteration};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ConditionsArgs {
    /// Scenario iteration JSON file
    pub input: PathBuf,

    /// Rule to show instead of the trigger
    #[arg(short, long)]
    pub rule: Option<String>,
}

pub fn conditions(args: ConditionsArgs, cwd: &Path) -> Result<()> {
    let iteration = load_iteration(&cwd.join(&args.input))?;
    let target = args.rule.map_or(EditTarget::Trigger, EditTarget::rule);

    for line in condition_lines(&iteration, &target)? {
        println!("{}", line);
    }

    Ok(())
}

fn condition_lines(iteration: &ScenarioIteration, target: &EditTarget) -> Result<Vec<String>> {
    let tree = iteration
        .expression(target)
        .ok_or_else(|| anyhow!("Unknown rule: {}", target))?;

    Ok(decompose(&Arc::new(tree)).iter().map(format_condition).collect())
}

fn format_condition(condition: &NestedCondition) -> String {
    let label = format!("{:>5}", condition.logical_operator.to_string());
    let label = match condition.logical_operator {
        LogicalOperator::Where => label.cyan().bold(),
        LogicalOperator::And | LogicalOperator::Or => label.blue().bold(),
    };
    format!("{} {}", label, condition.condition)
}
