pub mod conditions;
pub mod validate;

pub use conditions::{conditions, ConditionsArgs};
pub use validate::{validate, ValidateArgs};

use anyhow::{Context, Result};
use marble_ast::{DataModel, ScenarioIteration};
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn load_iteration(path: &Path) -> Result<ScenarioIteration> {
    let content = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    ScenarioIteration::from_json(&content).with_context(|| format!("invalid scenario iteration {}", path.display()))
}

fn load_data_model(path: &Path) -> Result<Arc<DataModel>> {
    let content = fs::read_to_string(path).with_context(|| format!("cannot read data model {}", path.display()))?;
    let model = DataModel::from_json(&content).with_context(|| format!("invalid data model {}", path.display()))?;
    Ok(Arc::new(model))
}
