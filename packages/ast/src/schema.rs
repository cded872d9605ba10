//! Data model the rules are written against.

use crate::ast::FieldRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared type of a data-model field or function result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Bool,
    Int,
    Float,
    String,
    Timestamp,
}

impl DataType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int | DataType::Float)
    }
}

/// Tables and their typed fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataModel {
    #[serde(default)]
    pub tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub fields: BTreeMap<String, DataType>,
}

/// Why a field reference failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    Table,
    Field,
}

impl DataModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper, mostly for tests and fixtures
    pub fn with_table(mut self, name: impl Into<String>, fields: &[(&str, DataType)]) -> Self {
        let table = Table {
            fields: fields
                .iter()
                .map(|(name, ty)| (name.to_string(), *ty))
                .collect(),
        };
        self.tables.insert(name.into(), table);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn resolve(&self, field: &FieldRef) -> Result<DataType, Unresolved> {
        let table = self.table(&field.table).ok_or(Unresolved::Table)?;
        table
            .fields
            .get(&field.field)
            .copied()
            .ok_or(Unresolved::Field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_model() {
        let json = r#"{
            "tables": {
                "transactions": {
                    "fields": { "amount": "Float", "country": "String" }
                }
            }
        }"#;

        let model = DataModel::from_json(json).unwrap();
        assert_eq!(
            model.resolve(&FieldRef::new("transactions", "amount")),
            Ok(DataType::Float)
        );
        assert_eq!(
            model.resolve(&FieldRef::new("transactions", "iban")),
            Err(Unresolved::Field)
        );
        assert_eq!(
            model.resolve(&FieldRef::new("accounts", "iban")),
            Err(Unresolved::Table)
        );
    }
}
