//! Registry of callable functions and their signatures.

use crate::ast::Arity;
use crate::schema::DataType;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: String,
    /// Positional operand count
    pub arity: Arity,
    /// Required keyword parameters
    pub named_parameters: Vec<String>,
    pub return_type: Option<DataType>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, arity: Arity) -> Self {
        Self {
            name: name.into(),
            arity,
            named_parameters: Vec::new(),
            return_type: None,
        }
    }

    pub fn returns(mut self, return_type: DataType) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn with_named(mut self, parameters: &[&str]) -> Self {
        self.named_parameters = parameters.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn has_named_parameter(&self, name: &str) -> bool {
        self.named_parameters.iter().any(|p| p == name)
    }
}

/// Known functions, keyed by name
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, FunctionSignature>,
}

impl FunctionRegistry {
    /// Registry with the built-in functions
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(FunctionSignature::new("IsInList", Arity::Fixed(2)).returns(DataType::Bool));
        registry.register(
            FunctionSignature::new("StringContains", Arity::Fixed(2)).returns(DataType::Bool),
        );
        registry.register(FunctionSignature::new("ToFloat", Arity::Fixed(1)).returns(DataType::Float));
        registry.register(FunctionSignature::new("ToString", Arity::Fixed(1)).returns(DataType::String));
        registry.register(FunctionSignature::new("TimeNow", Arity::Fixed(0)).returns(DataType::Timestamp));
        registry.register(
            FunctionSignature::new("TimeAdd", Arity::Fixed(2)).returns(DataType::Timestamp),
        );
        registry.register(
            FunctionSignature::new("Aggregator", Arity::AtLeast(0))
                .with_named(&["aggregator", "tableName", "fieldName"])
                .returns(DataType::Float),
        );
        registry
    }

    pub fn empty() -> Self {
        Self {
            functions: BTreeMap::new(),
        }
    }

    /// Add or replace a signature
    pub fn register(&mut self, signature: FunctionSignature) {
        self.functions.insert(signature.name.clone(), signature);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
