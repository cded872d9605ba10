//! # Marble AST
//!
//! Rule expression trees for fraud-detection scenarios: a trigger condition
//! plus scoring rules, each a tree of operators over data-model fields,
//! constants and function calls.
//!
//! Trees are persistent: every edit in [`ops`] returns a new root and leaves
//! the old one intact.

pub mod ast;
pub mod decompose;
pub mod error;
pub mod functions;
pub mod id_generator;
pub mod ops;
pub mod path;
pub mod scenario;
pub mod schema;
pub mod serializer;

pub use ast::{Arity, AstNode, Constant, FieldRef, NodeId, NodeKind, Operator, OperatorClass};
pub use decompose::{compose, decompose, LogicalOperator, NestedCondition};
pub use error::{SerializeError, StructuralError, StructuralResult};
pub use functions::{FunctionRegistry, FunctionSignature};
pub use id_generator::{get_scope_id, IdGenerator};
pub use ops::{resolve, Edited, PathEffect, TreeEditor};
pub use path::{NodePath, PathSegment};
pub use scenario::{EditTarget, ScenarioIteration, ScoringRule};
pub use schema::{DataModel, DataType, Table, Unresolved};
pub use serializer::{from_json, from_serialized, to_json, to_json_pretty, to_serialized, SerializedBody, SerializedNode};
