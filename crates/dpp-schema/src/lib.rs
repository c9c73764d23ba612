#![doc = include_str!("../README.md")]

mod error;
pub mod json_schema;
pub mod resolve;

pub use error::SchemaError;
pub use json_schema::{
    DEFAULT_SEMANTIC_ID_KEY, JsonSchema, SchemaMetadata, SchemaNode, SchemaType, TypeDecl,
};
pub use resolve::{DEFAULT_REF_PREFIX, ResolvedNode, SchemaResolver};
