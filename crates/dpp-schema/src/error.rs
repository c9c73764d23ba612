use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
