use thiserror::Error;

#[derive(Debug, Error)]
pub enum CzmlError {
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
