use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("chunk_rows must be greater than 0")]
    ChunkRows,
    #[error("chunk_elements must be greater than 0")]
    ChunkElements,
    #[error("extensions must not be empty strings")]
    EmptyExtension,
}
