use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}

impl StoreError {
    /// A `NotFound` error naming the key in hex.
    pub fn missing_key(key: &[u8]) -> Self {
        Self::NotFound(hex::encode(key))
    }
}
