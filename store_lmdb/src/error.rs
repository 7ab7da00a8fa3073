use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("schema version mismatch: database is v{found}, this build expects v{expected}")]
    SchemaMismatch { found: u32, expected: u32 },
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<LmdbError> for simplegov_store::StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::Serialization(msg) => simplegov_store::StoreError::Serialization(msg),
            LmdbError::SchemaMismatch { .. } => {
                simplegov_store::StoreError::Corruption(e.to_string())
            }
            other => simplegov_store::StoreError::Backend(other.to_string()),
        }
    }
}
