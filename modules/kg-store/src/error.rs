use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for kg_common::PipelineError {
    fn from(e: StoreError) -> Self {
        kg_common::PipelineError::Database(e.to_string())
    }
}
