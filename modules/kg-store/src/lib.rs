pub mod error;
pub mod models;
pub mod store;

#[cfg(feature = "test-utils")]
pub mod testutil;

pub use error::{Result, StoreError};
pub use models::*;
pub use pgvector::Vector;
pub use store::FactStore;
