pub mod client;
pub mod migrate;
pub mod model;
pub mod reader;
pub mod writer;

#[cfg(feature = "test-utils")]
pub mod testutil;

pub use client::GraphClient;
pub use migrate::migrate;
pub use model::{ArticleNode, Assertion, FactNode, RankedFact};
pub use reader::GraphReader;
pub use writer::GraphWriter;
