pub mod events;
pub mod rss;

pub use events::EventsWorker;
pub use rss::{FeedSource, RssWorker};
