#![forbid(unsafe_code)]

pub mod error;
pub mod http;
pub mod store;

pub use error::StoreError;
pub use http::{HttpStore, HttpStoreConfig};
pub use store::{ContentStore, InMemoryStore, ProgressLedger, TopicContent};
