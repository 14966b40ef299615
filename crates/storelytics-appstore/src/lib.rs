//! Client for the public app catalog: single-shot metadata lookup and the
//! paginated customer-review feed.

pub mod client;
pub mod error;
pub mod normalize;
pub mod pagination;
pub(crate) mod rate_limit;
pub mod snapshot;
pub mod types;

pub use client::{AppStoreClient, ReviewBatch};
pub use error::AppStoreError;
pub use snapshot::append_snapshot;
