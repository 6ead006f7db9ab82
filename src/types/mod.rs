//! Public types for the mockmill API.

mod config;
mod metrics;
mod response;

pub use config::{ImageInput, RequestConfig};
pub use metrics::{CacheStats, UsageMetrics};
pub use response::GenResponse;
