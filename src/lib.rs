//! Mockmill — caching, retrying orchestrator for generative image APIs.
//!
//! This crate mediates calls to a Gemini-style `generateContent` endpoint
//! for product-mockup image synthesis. It owns request deduplication
//! (a TTL + capacity bounded cache), resilience (bounded exponential
//! backoff with jitter), usage/cost accounting, and a stable error
//! taxonomy with remediation hints.
//!
//! # Example
//!
//! ```rust,no_run
//! use mockmill::{Orchestrator, HttpTransport, StaticCredentials, RequestConfig, ImageInput};
//!
//! #[tokio::main]
//! async fn main() -> mockmill::Result<()> {
//!     let orchestrator = Orchestrator::builder(HttpTransport::new(
//!         StaticCredentials::new("your-api-key"),
//!     ))
//!     .build();
//!
//!     let config = RequestConfig::new("gemini-2.0-flash-exp").temperature(0.9);
//!
//!     // Cached: an identical prompt + image set reuses the first response.
//!     let response = orchestrator
//!         .request("Mockup of a tote bag with a sunflower print", &[], &config)
//!         .await?;
//!     println!("{:?}", response.image);
//!
//!     // Uncached fan-out: three lighting/camera variants of one concept.
//!     let variants = orchestrator
//!         .generate_variations(
//!             "Mockup of a tote bag with a sunflower print",
//!             &ImageInput::png("..."),
//!             3,
//!             &config,
//!         )
//!         .await?;
//!     println!("{} variants", variants.len());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod orchestrator;
pub mod provider;
pub mod retry;
pub mod telemetry;
pub mod types;
pub mod usage;

// Re-export main types at crate root
pub use cache::{CacheConfig, RequestCache};
pub use error::{GenError, Result};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use provider::{CredentialStore, GenerateTransport, HttpTransport, StaticCredentials};
pub use retry::RetryConfig;
pub use usage::UsageTracker;

// Re-export all value types
pub use types::{CacheStats, GenResponse, ImageInput, RequestConfig, UsageMetrics};
