//! Red Canary API client library.
//!
//! A Rust library for the Red Canary security-detection REST API:
//! detections, endpoints, indicators, detectors, and response plans.
//!
//! The API returns abbreviated "snippet" records from list endpoints and
//! embedded relationships, and full records from detail endpoints. This
//! library hides the difference: typed accessors read through a lazy
//! [`Resource`] that fetches the full record on the first access of a
//! field the snippet does not carry, and collections page through server
//! results on demand via [`Collection`].
//!
//! # Quick Start
//!
//! ```no_run
//! use canaryapi::{ApiResource, CanaryClient, Detection};
//!
//! #[tokio::main]
//! async fn main() -> canaryapi::Result<()> {
//!     // Create client from RED_CANARY_CUSTOMER_ID / RED_CANARY_API_KEY
//!     let client = CanaryClient::from_env()?;
//!
//!     // Iterate detections, paging lazily
//!     let mut detections = Detection::all(&client);
//!     println!("{} detections total", detections.size().await?);
//!
//!     while let Some(mut detection) = detections.try_next().await? {
//!         println!("{}", detection.headline().await?);
//!
//!         // The embedded endpoint is a snippet; accessing a field it
//!         // lacks fetches the full record transparently.
//!         let mut endpoint = detection.endpoint().await?;
//!         println!("  on {}", endpoint.hostname().await?);
//!         println!("  os {}", endpoint.operating_system().await?);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`CanaryClient`] - authenticated HTTP transport
//! - [`Resource`] - a raw record with snippet/full state and
//!   hydrate-on-miss field access
//! - [`Collection`] - lazy iteration over server-side pages, with
//!   `since` filtering and a client-side `limit`
//! - [`ApiResource`] - per-kind descriptor binding a type to its
//!   collection endpoint, providing `all` and `find`
//!
//! # Configuration
//!
//! [`CanaryClient::from_env`] reads:
//!
//! - `RED_CANARY_CUSTOMER_ID` (required) - portal subdomain
//! - `RED_CANARY_API_KEY` (required) - API key
//! - `RED_CANARY_API_URL` (optional) - full base URL override

mod client;
mod collection;
mod error;
mod models;
mod resource;

// Re-export core types
pub use client::{CanaryClient, RawPage};
pub use collection::Collection;
pub use error::{CanaryError, Result};
pub use resource::{ApiResource, Resource};

// Re-export models
pub use models::{Detection, Detector, Endpoint, Indicator, RemediationState, ResponsePlan, TimelineEntry};
