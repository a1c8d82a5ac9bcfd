//! Threat-intelligence document sources.
//!
//! A source either fetches live data or falls back to a built-in static
//! set, so `fetch` is infallible: the pipeline always has something to
//! index even when the network is down.

pub mod cve;
pub mod mitre;

pub use cve::CveSource;
pub use mitre::MitreSource;

use crate::types::RawDocument;

/// A provider of raw documents for ingestion.
#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    /// Human-readable source name, used in logs.
    fn name(&self) -> &str;

    /// Fetch documents. Implementations fall back to static data rather
    /// than returning an error.
    async fn fetch(&self) -> Vec<RawDocument>;
}
