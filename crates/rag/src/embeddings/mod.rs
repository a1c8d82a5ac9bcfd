//! Embedding capability consumed by ingestion and the query pipeline.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{GeminiEmbedder, MockProvider};
