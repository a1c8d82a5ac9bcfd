//! Embedding provider implementations.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiEmbedder;
pub use mock::MockProvider;
