//! Guarded retrieval-augmented pipeline for security Q&A.
//!
//! Raw vulnerability and adversary-technique documents are embedded and
//! held in an in-memory vector store; at query time the pipeline validates
//! the question, retrieves the nearest documents, asks the generation
//! capability for an answer, and sanitizes it before returning.

pub mod embeddings;
pub mod ingest;
pub mod pipeline;
pub mod sources;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use ingest::ingest;
pub use pipeline::RagPipeline;
pub use store::{InMemoryStore, VectorStore};
pub use types::{Confidence, Document, RagResponse, RawDocument, ScoredDocument};
