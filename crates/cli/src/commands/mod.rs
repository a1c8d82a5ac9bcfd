//! Command handlers for the Vigil CLI.

pub mod ask;
pub mod ingest;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use ingest::IngestCommand;
