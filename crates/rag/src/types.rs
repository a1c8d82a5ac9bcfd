//! Retrieval system type definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A raw document as produced by a source loader, before it has an
/// identity or an embedding.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Text content to be embedded
    pub content: String,

    /// Metadata (e.g., "source", "severity")
    pub metadata: HashMap<String, String>,
}

impl RawDocument {
    pub fn new(content: impl Into<String>, metadata: HashMap<String, String>) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// An indexed knowledge snippet.
///
/// Created once during ingestion; immutable thereafter apart from the
/// one-time embedding assignment. Owned by the vector store after upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier, generated on ingestion
    pub id: String,

    /// Text content
    pub content: String,

    /// Metadata (e.g., "source", "severity")
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Embedding vector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Document {
    /// Create a document with a freshly generated id and no embedding.
    pub fn from_raw(raw: RawDocument) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: raw.content,
            metadata: raw.metadata,
            embedding: None,
        }
    }

    /// The "source" metadata value shown to users, or "Unknown".
    pub fn source_label(&self) -> String {
        self.metadata
            .get("source")
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// A search hit: a document paired with its similarity score.
///
/// Produced only by `VectorStore::search`; never stored.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f64,
}

/// Coarse trustworthiness label derived from the top retrieval score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Derive the tier from the top similarity score.
    ///
    /// Boundaries are exclusive on the lower edge: exactly 0.75 is Medium
    /// and exactly 0.5 is Low.
    pub fn from_score(top_score: f64) -> Self {
        if top_score > 0.75 {
            Confidence::High
        } else if top_score > 0.5 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response from an answered query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    /// Sanitized answer text
    pub answer: String,

    /// Trustworthiness tier derived from the top retrieval score
    pub confidence: Confidence,

    /// Distinct "source" metadata values of the retrieved documents,
    /// in first-seen order
    pub sources: Vec<String>,
}
