//! In-memory vector store with exact nearest-neighbor search.
//!
//! The trait leaves room for an indexed backend later; the one concrete
//! implementation is a full linear scan, which is intentional: the corpus
//! is tens of documents and correctness beats scale at that size.

use crate::types::{Document, ScoredDocument};
use std::collections::HashMap;
use std::sync::RwLock;

/// Trait for vector store backends.
///
/// Methods take `&self`; implementations use interior mutability so that
/// startup-time upserts can overlap concurrent searches without readers
/// ever observing a partially written document.
pub trait VectorStore: Send + Sync {
    /// Insert or replace a document keyed by its id.
    fn upsert(&self, document: Document);

    /// Return at most `top_k` documents ordered by descending cosine
    /// similarity to `query`.
    ///
    /// Returns an empty sequence if `query` is empty or the store holds no
    /// embedded documents. Documents without an embedding never appear in
    /// results.
    fn search(&self, query: &[f32], top_k: usize) -> Vec<ScoredDocument>;

    /// Number of documents held (embedded or not).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exact linear-scan store over an exclusive-access map keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: RwLock<HashMap<String, Document>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VectorStore for InMemoryStore {
    fn upsert(&self, document: Document) {
        let mut documents = self.documents.write().expect("store lock poisoned");
        documents.insert(document.id.clone(), document);
    }

    fn search(&self, query: &[f32], top_k: usize) -> Vec<ScoredDocument> {
        if query.is_empty() {
            return Vec::new();
        }

        let documents = self.documents.read().expect("store lock poisoned");

        let mut results: Vec<ScoredDocument> = documents
            .values()
            .filter(|doc| doc.embedding.is_some())
            .map(|doc| ScoredDocument {
                score: cosine_similarity(query, doc.embedding.as_deref().unwrap_or(&[])),
                document: doc.clone(),
            })
            .collect();

        // Descending by score; equal scores keep map iteration order
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        results
    }

    fn len(&self) -> usize {
        self.documents.read().expect("store lock poisoned").len()
    }
}

/// Cosine similarity between two vectors, accumulated in f64.
///
/// Defined as 0 when the lengths differ or either norm is zero; a
/// dimension mismatch is a documented edge case, not an error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn doc(id: &str, embedding: Option<Vec<f32>>) -> Document {
        Document {
            id: id.to_string(),
            content: format!("content of {}", id),
            metadata: HashMap::new(),
            embedding,
        }
    }

    #[test]
    fn test_cosine_identical_vectors() {
        let v = vec![0.3, 0.5, 0.2];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_is_symmetric_and_bounded() {
        let a = vec![1.0, 2.0, -3.0];
        let b = vec![-2.0, 0.5, 4.0];
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        assert!((ab - ba).abs() < 1e-12);
        assert!((-1.0..=1.0).contains(&ab));
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_norm_is_zero() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_length_mismatch_is_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_upsert_overwrites_by_id() {
        let store = InMemoryStore::new();
        store.upsert(doc("d1", Some(vec![1.0, 0.0])));
        store.upsert(doc("d1", Some(vec![0.0, 1.0])));
        assert_eq!(store.len(), 1);

        let results = store.search(&[0.0, 1.0], 5);
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_search_empty_query_returns_nothing() {
        let store = InMemoryStore::new();
        store.upsert(doc("d1", Some(vec![1.0, 0.0])));
        assert!(store.search(&[], 5).is_empty());
    }

    #[test]
    fn test_search_empty_store_returns_nothing() {
        let store = InMemoryStore::new();
        assert!(store.search(&[1.0, 0.0], 5).is_empty());
    }

    #[test]
    fn test_search_excludes_unembedded_documents() {
        let store = InMemoryStore::new();
        store.upsert(doc("embedded", Some(vec![1.0, 0.0])));
        store.upsert(doc("pending", None));

        let results = store.search(&[1.0, 0.0], 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.id, "embedded");
    }

    #[test]
    fn test_search_respects_top_k_and_ordering() {
        let store = InMemoryStore::new();
        store.upsert(doc("close", Some(vec![0.9, 0.1])));
        store.upsert(doc("far", Some(vec![0.1, 0.9])));
        store.upsert(doc("middle", Some(vec![0.5, 0.5])));

        let results = store.search(&[1.0, 0.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.id, "close");
        assert_eq!(results[1].document.id, "middle");
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn test_search_top_1_returns_best() {
        let store = InMemoryStore::new();
        store.upsert(doc("strong", Some(vec![1.0, 0.0])));
        store.upsert(doc("weak", Some(vec![0.3, 0.95])));

        let results = store.search(&[1.0, 0.0], 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.id, "strong");
    }

    #[test]
    fn test_dimension_mismatch_scores_zero_not_excluded() {
        let store = InMemoryStore::new();
        store.upsert(doc("matching", Some(vec![1.0, 0.0])));
        store.upsert(doc("mismatched", Some(vec![1.0, 0.0, 0.0])));

        let results = store.search(&[1.0, 0.0], 5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.id, "matching");
        assert_eq!(results[1].document.id, "mismatched");
        assert_eq!(results[1].score, 0.0);
    }

    #[test]
    fn test_concurrent_search_and_upsert() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryStore::new());
        let writer = Arc::clone(&store);

        let handle = std::thread::spawn(move || {
            for i in 0..100 {
                writer.upsert(doc(&format!("d{}", i), Some(vec![1.0, i as f32])));
            }
        });

        for _ in 0..100 {
            let results = store.search(&[1.0, 0.0], 3);
            // Every observed document is fully formed
            for hit in results {
                assert!(hit.document.content.starts_with("content of"));
            }
        }

        handle.join().unwrap();
        assert_eq!(store.len(), 100);
    }
}
