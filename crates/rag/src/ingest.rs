//! Knowledge base ingestion.
//!
//! Sources are drained in the order given; each document is embedded and
//! upserted individually. Embedding failures are logged and skipped so a
//! flaky provider can never abort a run.

use crate::embeddings::EmbeddingProvider;
use crate::sources::DocumentSource;
use crate::store::VectorStore;
use crate::types::Document;
use std::time::Duration;

/// Fetch, embed and index documents from every source.
///
/// A `delay` between documents throttles embedding API calls; pass
/// `Duration::ZERO` to disable it. Returns the number of documents
/// actually indexed.
pub async fn ingest(
    store: &dyn VectorStore,
    sources: &[Box<dyn DocumentSource>],
    embedder: &dyn EmbeddingProvider,
    delay: Duration,
) -> usize {
    let mut indexed = 0;

    for source in sources {
        let raw_documents = source.fetch().await;
        tracing::info!(
            source = source.name(),
            fetched = raw_documents.len(),
            "ingesting documents"
        );

        for raw in raw_documents {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let mut document = Document::from_raw(raw);

            match embedder.embed(&document.content).await {
                Ok(embedding) => {
                    document.embedding = Some(embedding);
                }
                Err(error) => {
                    tracing::warn!(
                        source = source.name(),
                        id = %document.id,
                        %error,
                        "failed to embed document, skipping"
                    );
                    continue;
                }
            }

            store.upsert(document);
            indexed += 1;
        }
    }

    tracing::info!(indexed, total = store.len(), "ingestion complete");
    indexed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::types::RawDocument;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vigil_core::{AppError, AppResult};

    struct StaticSource {
        name: &'static str,
        contents: Vec<&'static str>,
    }

    #[async_trait::async_trait]
    impl DocumentSource for StaticSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self) -> Vec<RawDocument> {
            self.contents
                .iter()
                .map(|c| RawDocument::new(*c, HashMap::new()))
                .collect()
        }
    }

    /// Embedder that fails on every nth call.
    #[derive(Debug)]
    struct FlakyEmbedder {
        calls: AtomicUsize,
        fail_on: usize,
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for FlakyEmbedder {
        fn provider_name(&self) -> &str {
            "flaky"
        }

        fn model_name(&self) -> &str {
            "flaky-v1"
        }

        fn dimensions(&self) -> usize {
            3
        }

        async fn embed(&self, _text: &str) -> AppResult<Vec<f32>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call == self.fail_on {
                Err(AppError::ExternalService("embedding quota hit".to_string()))
            } else {
                Ok(vec![1.0, 0.0, 0.0])
            }
        }
    }

    #[tokio::test]
    async fn test_ingest_indexes_all_documents() {
        let store = InMemoryStore::new();
        let sources: Vec<Box<dyn DocumentSource>> = vec![
            Box::new(StaticSource {
                name: "alpha",
                contents: vec!["doc one", "doc two"],
            }),
            Box::new(StaticSource {
                name: "beta",
                contents: vec!["doc three"],
            }),
        ];
        let embedder = FlakyEmbedder {
            calls: AtomicUsize::new(0),
            fail_on: usize::MAX,
        };

        let indexed = ingest(&store, &sources, &embedder, Duration::ZERO).await;

        assert_eq!(indexed, 3);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_ingest_skips_failed_embeddings() {
        let store = InMemoryStore::new();
        let sources: Vec<Box<dyn DocumentSource>> = vec![Box::new(StaticSource {
            name: "alpha",
            contents: vec!["one", "two", "three", "four", "five"],
        })];
        let embedder = FlakyEmbedder {
            calls: AtomicUsize::new(0),
            fail_on: 3,
        };

        let indexed = ingest(&store, &sources, &embedder, Duration::ZERO).await;

        assert_eq!(indexed, 4);
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_ingest_empty_sources() {
        let store = InMemoryStore::new();
        let sources: Vec<Box<dyn DocumentSource>> = Vec::new();
        let embedder = FlakyEmbedder {
            calls: AtomicUsize::new(0),
            fail_on: usize::MAX,
        };

        assert_eq!(ingest(&store, &sources, &embedder, Duration::ZERO).await, 0);
        assert!(store.is_empty());
    }
}
