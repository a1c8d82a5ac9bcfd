//! Ingest command handler.
//!
//! Runs the full fetch-embed-index cycle once and reports what was
//! loaded. Useful as a connectivity and quota check before asking.

use clap::Args;
use std::time::Duration;
use vigil_core::{config::AppConfig, AppResult};
use vigil_rag::embeddings::create_provider;
use vigil_rag::sources::{CveSource, DocumentSource, MitreSource};
use vigil_rag::store::VectorStore;
use vigil_rag::{ingest, InMemoryStore};

/// Fetch and index the knowledge base, then report what was loaded
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Skip the per-document delay between embedding calls
    #[arg(long)]
    pub no_ingest_delay: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    /// Execute the ingest command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        config.validate()?;

        let embedder = create_provider(
            &config.provider,
            &config.embedding_model,
            config.api_key.as_deref(),
        )?;

        let store = InMemoryStore::new();
        let sources: Vec<Box<dyn DocumentSource>> = vec![
            Box::new(CveSource::new()),
            Box::new(MitreSource::new()),
        ];

        let delay = if self.no_ingest_delay {
            Duration::ZERO
        } else {
            Duration::from_millis(config.ingest_delay_ms)
        };

        let indexed = ingest(&store, &sources, embedder.as_ref(), delay).await;

        if self.json {
            let output = serde_json::json!({
                "indexed": indexed,
                "sources": sources.len(),
                "inStore": store.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output).map_err(
                |e| vigil_core::AppError::Serialization(e.to_string()),
            )?);
        } else {
            println!(
                "Indexed {} documents from {} sources ({} in store)",
                indexed,
                sources.len(),
                store.len()
            );
        }

        Ok(())
    }
}
