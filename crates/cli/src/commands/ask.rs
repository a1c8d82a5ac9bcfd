//! Ask command handler.
//!
//! Builds the knowledge base, runs the guarded pipeline and prints the
//! answer with its confidence and sources.

use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use vigil_core::{config::AppConfig, AppError, AppResult};
use vigil_llm::create_client;
use vigil_rag::embeddings::create_provider;
use vigil_rag::sources::{CveSource, DocumentSource, MitreSource};
use vigil_rag::{ingest, InMemoryStore, RagPipeline};

/// Ask a question against the threat-intelligence knowledge base
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of documents to retrieve
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Skip the per-document delay during ingestion
    #[arg(long)]
    pub no_ingest_delay: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        config.validate()?;

        let embedder = create_provider(
            &config.provider,
            &config.embedding_model,
            config.api_key.as_deref(),
        )?;
        let llm = create_client(&config.provider, None, config.api_key.as_deref())?;

        let store = Arc::new(InMemoryStore::new());
        let sources: Vec<Box<dyn DocumentSource>> = vec![
            Box::new(CveSource::new()),
            Box::new(MitreSource::new()),
        ];

        let delay = if self.no_ingest_delay {
            Duration::ZERO
        } else {
            Duration::from_millis(config.ingest_delay_ms)
        };

        let indexed = ingest(store.as_ref(), &sources, embedder.as_ref(), delay).await;
        if indexed == 0 {
            return Err(AppError::Ingestion(
                "No documents could be indexed".to_string(),
            ));
        }

        let pipeline = RagPipeline::new(store, embedder, llm, &config.model)
            .with_top_k(self.top_k.unwrap_or(config.top_k));

        let response = pipeline.ask(&self.question).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&response)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", response.answer);
            println!();
            println!("Confidence: {}", response.confidence);
            if !response.sources.is_empty() {
                println!("Sources: {}", response.sources.join(", "));
            }
        }

        Ok(())
    }
}
