//! Embedding provider trait and factory.

use std::sync::Arc;
use vigil_core::{AppError, AppResult};

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "gemini", "mock")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate an embedding for a single text.
    ///
    /// Fails with `AppError::ExternalService` on transport or API failure.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Create an embedding provider based on the provider name.
pub fn create_provider(
    provider: &str,
    model: &str,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match provider.to_lowercase().as_str() {
        "gemini" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Gemini embedding provider requires an API key".to_string())
            })?;
            Ok(Arc::new(super::providers::GeminiEmbedder::new(
                api_key, model,
            )))
        }

        "mock" => Ok(Arc::new(super::providers::MockProvider::new(384))),

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: gemini, mock",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_provider() {
        let provider = create_provider("mock", "trigram-v1", None).unwrap();
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_create_gemini_provider_requires_key() {
        let result = create_provider("gemini", "text-embedding-004", None);
        assert!(result.is_err());

        let provider = create_provider("gemini", "text-embedding-004", Some("key")).unwrap();
        assert_eq!(provider.provider_name(), "gemini");
        assert_eq!(provider.model_name(), "text-embedding-004");
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider("unknown", "m", None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }
}
