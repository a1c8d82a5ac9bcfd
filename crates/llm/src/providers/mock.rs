//! Mock generation provider for tests and offline runs.

use crate::client::{GenerationClient, GenerationRequest, GenerationResponse};
use vigil_core::AppResult;

/// Mock provider that echoes a canned answer.
///
/// Returns a fixed response body so pipeline behavior can be exercised
/// without network access. The prompt is not inspected.
#[derive(Debug, Default)]
pub struct MockClient {
    response: Option<String>,
}

impl MockClient {
    /// Create a mock client with the default canned answer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock client that always answers with the given text.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
        }
    }
}

#[async_trait::async_trait]
impl GenerationClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerationRequest) -> AppResult<GenerationResponse> {
        let content = self
            .response
            .clone()
            .unwrap_or_else(|| "No model configured; this is a mock response.".to_string());

        Ok(GenerationResponse {
            content,
            model: request.model.clone(),
        })
    }
}
