//! Text generation crate for the Vigil security assistant.
//!
//! This crate provides a provider-agnostic abstraction for the generation
//! capability consumed by the retrieval pipeline. Providers implement a
//! unified trait-based interface.
//!
//! # Providers
//! - **Gemini**: Google Generative Language API (default)
//! - **Mock**: deterministic canned responses for tests and offline runs
//!
//! # Example
//! ```no_run
//! use vigil_llm::{GenerationClient, GenerationRequest, providers::GeminiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("api-key");
//! let request = GenerationRequest::new("Summarize CVE-2021-44228", "gemini-2.0-flash");
//! let response = client.generate(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{GenerationClient, GenerationRequest, GenerationResponse};
pub use factory::create_client;
pub use providers::{GeminiClient, MockClient};
