//! Security guards for the Vigil retrieval pipeline.
//!
//! Two stages wrap the generation capability:
//! - [`InputGuard`] validates user queries before they reach the model
//!   (prompt-injection, jailbreak, and injection-signature detection).
//! - [`OutputGuard`] redacts sensitive data from generated answers before
//!   they reach the user.
//!
//! Every rejection and redaction-adjacent finding is recorded as a
//! structured `tracing` security event; the log is the only side effect.

pub mod input;
pub mod output;

pub use input::{GuardConfig, GuardError, InputGuard};
pub use output::OutputGuard;
