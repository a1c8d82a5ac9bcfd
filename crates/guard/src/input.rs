//! Multi-layer validation of user queries.
//!
//! Layers run in a fixed order and short-circuit on the first failure:
//! 1. Structural basics: blank input, length cap (resource exhaustion).
//! 2. Keyword blacklist over the lower-cased input.
//! 3. Regex patterns over the raw input (compound phrasing, injection
//!    signatures, encoded payloads).
//! 4. Structural analysis: special-character ratio, character repetition.
//!
//! Each rejection emits a security event (detection layer plus offending
//! detail) before the error is returned. Error messages themselves never
//! echo the input.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use vigil_core::AppError;

/// Layer 1: explicit malicious keyword blacklist, matched against the
/// lower-cased query.
const BLACKLIST_KEYWORDS: &[&str] = &[
    // Prompt override attacks
    "ignore previous instructions",
    "ignore all instructions",
    "ignore above",
    "disregard previous",
    "forget everything",
    "new instructions",
    "override instructions",
    // System manipulation
    "you are now",
    "you are a hacked",
    "system prompt",
    "reveal your prompt",
    "show your instructions",
    "what are your guidelines",
    // Jailbreak attempts
    "pretend you are",
    "roleplay as",
    "act as if",
    "simulate being",
    "hypothetically",
    // Command/SQL injection
    "drop table",
    "delete from",
    "insert into",
    "'; drop",
    "union select",
    "exec(",
    "execute(",
    // Encoding/obfuscation markers
    "base64",
    "hex encode",
    "rot13",
    "url encode",
];

/// Layer 2: regex patterns for attacks the keyword list cannot phrase.
static MALICIOUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Instruction override phrasing
        r"(?i)\b(ignore|disregard|forget)\s+(all|previous|above|prior)\s+(instructions?|rules?|guidelines?|commands?)",
        r"(?i)\b(new|updated|revised)\s+(instructions?|rules?|system\s+prompt)",
        // Role manipulation
        r"(?i)(you\s+are\s+now|act\s+as|pretend\s+to\s+be|simulate\s+being)\s+\w+",
        r"(?i)(jailbreak|dan\s+mode|developer\s+mode|god\s+mode)",
        // Prompt leakage attempts
        r"(?i)(show|reveal|display|print|output)\s+(your|the)\s+(prompt|instructions?|system\s+message)",
        // SQL/command injection signatures
        r"(?i)(drop|delete|insert|update)\s+(table|from|into)",
        r"(?i)(union|concat)\s+select",
        r"(?i);\s*(drop|delete|exec)",
        // Suspicious character runs (potential encoding)
        r"(%[0-9A-Fa-f]{2}){5,}",      // URL-encoded sequences
        r"(\\x[0-9A-Fa-f]{2}){5,}",    // hex escape sequences
        r"[A-Za-z0-9+/]{20,}={0,2}",   // base64-like strings (20+ chars)
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// A single character repeated this many times consecutively marks the
/// input as fuzzing or overflow probing.
const MAX_CHAR_RUN: usize = 10;

/// Rejection reasons produced by [`InputGuard::validate`].
///
/// `EmptyInput` and `TooLong` are plain validation failures; the remaining
/// variants are security detections. The distinction drives the
/// [`AppError`] taxonomy via the `From` impl below.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("query cannot be empty")]
    EmptyInput,

    #[error("query exceeds the maximum length of {0} characters")]
    TooLong(usize),

    #[error("forbidden keyword detected")]
    ForbiddenKeyword,

    #[error("suspicious pattern detected")]
    SuspiciousPattern,

    #[error("excessive special characters detected")]
    ExcessiveSpecialChars,

    #[error("excessive character repetition detected")]
    ExcessiveRepetition,
}

impl GuardError {
    /// Whether this rejection is a security detection rather than a plain
    /// validation failure.
    pub fn is_security_violation(&self) -> bool {
        !matches!(self, GuardError::EmptyInput | GuardError::TooLong(_))
    }
}

impl From<GuardError> for AppError {
    fn from(err: GuardError) -> Self {
        if err.is_security_violation() {
            AppError::SecurityViolation(err.to_string())
        } else {
            AppError::Validation(err.to_string())
        }
    }
}

/// Thresholds for the structural layers.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Maximum query length in characters
    pub max_length: usize,

    /// Maximum fraction of characters that may be neither alphanumeric nor
    /// whitespace
    pub max_special_char_ratio: f64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_length: 2000,
            max_special_char_ratio: 0.30,
        }
    }
}

/// Multi-layer input validator.
#[derive(Debug, Clone, Default)]
pub struct InputGuard {
    config: GuardConfig,
}

impl InputGuard {
    /// Create an input guard with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input guard with custom thresholds.
    pub fn with_config(config: GuardConfig) -> Self {
        Self { config }
    }

    /// Validate a user query, short-circuiting on the first failing layer.
    pub fn validate(&self, query: &str) -> Result<(), GuardError> {
        // Basic validation
        if query.trim().is_empty() {
            log_security_event("empty_input", "blank query");
            return Err(GuardError::EmptyInput);
        }

        // Length validation (prevent resource exhaustion)
        let char_count = query.chars().count();
        if char_count > self.config.max_length {
            log_security_event("length_limit", &format!("{} characters", char_count));
            return Err(GuardError::TooLong(self.config.max_length));
        }

        let lower = query.to_lowercase();

        // Layer 1: blacklist keyword detection
        for keyword in BLACKLIST_KEYWORDS {
            if lower.contains(keyword) {
                log_security_event("keyword_blacklist", keyword);
                return Err(GuardError::ForbiddenKeyword);
            }
        }

        // Layer 2: regex pattern matching against the raw input
        for pattern in MALICIOUS_PATTERNS.iter() {
            if pattern.is_match(query) {
                log_security_event("pattern_match", pattern.as_str());
                return Err(GuardError::SuspiciousPattern);
            }
        }

        // Layer 3: structural analysis
        self.validate_structure(query, char_count)
    }

    /// Analyze query structure for anomalies.
    fn validate_structure(&self, query: &str, char_count: usize) -> Result<(), GuardError> {
        // Excessive special characters suggest encoding or obfuscation
        let special_count = query
            .chars()
            .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
            .count();

        let ratio = special_count as f64 / char_count as f64;
        if ratio > self.config.max_special_char_ratio {
            log_security_event(
                "special_chars",
                &format!("{:.0}% special characters", ratio * 100.0),
            );
            return Err(GuardError::ExcessiveSpecialChars);
        }

        // Long identical-character runs suggest fuzzing or overflow probing
        if has_excessive_repetition(query, MAX_CHAR_RUN) {
            log_security_event("repetition", "excessive character repetition");
            return Err(GuardError::ExcessiveRepetition);
        }

        Ok(())
    }
}

/// Detect a run of `limit` or more consecutive identical characters.
///
/// A manual scan; the regex crate intentionally has no backreferences.
fn has_excessive_repetition(text: &str, limit: usize) -> bool {
    let mut run = 0usize;
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if Some(c) == prev {
            run += 1;
            if run >= limit {
                return true;
            }
        } else {
            prev = Some(c);
            run = 1;
        }
    }

    false
}

/// Record a security event for monitoring and analysis.
///
/// The offending detail goes to the log only; it is never surfaced to the
/// caller through the returned error.
fn log_security_event(layer: &str, detail: &str) {
    tracing::warn!(
        security_event = true,
        layer = layer,
        detail = detail,
        "input guard rejected query"
    );
}
