//! Error types for bgg-enricher
//!
//! Each failure class of the enrichment pipeline has its own type because the
//! orchestrator reacts to each one differently:
//!
//! | Error | Reaction |
//! |-------|----------|
//! | [`ItemExtractionError`] | item dropped, siblings kept |
//! | [`DocumentParseError`] | batch bisected; singleton dropped |
//! | [`GatewayError::RateLimited`] | cooldown, slower pacing, same batch retried |
//! | [`GatewayError::Status`] / [`GatewayError::Network`] | batch skipped for this run |

use thiserror::Error;

/// One `<item>` could not be extracted; the rest of the document is unaffected
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Failed to extract item {item_id}: {reason}")]
pub struct ItemExtractionError {
    pub item_id: String,
    pub reason: String,
}

/// The response body is not a well-formed XML document
#[derive(Debug, Clone, PartialEq, Error)]
#[error("XML document parse failed: {0}")]
pub struct DocumentParseError(pub String);

/// API gateway errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// HTTP 429
    #[error("Rate limited (429)")]
    RateLimited,

    /// Any other non-2xx status
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    /// Timeout, connection reset, DNS failure, unreadable body
    #[error("Network error: {0}")]
    Network(String),
}

impl GatewayError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GatewayError::RateLimited)
    }
}

/// Render an error with its full `source()` chain, outermost first.
///
/// Transport errors are logged with their inner causes so the journal shows
/// e.g. the TLS or socket failure underneath a generic "request failed".
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
