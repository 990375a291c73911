use thiserror::Error;

/// Run-level errors. Any of these aborts the batch before or during
/// processing and is surfaced to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Batch cancelled")]
    BatchCancelled,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Per-posting extraction errors. These never abort the batch: the posting
/// is skipped, logged, and recorded in the batch outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Posting text is empty after stripping")]
    EmptyInput,
}

/// Errors from the enrichment provider. All variants are treated identically
/// by the extractor: fall back to the heuristic result with lowered
/// confidence. They are never surfaced to the engine's caller.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed provider response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Provider call timed out")]
    Timeout,

    #[error("Provider returned empty content")]
    EmptyContent,

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}
