use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `briefloop`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; host glue continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum BriefError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Extraction capability ───────────────────────────────────────────
    #[error("extraction: {0}")]
    Extraction(#[from] ExtractionError),

    // ── Human answers ───────────────────────────────────────────────────
    #[error("answers: {0}")]
    Answer(#[from] AnswerError),

    // ── Session ─────────────────────────────────────────────────────────
    #[error("session: {0}")]
    Session(#[from] SessionError),

    // ── Credentials ─────────────────────────────────────────────────────
    #[error("credential: {0}")]
    Credential(#[from] CredentialError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Extraction errors ──────────────────────────────────────────────────────

/// Failure modes of the extraction capability. The engine never propagates
/// these; it degrades them into a flagged record.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("extraction call failed: {0}")]
    Failed(String),

    #[error("unparsable extraction output: {message}")]
    Unparsable { message: String, raw_output: String },

    #[error("extraction output is not a JSON object")]
    NotAnObject,
}

impl ExtractionError {
    /// The raw capability output, when there was any.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            Self::Unparsable { raw_output, .. } => Some(raw_output),
            Self::Failed(_) | Self::NotAnObject => None,
        }
    }
}

// ─── Answer payload errors ──────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerError {
    #[error("answer payload is not a path→value mapping")]
    NotAMapping,

    #[error("answer path {path:?} is empty or has empty segments")]
    InvalidPath { path: String },

    #[error("answer for {path} is null")]
    NullValue { path: String },

    #[error("answer for {path} is a nested mapping; use dotted paths instead")]
    NestedMapping { path: String },

    #[error("answer for {path} would replace a whole category; name a field inside it")]
    WholeCategory { path: String },
}

// ─── Session errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("session {session_id} state is corrupt: {message}")]
    Corrupt { session_id: String, message: String },

    #[error("state belongs to session {actual}, not {expected}")]
    Mismatch { expected: String, actual: String },

    #[error("ledger entry out of order: expected iteration {expected}, got {actual}")]
    OutOfOrder { expected: u32, actual: u32 },

    #[error("store: {0}")]
    Store(String),
}

// ─── Credential errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("{0} not set")]
    Missing(String),

    #[error("token request failed: {0}")]
    Request(String),

    #[error("token endpoint returned status {status}: {body}")]
    Rejected { status: u16, body: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, BriefError>;
