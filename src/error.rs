//! Error types for the doc2blog library.
//!
//! Errors fall into two families:
//!
//! * **Deterministic**: [`ParseError`] and [`GenerationError`]. They depend
//!   only on the input text and never on the network, so the same input
//!   always fails the same way. Seeing one from non-empty input means a
//!   contract was violated.
//!
//! * **Pass-through**: [`UploadError`] and [`PublishError`] come from the
//!   external capabilities (see [`crate::capability`]). Their `Display` is the
//!   capability's own message, so the end user sees exactly what the platform
//!   said.
//!
//! [`PipelineError`] is what the top-level `publish*`/`prepare` functions
//! return. It wraps all of the above plus local input problems (bad image,
//! unreadable file, invalid configuration).

use std::path::PathBuf;
use thiserror::Error;

/// The raw document could not be turned into blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input was empty or contained only whitespace.
    #[error("Document is empty: paste some text before publishing")]
    Empty,

    /// Input had characters, but none of them formed a block
    /// (e.g. a lone `-` list marker or an unmatched `**`).
    #[error("Document has no publishable content after normalisation")]
    NoContent,
}

/// The generator was handed a document it cannot render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// `ParsedDocument::blocks()` was empty.
    #[error("Cannot render a document with no blocks")]
    EmptyDocument,
}

/// Failure reported by an [`crate::capability::ImageUploader`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// The platform refused the image (format, size, permissions …).
    #[error("{0}")]
    Rejected(String),

    /// The request never completed.
    #[error("{0}")]
    Transport(String),
}

/// Failure reported by an [`crate::capability::ArticlePublisher`].
///
/// The variants only classify the failure for callers that care; `Display`
/// is always the capability's message, untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// Credentials missing, expired or lacking scope (HTTP 401/403).
    #[error("{0}")]
    Auth(String),

    /// The platform asked us to slow down (HTTP 429).
    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    /// The platform validated the article and refused it.
    #[error("{0}")]
    Rejected(String),

    /// The request never completed.
    #[error("{0}")]
    Transport(String),
}

/// All fatal errors returned by the publishing pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Core errors ──────────────────────────────────────────────────────
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    // ── Capability errors ────────────────────────────────────────────────
    /// Image upload failed; nothing was published.
    #[error("image upload failed: {0}")]
    Upload(UploadError),

    /// The publish capability failed. Message passed through unchanged.
    #[error(transparent)]
    Publish(PublishError),

    // ── Image errors ─────────────────────────────────────────────────────
    /// The bytes are not one of the accepted raster formats.
    #[error("Invalid image: {reason}\nOnly JPEG, PNG, WebP and GIF images are accepted.")]
    InvalidImage { reason: String },

    /// The image exceeds `PipelineConfig::max_image_bytes`.
    #[error("Image too large ({size} bytes). Maximum size is {max} bytes.")]
    ImageTooLarge { size: usize, max: usize },

    // ── Input errors ─────────────────────────────────────────────────────
    /// Document file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    DocumentNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but is not valid UTF-8 text.
    #[error("Document '{path}' is not valid UTF-8 text")]
    InvalidEncoding { path: PathBuf },

    /// Any other I/O failure while reading the document.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Pipeline stage the error belongs to, for logs and progress events.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Parse(_) => "parse",
            PipelineError::Generation(_) => "render",
            PipelineError::Upload(_)
            | PipelineError::InvalidImage { .. }
            | PipelineError::ImageTooLarge { .. } => "upload",
            PipelineError::Publish(_) => "publish",
            PipelineError::DocumentNotFound { .. }
            | PipelineError::PermissionDenied { .. }
            | PipelineError::InvalidEncoding { .. }
            | PipelineError::ReadFailed { .. } => "input",
            PipelineError::InvalidConfig(_) => "config",
            PipelineError::Internal(_) => "internal",
        }
    }
}
