//! Error types for the wiki layer
//!
//! Request-level failures are typed; storage faults propagate unchanged as
//! `anyhow` errors with context. Soft conditions (article missing, target
//! occupied, nothing to save) are not errors at all - they are outcome enums
//! returned in `Ok`, see `article`.

use thiserror::Error;

/// Title normalization failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    /// The title carries a namespace prefix that is not recognized
    #[error("unknown namespace: {0}")]
    UnknownNamespace(String),

    /// Empty title, empty path segment, or reserved marker character
    #[error("invalid title: {0}")]
    InvalidTitle(String),
}

/// Errors surfaced by wiki operations
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Title(#[from] TitleError),

    /// Object store or head failures; fatal to the request
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Common result type used throughout quill-wiki
pub type Result<T> = std::result::Result<T, Error>;
