//! Quill Wiki - a version-controlled wiki article store
//!
//! Page content is versioned with a commit-graph object model (blobs, trees,
//! commits) on top of `quill-core` instead of a relational database:
//! - Title normalization with namespace rules and subpage encoding
//! - A repository owning the object store and a forward-only head
//! - Article operations: view, save, delete, move, list
//! - Path-scoped history reconstruction and line diffs
//! - Deterministic commit message composition
//!
//! The presentation layer (HTTP, rendering, forms) lives outside this crate
//! and consumes these operations as plain data.

pub mod article;
pub mod config;
pub mod diff;
pub mod error;
pub mod history;
pub mod message;
pub mod repo;
pub mod title;

// Re-export main types for convenience
pub use article::{Article, ArticleService, DeleteOutcome, MoveOutcome, SaveOutcome};
pub use config::WikiConfig;
pub use diff::{DiffLine, DiffTag, Hunk};
pub use error::{Error, Result, TitleError};
pub use history::{CommitRecord, History, Log};
pub use message::MessageComposer;
pub use repo::{CommitResult, Repository, Revision, Snapshot, Transaction};
pub use title::{normalize, Title};
