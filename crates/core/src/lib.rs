//! Quill Core - Content-addressed storage primitives for the Quill wiki
//!
//! This crate provides the foundational storage layer:
//! - BLAKE3 content addressing
//! - Blob storage with compression
//! - Tree objects (page hierarchy snapshots)
//! - Commit objects (linear history records)
//! - On-disk store management

pub mod hash;
pub mod blob;
pub mod tree;
pub mod commit;
pub mod store;

// Re-export main types for convenience
pub use hash::{hash_bytes, IncrementalHasher, Oid};
pub use blob::BlobStore;
pub use tree::{EntryKind, Tree, TreeEntry};
pub use commit::{Commit, Signature};
pub use store::Store;

/// Common result type used throughout quill-core
pub type Result<T> = anyhow::Result<T>;
