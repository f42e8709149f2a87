//! Commit objects: linear history records

use crate::hash::{hash_bytes, Oid};
use serde::{Deserialize, Serialize};

/// Author or committer identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
}

impl Signature {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// A commit pairs one root tree snapshot with its history metadata.
///
/// At most one parent: history is strictly linear, there are no merges. The
/// commit's own address is the hash of its serialized record, so commits are
/// content-addressed like every other object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    /// Parent commit address (None for the root commit)
    pub parent: Option<Oid>,
    /// Root tree address for this snapshot
    pub tree: Oid,
    /// Who wrote the change
    pub author: Signature,
    /// Who recorded the change
    pub committer: Signature,
    /// Commit message
    pub message: String,
    /// Timestamp (Unix milliseconds)
    pub ts_unix_ms: u64,
}

impl Commit {
    /// Create a new commit stamped with the current time
    pub fn new(
        parent: Option<Oid>,
        tree: Oid,
        author: Signature,
        committer: Signature,
        message: impl Into<String>,
    ) -> Self {
        Self {
            parent,
            tree,
            author,
            committer,
            message: message.into(),
            ts_unix_ms: current_timestamp_ms(),
        }
    }

    /// Serialize commit to bytes
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize commit from bytes
    pub fn deserialize(bytes: &[u8]) -> anyhow::Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Content address of this commit
    pub fn oid(&self) -> anyhow::Result<Oid> {
        Ok(hash_bytes(&self.serialize()?))
    }
}

fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_millis() as u64
}
