//! Path-scoped history reconstruction
//!
//! Walks the commit ancestry newest-first and reports the commits after
//! which one path's content changed, without diffing whole trees pairwise.
//! The walk is lazy so callers can paginate and stop early; the chain is
//! finite and ends at the parentless root commit.

use crate::repo::Repository;
use anyhow::Result;
use quill_core::{Commit, Oid};

/// One history entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Commit address
    pub id: Oid,
    /// Commit message
    pub message: String,
    /// Timestamp (Unix milliseconds)
    pub ts_unix_ms: u64,
    /// Author name
    pub author: String,
}

fn record(oid: Oid, commit: &Commit) -> CommitRecord {
    CommitRecord {
        id: oid,
        message: commit.message.clone(),
        ts_unix_ms: commit.ts_unix_ms,
        author: commit.author.name.clone(),
    }
}

/// Lazy iterator over the commits that changed one storage path.
///
/// Maintains the address of the path's entry as of the most recently visited
/// (newer) commit; whenever the address differs in the next (older) commit,
/// the newer commit is the one that made the change and is yielded. Absence
/// resets the tracked address, which makes deletion/recreation a boundary:
/// the recreating commit is yielded when the walk steps onto the gap.
pub struct History<'r> {
    repo: &'r Repository,
    path: Vec<String>,
    cursor: Option<Oid>,
    last_oid: Option<Oid>,
    last_commit: Option<(Oid, Commit)>,
    done: bool,
}

impl<'r> History<'r> {
    pub(crate) fn new(repo: &'r Repository, path: Vec<String>, start: Option<Oid>) -> Self {
        Self {
            repo,
            path,
            cursor: start,
            last_oid: None,
            last_commit: None,
            done: false,
        }
    }
}

impl Iterator for History<'_> {
    type Item = Result<CommitRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let oid = match self.cursor {
                Some(oid) => oid,
                None => {
                    // Root reached: the oldest surviving version was
                    // introduced by the last commit that carried it
                    self.done = true;
                    if self.last_oid.is_some() {
                        if let Some((oid, commit)) = self.last_commit.take() {
                            return Some(Ok(record(oid, &commit)));
                        }
                    }
                    return None;
                }
            };

            let commit = match self.repo.store().commit(oid) {
                Ok(commit) => commit,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            let entry_oid = match self.repo.entry_at(commit.tree, &self.path) {
                Ok(entry) => entry.map(|e| e.oid),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            self.cursor = commit.parent;

            let mut emit = None;
            if entry_oid != self.last_oid {
                if self.last_oid.is_some() {
                    emit = self.last_commit.take();
                }
                self.last_oid = entry_oid;
            }
            self.last_commit = Some((oid, commit));

            if let Some((emit_oid, emit_commit)) = emit {
                return Some(Ok(record(emit_oid, &emit_commit)));
            }
        }
    }
}

/// Lazy iterator over the full commit chain, newest-first
pub struct Log<'r> {
    repo: &'r Repository,
    cursor: Option<Oid>,
}

impl<'r> Log<'r> {
    pub(crate) fn new(repo: &'r Repository, start: Option<Oid>) -> Self {
        Self { repo, cursor: start }
    }
}

impl Iterator for Log<'_> {
    type Item = Result<CommitRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = self.cursor?;
        match self.repo.store().commit(oid) {
            Ok(commit) => {
                self.cursor = commit.parent;
                Some(Ok(record(oid, &commit)))
            }
            Err(e) => {
                self.cursor = None;
                Some(Err(e))
            }
        }
    }
}
