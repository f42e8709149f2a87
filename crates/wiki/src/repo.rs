//! Repository: head ownership, snapshots, and commit transactions
//!
//! One `Repository` owns the object store and the head pointer for one wiki.
//! Reads resolve a snapshot (an immutable commit) and never lock. Writes are
//! serialized: a single mutex guards read-head -> build-tree -> create-commit
//! -> advance-head, so the history stays a fork-free linear chain.

use anyhow::{Context, Result};
use parking_lot::{Mutex, RwLock};
use quill_core::{Commit, EntryKind, Oid, Signature, Store, Tree, TreeEntry};
use std::collections::HashMap;
use std::path::Path;

/// A resolvable reference to one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revision {
    /// The current head
    Head,
    /// A specific commit address
    Id(Oid),
}

impl Revision {
    /// Parse `"head"` or a 64-hex commit address
    pub fn parse(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("head") {
            return Ok(Self::Head);
        }
        let oid = Oid::from_hex(s).with_context(|| format!("Invalid revision: {}", s))?;
        Ok(Self::Id(oid))
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self::Head
    }
}

/// A resolved, immutable snapshot
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub oid: Oid,
    pub commit: Commit,
}

/// Staged mutation for one storage path
enum Staged {
    Page(Vec<u8>),
    Redirect(String),
    Remove,
}

/// Path-level mutations staged against a base snapshot.
///
/// Operations are recorded, not applied; `Repository::commit` replays them
/// against whatever the head is at commit time, so a transaction built from a
/// stale snapshot still lands without forking history.
pub struct Transaction {
    base: Option<Oid>,
    ops: Vec<(Vec<String>, Staged)>,
}

impl Transaction {
    /// Stage page content at a storage path
    pub fn put_page(&mut self, path: &[String], content: &[u8]) {
        self.ops.push((path.to_vec(), Staged::Page(content.to_vec())));
    }

    /// Stage a redirect link at a storage path
    pub fn put_redirect(&mut self, path: &[String], target: &str) {
        self.ops
            .push((path.to_vec(), Staged::Redirect(target.to_string())));
    }

    /// Stage removal of a storage path
    pub fn remove(&mut self, path: &[String]) {
        self.ops.push((path.to_vec(), Staged::Remove));
    }

    /// The head this transaction was started against
    pub fn base(&self) -> Option<Oid> {
        self.base
    }

    /// Whether any mutations are staged
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Result of committing a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitResult {
    /// A commit was created and the head advanced to it
    Committed(Oid),
    /// The staged mutations left the tree identical; nothing was committed
    NoChanges,
}

/// Owns the object store and the head pointer for one wiki
pub struct Repository {
    store: Store,
    head: RwLock<Option<Oid>>,
    write_lock: Mutex<()>,
}

impl Repository {
    /// Initialize a new repository at the given store root
    pub fn init(path: &Path) -> Result<Self> {
        let store = Store::init(path)?;
        tracing::info!(root = %path.display(), "initialized wiki repository");
        Ok(Self {
            store,
            head: RwLock::new(None),
            write_lock: Mutex::new(()),
        })
    }

    /// Open an existing repository
    pub fn open(path: &Path) -> Result<Self> {
        let store = Store::open(path)?;
        let head = store.head()?;
        tracing::info!(
            root = %path.display(),
            head = %head.map(|oid| oid.short()).unwrap_or_else(|| "none".to_string()),
            "opened wiki repository"
        );
        Ok(Self {
            store,
            head: RwLock::new(head),
            write_lock: Mutex::new(()),
        })
    }

    /// The underlying object store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The current head commit address (None for an empty repository)
    pub fn head(&self) -> Option<Oid> {
        *self.head.read()
    }

    /// Resolve a revision to an immutable snapshot.
    ///
    /// Returns None only for `Revision::Head` on an empty repository; a
    /// dangling commit address is a storage error.
    pub fn snapshot(&self, revision: &Revision) -> Result<Option<Snapshot>> {
        let oid = match revision {
            Revision::Head => match self.head() {
                Some(oid) => oid,
                None => return Ok(None),
            },
            Revision::Id(oid) => *oid,
        };
        let commit = self.store.commit(oid)?;
        Ok(Some(Snapshot { oid, commit }))
    }

    /// Resolve a storage path within a root tree
    pub fn entry_at(&self, root_tree: Oid, path: &[String]) -> Result<Option<TreeEntry>> {
        let mut tree = self.store.tree(root_tree)?;
        for (i, segment) in path.iter().enumerate() {
            let entry = match tree.get(segment) {
                Some(entry) => entry.clone(),
                None => return Ok(None),
            };
            if i == path.len() - 1 {
                return Ok(Some(entry));
            }
            if entry.kind != EntryKind::Directory {
                return Ok(None);
            }
            tree = self.store.tree(entry.oid)?;
        }
        Ok(None)
    }

    /// Start a transaction against the current head
    pub fn transaction(&self) -> Transaction {
        Transaction {
            base: self.head(),
            ops: Vec::new(),
        }
    }

    /// Commit a transaction: build the new tree, create the commit, advance
    /// the head. Serialized with every other writer.
    pub fn commit(
        &self,
        tx: Transaction,
        author: Signature,
        committer: Signature,
        message: &str,
    ) -> Result<CommitResult> {
        if tx.is_empty() {
            return Ok(CommitResult::NoChanges);
        }

        let _guard = self.write_lock.lock();

        let head_oid = self.head();
        if tx.base != head_oid {
            tracing::debug!(
                base = %tx.base.map(|oid| oid.short()).unwrap_or_default(),
                head = %head_oid.map(|oid| oid.short()).unwrap_or_default(),
                "head moved since transaction began, replaying against current head"
            );
        }

        let base_tree = match head_oid {
            Some(oid) => Some(self.store.commit(oid)?.tree),
            None => None,
        };

        let ops: Vec<(&[String], &Staged)> =
            tx.ops.iter().map(|(path, op)| (path.as_slice(), op)).collect();

        let new_tree = match (self.apply_level(base_tree, ops)?, base_tree) {
            // Nothing stored and nothing to store
            (None, None) => return Ok(CommitResult::NoChanges),
            (Some(tree), _) => tree,
            // The wiki emptied out; only the root tree may be empty
            (None, Some(_)) => self.store.put_tree(&Tree::new())?,
        };

        if Some(new_tree) == base_tree {
            return Ok(CommitResult::NoChanges);
        }

        let commit = Commit::new(head_oid, new_tree, author, committer, message);
        let oid = self.store.put_commit(&commit)?;
        self.store.set_head(oid)?;
        *self.head.write() = Some(oid);

        tracing::info!(commit = %oid.short(), tree = %new_tree.short(), "created commit");

        Ok(CommitResult::Committed(oid))
    }

    /// Apply staged ops at one hierarchy level, recursing into subtrees.
    ///
    /// Returns the address of the rebuilt tree, or None when the level ends
    /// up empty (the caller prunes the entry). Untouched entries keep their
    /// addresses, so unchanged subtrees are shared structurally.
    fn apply_level(
        &self,
        base: Option<Oid>,
        ops: Vec<(&[String], &Staged)>,
    ) -> Result<Option<Oid>> {
        let mut tree = match base {
            Some(oid) => self.store.tree(oid)?,
            None => Tree::new(),
        };

        let mut groups: HashMap<&String, Vec<(&[String], &Staged)>> = HashMap::new();

        for (path, op) in ops {
            let (name, rest) = path.split_first().expect("storage paths are never empty");
            if rest.is_empty() {
                match op {
                    Staged::Page(content) => {
                        let blob = self.store.put_blob(content)?;
                        tree.insert(name.clone(), TreeEntry::page(blob));
                    }
                    Staged::Redirect(target) => {
                        let blob = self.store.put_blob(target.as_bytes())?;
                        tree.insert(name.clone(), TreeEntry::redirect(blob));
                    }
                    Staged::Remove => {
                        tree.remove(name);
                    }
                }
            } else {
                groups.entry(name).or_default().push((path, op));
            }
        }

        for (name, group) in groups {
            let child_ops: Vec<(&[String], &Staged)> = group
                .into_iter()
                .map(|(path, op)| (&path[1..], op))
                .collect();

            let child_base = tree
                .get(name)
                .filter(|entry| entry.kind == EntryKind::Directory)
                .map(|entry| entry.oid);

            match self.apply_level(child_base, child_ops)? {
                Some(oid) => tree.insert(name.clone(), TreeEntry::directory(oid)),
                None => {
                    tree.remove(name);
                }
            }
        }

        if tree.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.store.put_tree(&tree)?))
        }
    }
}
