//! Article operations: view, save, delete, move, list
//!
//! The service is the seam the presentation layer talks to. It owns no
//! state of its own beyond configuration and identity; every operation
//! normalizes the raw title, resolves a snapshot from the repository, and
//! returns plain data. Soft conditions come back as outcome enums, never as
//! errors.

use crate::config::WikiConfig;
use crate::diff::{diff_lines, Hunk};
use crate::error::Result;
use crate::history::{CommitRecord, History, Log};
use crate::message::{creation_note, MessageComposer, BLANKED_NOTE};
use crate::repo::{CommitResult, Repository, Revision, Snapshot};
use crate::title::{self, normalize, Title};
use quill_core::{EntryKind, Oid, Signature, TreeEntry};

/// One resolved page view (constructed per request, never persisted)
#[derive(Debug, Clone)]
pub struct Article {
    /// Canonical title
    pub title: Title,
    /// Storage path the title encodes to
    pub storage_path: Vec<String>,
    /// Page content, when the entry is a page
    pub content: Option<Vec<u8>>,
    /// The snapshot this view was resolved against
    pub source_commit: Option<Oid>,
    /// Whether any entry exists at the path
    pub exists: bool,
    /// Whether the entry is a redirect link
    pub is_redirect: bool,
    /// Redirect payload: the canonical target title
    pub redirect_target: Option<String>,
}

/// Outcome of a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The page did not exist and was created
    Created,
    /// The page existed and its content changed
    Updated,
    /// Identical content; no commit was created
    Unchanged,
    /// Blank content for a non-existent page; silent no-op
    EmptyNewArticle,
}

/// Outcome of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Outcome of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// The destination already resolves to an entry; nothing was committed
    TargetExists,
    NotFound,
}

/// Wiki article operations over one repository
pub struct ArticleService<'r> {
    repo: &'r Repository,
    config: WikiConfig,
    author: Signature,
    committer: Signature,
}

impl<'r> ArticleService<'r> {
    /// Create a service for one repository with the given editor identity
    pub fn new(repo: &'r Repository, config: WikiConfig, author: Signature) -> Self {
        let committer = config.committer_signature();
        Self {
            repo,
            config,
            author,
            committer,
        }
    }

    /// Resolve a raw title to an article view at the given revision
    pub fn article(&self, raw: &str, revision: &Revision) -> Result<Article> {
        let title = normalize(raw)?;
        let storage_path = title.storage_path();

        let snapshot = self.repo.snapshot(revision)?;
        let source_commit = snapshot.as_ref().map(|s| s.oid);
        let entry = self.resolve_entry(snapshot.as_ref(), &storage_path)?;

        let article = match entry {
            Some(ref e) if e.kind == EntryKind::Page => Article {
                title,
                storage_path,
                content: Some(self.repo.store().blob(e.oid)?),
                source_commit,
                exists: true,
                is_redirect: false,
                redirect_target: None,
            },
            Some(ref e) if e.kind == EntryKind::Redirect => {
                let payload = self.repo.store().blob(e.oid)?;
                let target = String::from_utf8(payload)
                    .map_err(|_| anyhow::anyhow!("Redirect target is not utf-8"))?;
                Article {
                    title,
                    storage_path,
                    content: None,
                    source_commit,
                    exists: true,
                    is_redirect: true,
                    redirect_target: Some(target),
                }
            }
            _ => Article {
                title,
                storage_path,
                content: None,
                source_commit,
                exists: false,
                is_redirect: false,
                redirect_target: None,
            },
        };

        Ok(article)
    }

    /// Save page content, creating the page if needed
    pub fn save(
        &self,
        raw: &str,
        content: &str,
        summary: &str,
        minor_edit: bool,
    ) -> Result<SaveOutcome> {
        let title = normalize(raw)?;
        let storage_path = title.storage_path();
        let normalized = normalize_content(content);

        let snapshot = self.repo.snapshot(&Revision::Head)?;
        let entry = self.resolve_entry(snapshot.as_ref(), &storage_path)?;

        let previous = match &entry {
            Some(e) if e.kind == EntryKind::Page => Some(self.repo.store().blob(e.oid)?),
            _ => None,
        };

        if previous.as_deref() == Some(normalized.as_bytes()) {
            tracing::debug!(title = %title, "save left content unchanged");
            return Ok(SaveOutcome::Unchanged);
        }

        let exists = entry.is_some();
        if !exists && content.trim().is_empty() {
            return Ok(SaveOutcome::EmptyNewArticle);
        }

        let mut composer = MessageComposer::new(&title, summary);
        if !composer.has_summary() {
            let previously_nonempty = previous
                .as_ref()
                .is_some_and(|prev| !prev.iter().all(u8::is_ascii_whitespace));
            if previously_nonempty && normalized.trim().is_empty() {
                composer.note(BLANKED_NOTE);
            } else if !exists {
                composer.note(creation_note(&normalized));
            }
        }
        if minor_edit {
            composer.minor_edit();
        }
        let message = composer.compose();

        let mut tx = self.repo.transaction();
        tx.put_page(&storage_path, normalized.as_bytes());

        match self
            .repo
            .commit(tx, self.author.clone(), self.committer.clone(), &message)?
        {
            CommitResult::Committed(_) => {
                tracing::info!(title = %title, created = !exists, "saved article");
                Ok(if exists {
                    SaveOutcome::Updated
                } else {
                    SaveOutcome::Created
                })
            }
            CommitResult::NoChanges => Ok(SaveOutcome::Unchanged),
        }
    }

    /// Delete a page
    pub fn delete(&self, raw: &str, summary: &str) -> Result<DeleteOutcome> {
        let title = normalize(raw)?;
        let storage_path = title.storage_path();

        let snapshot = self.repo.snapshot(&Revision::Head)?;
        if self.resolve_entry(snapshot.as_ref(), &storage_path)?.is_none() {
            return Ok(DeleteOutcome::NotFound);
        }

        let mut composer = MessageComposer::new(&title, summary);
        composer.note("Deleted page");
        let message = composer.compose();

        let mut tx = self.repo.transaction();
        tx.remove(&storage_path);

        match self
            .repo
            .commit(tx, self.author.clone(), self.committer.clone(), &message)?
        {
            CommitResult::Committed(_) => {
                tracing::info!(title = %title, "deleted article");
                Ok(DeleteOutcome::Deleted)
            }
            // A concurrent delete got there first
            CommitResult::NoChanges => Ok(DeleteOutcome::NotFound),
        }
    }

    /// Move a page, optionally leaving a redirect behind.
    ///
    /// Both the insert at the target and the removal (or redirect) at the
    /// source land in exactly one commit.
    pub fn rename(
        &self,
        from: &str,
        to: &str,
        summary: &str,
        leave_redirect: bool,
    ) -> Result<MoveOutcome> {
        let from_title = normalize(from)?;
        let to_title = normalize(to)?;
        let from_path = from_title.storage_path();
        let to_path = to_title.storage_path();

        let snapshot = self.repo.snapshot(&Revision::Head)?;

        let source = match self.resolve_entry(snapshot.as_ref(), &from_path)? {
            Some(entry) if entry.kind != EntryKind::Directory => entry,
            _ => return Ok(MoveOutcome::NotFound),
        };

        if self.resolve_entry(snapshot.as_ref(), &to_path)?.is_some() {
            return Ok(MoveOutcome::TargetExists);
        }

        let payload = self.repo.store().blob(source.oid)?;

        let mut composer = MessageComposer::new(&from_title, summary);
        composer.note(format!("Moved {} to {}", from_title, to_title));
        let message = composer.compose();

        let mut tx = self.repo.transaction();
        match source.kind {
            EntryKind::Page => tx.put_page(&to_path, &payload),
            EntryKind::Redirect => {
                let target = String::from_utf8(payload)
                    .map_err(|_| anyhow::anyhow!("Redirect target is not utf-8"))?;
                tx.put_redirect(&to_path, &target);
            }
            EntryKind::Directory => unreachable!("directories are filtered above"),
        }
        if leave_redirect {
            tx.put_redirect(&from_path, to_title.as_str());
        } else {
            tx.remove(&from_path);
        }

        self.repo
            .commit(tx, self.author.clone(), self.committer.clone(), &message)?;

        tracing::info!(from = %from_title, to = %to_title, leave_redirect, "moved article");
        Ok(MoveOutcome::Moved)
    }

    /// List top-level pages of a snapshot, decoded for display
    pub fn pages(&self, revision: &Revision) -> Result<Vec<String>> {
        let snapshot = match self.repo.snapshot(revision)? {
            Some(snapshot) => snapshot,
            None => return Ok(Vec::new()),
        };
        let tree = self.repo.store().tree(snapshot.commit.tree)?;
        Ok(tree
            .sorted_names()
            .into_iter()
            .map(title::decode_name)
            .collect())
    }

    /// History of changes to one page, most-recent-first
    pub fn history(&self, raw: &str, revision: &Revision) -> Result<History<'r>> {
        let title = normalize(raw)?;
        let start = self.repo.snapshot(revision)?.map(|s| s.oid);
        Ok(History::new(self.repo, title.storage_path(), start))
    }

    /// The most recent commits across the whole repository
    pub fn recent_commits(&self, limit: usize) -> Result<Vec<CommitRecord>> {
        let mut records = Vec::with_capacity(limit.min(64));
        for item in Log::new(self.repo, self.repo.head()).take(limit) {
            records.push(item?);
        }
        Ok(records)
    }

    /// Diff one page between two revisions (absent content diffs as empty)
    pub fn diff(&self, raw: &str, from: &Revision, to: &Revision) -> Result<Vec<Hunk>> {
        let title = normalize(raw)?;
        let storage_path = title.storage_path();

        let old = self.content_at(&storage_path, from)?;
        let new = self.content_at(&storage_path, to)?;
        Ok(diff_lines(&old, &new))
    }

    /// Create the configured main page iff the repository is empty.
    ///
    /// Returns true when the page was created.
    pub fn seed(&self, content: &str) -> Result<bool> {
        if self.repo.head().is_some() {
            return Ok(false);
        }
        let main_page = self.config.wiki.main_page.clone();
        let outcome = self.save(&main_page, content, "Initial commit", false)?;
        Ok(matches!(outcome, SaveOutcome::Created))
    }

    fn resolve_entry(
        &self,
        snapshot: Option<&Snapshot>,
        storage_path: &[String],
    ) -> Result<Option<TreeEntry>> {
        match snapshot {
            Some(snapshot) => Ok(self.repo.entry_at(snapshot.commit.tree, storage_path)?),
            None => Ok(None),
        }
    }

    fn content_at(&self, storage_path: &[String], revision: &Revision) -> Result<String> {
        let snapshot = self.repo.snapshot(revision)?;
        match self.resolve_entry(snapshot.as_ref(), storage_path)? {
            Some(e) if e.kind == EntryKind::Page => {
                let bytes = self.repo.store().blob(e.oid)?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => Ok(String::new()),
        }
    }
}

/// Ensure content ends with exactly one trailing newline
fn normalize_content(content: &str) -> String {
    let mut normalized = content.trim_end_matches('\n').to_string();
    normalized.push('\n');
    normalized
}
