//! On-disk store management for blobs, trees, and commits

use crate::blob::{BlobStore, DEFAULT_COMPRESSION_THRESHOLD};
use crate::commit::Commit;
use crate::hash::{hash_bytes, Oid};
use crate::tree::Tree;
use anyhow::{Context, Result};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_CONFIG: &str = r#"# Quill Wiki Configuration
[store]
version = 1
blob_compression_threshold = 4096  # 4KB

[wiki]
name = "wiki"
main_page = "Main_Page"

[committer]
name = "Wiki Web Interface"
email = "root@wiki"
"#;

/// Main store for Quill wiki data
///
/// Manages the store directory structure:
/// ```text
/// <root>/
///   config.toml
///   HEAD
///   objects/
///     blobs/
///     trees/
///     commits/
///   tmp/
///     ingest/
/// ```
pub struct Store {
    /// Root of the store
    root: PathBuf,
    /// Blob storage
    blobs: BlobStore,
    /// Tree cache (oid -> tree)
    tree_cache: DashMap<Oid, Arc<Tree>>,
    /// Commit cache (oid -> commit)
    commit_cache: DashMap<Oid, Arc<Commit>>,
}

impl Store {
    /// Initialize a new store at the given root
    pub fn init(root: &Path) -> Result<Self> {
        use std::fs;

        if root.join("config.toml").exists() {
            anyhow::bail!("Store already initialized at {}", root.display());
        }

        fs::create_dir_all(root.join("objects/blobs"))?;
        fs::create_dir_all(root.join("objects/trees"))?;
        fs::create_dir_all(root.join("objects/commits"))?;
        fs::create_dir_all(root.join("tmp/ingest"))?;

        fs::write(root.join("config.toml"), DEFAULT_CONFIG)?;

        // Empty HEAD marks an empty repository
        fs::write(root.join("HEAD"), "")?;

        let threshold = read_compression_threshold(root)?;

        Ok(Self {
            root: root.to_path_buf(),
            blobs: BlobStore::new(root.to_path_buf(), threshold),
            tree_cache: DashMap::new(),
            commit_cache: DashMap::new(),
        })
    }

    /// Open an existing store
    pub fn open(root: &Path) -> Result<Self> {
        if !root.join("config.toml").exists() {
            anyhow::bail!("Store not initialized at {}", root.display());
        }

        let required_dirs = [
            "objects/blobs",
            "objects/trees",
            "objects/commits",
            "tmp/ingest",
        ];

        for dir in &required_dirs {
            if !root.join(dir).exists() {
                anyhow::bail!("Missing required directory: {}", dir);
            }
        }

        if !root.join("HEAD").exists() {
            anyhow::bail!("Missing HEAD file");
        }

        let threshold = read_compression_threshold(root)?;

        Ok(Self {
            root: root.to_path_buf(),
            blobs: BlobStore::new(root.to_path_buf(), threshold),
            tree_cache: DashMap::new(),
            commit_cache: DashMap::new(),
        })
    }

    /// Write a page payload, returning its content address
    pub fn put_blob(&self, data: &[u8]) -> Result<Oid> {
        self.blobs.put(data)
    }

    /// Read a page payload by content address
    pub fn blob(&self, oid: Oid) -> Result<Vec<u8>> {
        self.blobs.get(oid)
    }

    /// Write a tree to storage, returning its content address
    pub fn put_tree(&self, tree: &Tree) -> Result<Oid> {
        let oid = tree.hash();
        let path = self.object_path("trees", oid);

        // Idempotent: identical content is already stored
        if !path.exists() {
            atomic_write(&self.root.join("tmp/ingest"), &path, &tree.serialize())?;
        }

        self.tree_cache.insert(oid, Arc::new(tree.clone()));
        Ok(oid)
    }

    /// Read a tree from storage
    pub fn tree(&self, oid: Oid) -> Result<Tree> {
        use std::fs;

        if let Some(cached) = self.tree_cache.get(&oid) {
            return Ok((**cached).clone());
        }

        let path = self.object_path("trees", oid);
        if !path.exists() {
            anyhow::bail!("Tree not found: {}", oid);
        }

        let serialized = fs::read(&path)?;
        let tree = Tree::deserialize(&serialized)
            .with_context(|| format!("Corrupt tree object {}", oid))?;

        let computed = tree.hash();
        if computed != oid {
            tracing::warn!(expected = %oid, actual = %computed, "corrupt tree object");
            anyhow::bail!("Tree hash mismatch: expected {}, got {}", oid, computed);
        }

        self.tree_cache.insert(oid, Arc::new(tree.clone()));
        Ok(tree)
    }

    /// Write a commit to storage, returning its content address
    pub fn put_commit(&self, commit: &Commit) -> Result<Oid> {
        let serialized = commit.serialize()?;
        let oid = hash_bytes(&serialized);
        let path = self.object_path("commits", oid);

        if !path.exists() {
            atomic_write(&self.root.join("tmp/ingest"), &path, &serialized)?;
        }

        self.commit_cache.insert(oid, Arc::new(commit.clone()));
        Ok(oid)
    }

    /// Read a commit from storage
    pub fn commit(&self, oid: Oid) -> Result<Commit> {
        use std::fs;

        if let Some(cached) = self.commit_cache.get(&oid) {
            return Ok((**cached).clone());
        }

        let path = self.object_path("commits", oid);
        if !path.exists() {
            anyhow::bail!("Commit not found: {}", oid);
        }

        let serialized = fs::read(&path)?;

        let computed = hash_bytes(&serialized);
        if computed != oid {
            tracing::warn!(expected = %oid, actual = %computed, "corrupt commit object");
            anyhow::bail!("Commit hash mismatch: expected {}, got {}", oid, computed);
        }

        let commit = Commit::deserialize(&serialized)
            .with_context(|| format!("Corrupt commit object {}", oid))?;

        self.commit_cache.insert(oid, Arc::new(commit.clone()));
        Ok(commit)
    }

    /// Read the head pointer (None for an empty repository)
    pub fn head(&self) -> Result<Option<Oid>> {
        let content = std::fs::read_to_string(self.root.join("HEAD"))
            .context("Failed to read HEAD")?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(Some(Oid::from_hex(trimmed).context("Corrupt HEAD file")?))
    }

    /// Advance the head pointer
    pub fn set_head(&self, oid: Oid) -> Result<()> {
        let mut content = oid.to_hex();
        content.push('\n');
        atomic_write(
            &self.root.join("tmp/ingest"),
            &self.root.join("HEAD"),
            content.as_bytes(),
        )
    }

    /// Get the object path for a given kind and address
    fn object_path(&self, kind: &str, oid: Oid) -> PathBuf {
        // Fan-out structure: objects/<kind>/<hh>/<rest>
        let hex = oid.to_hex();
        let (prefix, suffix) = hex.split_at(2);
        self.root.join("objects").join(kind).join(prefix).join(suffix)
    }

    /// Path of the store's config file
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Get the store root path
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn read_compression_threshold(root: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(root.join("config.toml"))
        .context("Failed to read config.toml")?;
    let config: toml::Value = content.parse().context("Failed to parse config.toml as TOML")?;

    Ok(config
        .get("store")
        .and_then(|s| s.get("blob_compression_threshold"))
        .and_then(|v| v.as_integer())
        .map(|v| v as usize)
        .unwrap_or(DEFAULT_COMPRESSION_THRESHOLD))
}

/// Atomic write helper
///
/// Writes data to a temporary file, fsyncs it, then renames it to the target
/// path.
pub fn atomic_write(tmp_dir: &Path, target: &Path, data: &[u8]) -> Result<()> {
    use std::fs;
    use std::io::Write;

    fs::create_dir_all(tmp_dir)?;

    let temp_path = tmp_dir.join(format!("{}", uuid::Uuid::new_v4()));

    let mut temp_file = fs::File::create(&temp_path)?;
    temp_file.write_all(data)?;
    temp_file.sync_all()?;
    drop(temp_file);

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    // Rename is atomic on POSIX systems
    fs::rename(&temp_path, target)?;

    // Fsync parent directory for durability
    if let Some(parent) = target.parent() {
        if let Ok(dir) = fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}
