//! Tree objects: one level of the page hierarchy

use crate::hash::Oid;
use ahash::AHashMap;
use anyhow::Result;

/// Type of tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Page content (points at a blob)
    Page,
    /// Subpage directory (points at another tree)
    Directory,
    /// Redirect link (points at a blob holding the target title)
    Redirect,
}

/// Entry in a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Kind of entry
    pub kind: EntryKind,
    /// Address of the object this entry names
    pub oid: Oid,
}

impl TreeEntry {
    /// Create a new page entry
    pub fn page(oid: Oid) -> Self {
        Self {
            kind: EntryKind::Page,
            oid,
        }
    }

    /// Create a new directory entry
    pub fn directory(oid: Oid) -> Self {
        Self {
            kind: EntryKind::Directory,
            oid,
        }
    }

    /// Create a new redirect entry
    pub fn redirect(oid: Oid) -> Self {
        Self {
            kind: EntryKind::Redirect,
            oid,
        }
    }
}

/// A tree maps storage names to entries at one hierarchy level.
///
/// Trees nest: a `Directory` entry's oid names another tree object, which is
/// how subpage directories hang below the root snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    entries: AHashMap<String, TreeEntry>,
}

impl Tree {
    const MAGIC: &'static [u8] = b"QLT1";

    /// Create a new empty tree
    pub fn new() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    /// Insert an entry into the tree
    pub fn insert(&mut self, name: impl Into<String>, entry: TreeEntry) {
        self.entries.insert(name.into(), entry);
    }

    /// Get an entry from the tree
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.get(name)
    }

    /// Remove an entry from the tree
    pub fn remove(&mut self, name: &str) -> Option<TreeEntry> {
        self.entries.remove(name)
    }

    /// Get the number of entries in the tree
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries with their names
    pub fn entries(&self) -> impl Iterator<Item = (&str, &TreeEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entry names sorted lexicographically
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Serialize the tree to bytes (TreeV1 format)
    ///
    /// Format:
    /// - magic: "QLT1" (4 bytes)
    /// - entry_count: u32
    /// - entries (sorted lexicographically by name):
    ///   - name_len: u16
    ///   - name_bytes: [u8; name_len]
    ///   - kind: u8 (0=page, 1=directory, 2=redirect)
    ///   - oid: [u8; 32]
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        bytes.extend_from_slice(Self::MAGIC);
        bytes.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());

        // Sort entries by name for deterministic serialization
        let mut sorted_entries: Vec<_> = self.entries.iter().collect();
        sorted_entries.sort_by(|(name_a, _), (name_b, _)| name_a.cmp(name_b));

        for (name, entry) in sorted_entries {
            let name_bytes = name.as_bytes();
            bytes.extend_from_slice(&(name_bytes.len() as u16).to_le_bytes());
            bytes.extend_from_slice(name_bytes);

            let kind_byte = match entry.kind {
                EntryKind::Page => 0u8,
                EntryKind::Directory => 1u8,
                EntryKind::Redirect => 2u8,
            };
            bytes.push(kind_byte);

            bytes.extend_from_slice(entry.oid.as_bytes());
        }

        bytes
    }

    /// Deserialize a tree from bytes (TreeV1 format)
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 8 {
            anyhow::bail!("Invalid tree data: too short");
        }

        if &bytes[0..4] != Self::MAGIC {
            anyhow::bail!("Invalid tree magic bytes");
        }

        let entry_count = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;

        let mut entries = AHashMap::new();
        let mut offset = 8;

        for _ in 0..entry_count {
            if offset + 2 > bytes.len() {
                anyhow::bail!("Invalid tree data: incomplete entry");
            }

            let name_len = u16::from_le_bytes([bytes[offset], bytes[offset + 1]]) as usize;
            offset += 2;

            if offset + name_len > bytes.len() {
                anyhow::bail!("Invalid tree data: name too long");
            }

            let name = std::str::from_utf8(&bytes[offset..offset + name_len])
                .map_err(|_| anyhow::anyhow!("Invalid tree data: name is not utf-8"))?
                .to_string();
            offset += name_len;

            if offset + 1 + 32 > bytes.len() {
                anyhow::bail!("Invalid tree data: incomplete entry metadata");
            }

            let kind = match bytes[offset] {
                0 => EntryKind::Page,
                1 => EntryKind::Directory,
                2 => EntryKind::Redirect,
                _ => anyhow::bail!("Invalid entry kind: {}", bytes[offset]),
            };
            offset += 1;

            let mut oid_bytes = [0u8; 32];
            oid_bytes.copy_from_slice(&bytes[offset..offset + 32]);
            offset += 32;

            entries.insert(
                name,
                TreeEntry {
                    kind,
                    oid: Oid::from_bytes(oid_bytes),
                },
            );
        }

        Ok(Self { entries })
    }

    /// Compute the content address of this tree
    ///
    /// Deterministic - same entries always produce the same address
    pub fn hash(&self) -> Oid {
        crate::hash::hash_bytes(&self.serialize())
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
