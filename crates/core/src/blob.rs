//! Blob storage with compression and content-addressing

use crate::hash::{hash_bytes, Oid};
use anyhow::Result;
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Default compression threshold in bytes (see `config.toml`)
pub const DEFAULT_COMPRESSION_THRESHOLD: usize = 4096;

/// Blob header format (version 1)
#[derive(Debug, Clone)]
pub struct BlobHeaderV1 {
    /// Magic bytes: "QLB1"
    pub magic: [u8; 4],
    /// Flags: bit0=compressed, bit1-7=reserved
    pub flags: u8,
    /// Original size (before compression)
    pub orig_len: u64,
    /// Stored size (after compression, if compressed)
    pub stored_len: u64,
}

impl BlobHeaderV1 {
    const MAGIC: [u8; 4] = *b"QLB1";
    const FLAG_COMPRESSED: u8 = 0b0000_0001;
    const LEN: usize = 21;

    /// Create a new blob header
    pub fn new(orig_len: u64, stored_len: u64, compressed: bool) -> Self {
        let flags = if compressed { Self::FLAG_COMPRESSED } else { 0 };
        Self {
            magic: Self::MAGIC,
            flags,
            orig_len,
            stored_len,
        }
    }

    /// Check if blob is compressed
    pub fn is_compressed(&self) -> bool {
        (self.flags & Self::FLAG_COMPRESSED) != 0
    }

    /// Serialize header to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::LEN);
        bytes.extend_from_slice(&self.magic);
        bytes.push(self.flags);
        bytes.extend_from_slice(&self.orig_len.to_le_bytes());
        bytes.extend_from_slice(&self.stored_len.to_le_bytes());
        bytes
    }

    /// Deserialize header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::LEN {
            anyhow::bail!(
                "Invalid header length: expected at least {} bytes, got {}",
                Self::LEN,
                bytes.len()
            );
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != Self::MAGIC {
            anyhow::bail!("Invalid magic bytes: expected {:?}, got {:?}", Self::MAGIC, magic);
        }

        let flags = bytes[4];
        let orig_len = u64::from_le_bytes([
            bytes[5], bytes[6], bytes[7], bytes[8],
            bytes[9], bytes[10], bytes[11], bytes[12],
        ]);
        let stored_len = u64::from_le_bytes([
            bytes[13], bytes[14], bytes[15], bytes[16],
            bytes[17], bytes[18], bytes[19], bytes[20],
        ]);

        Ok(Self {
            magic,
            flags,
            orig_len,
            stored_len,
        })
    }
}

/// Metadata for one stored blob
#[derive(Debug, Clone)]
pub struct BlobInfo {
    /// Content address of the uncompressed payload
    pub oid: Oid,
    /// Original size
    pub size: u64,
    /// Whether this blob is stored compressed
    pub compressed: bool,
}

/// Encode a payload into header + stored bytes, compressing above `threshold`
fn encode_blob(data: &[u8], threshold: usize) -> Result<(BlobInfo, Vec<u8>)> {
    let oid = hash_bytes(data);
    let orig_len = data.len() as u64;

    let (stored_data, stored_len, compressed) = if data.len() > threshold {
        match zstd::encode_all(data, 3) {
            Ok(compressed_data) => {
                // Only use compression if it actually reduces size
                if compressed_data.len() < data.len() {
                    let len = compressed_data.len() as u64;
                    (compressed_data, len, true)
                } else {
                    (data.to_vec(), orig_len, false)
                }
            }
            Err(_) => (data.to_vec(), orig_len, false),
        }
    } else {
        (data.to_vec(), orig_len, false)
    };

    let header = BlobHeaderV1::new(orig_len, stored_len, compressed);
    let mut serialized = header.to_bytes();
    serialized.extend_from_slice(&stored_data);

    let info = BlobInfo {
        oid,
        size: orig_len,
        compressed,
    };

    Ok((info, serialized))
}

/// Read and decompress a payload from serialized bytes (header + data)
fn decode_blob(serialized: &[u8]) -> Result<Vec<u8>> {
    let header = BlobHeaderV1::from_bytes(serialized)?;

    let data_start = BlobHeaderV1::LEN;
    let data_end = data_start + header.stored_len as usize;

    if serialized.len() < data_end {
        anyhow::bail!(
            "Invalid blob data length: expected at least {} bytes, got {}",
            data_end,
            serialized.len()
        );
    }

    let stored_data = &serialized[data_start..data_end];

    if header.is_compressed() {
        let decompressed = zstd::decode_all(stored_data)?;
        if decompressed.len() != header.orig_len as usize {
            anyhow::bail!(
                "Decompressed size mismatch: expected {} bytes, got {}",
                header.orig_len,
                decompressed.len()
            );
        }
        Ok(decompressed)
    } else {
        Ok(stored_data.to_vec())
    }
}

/// Content-addressed blob storage with a metadata cache
pub struct BlobStore {
    /// Store root (parent of objects/ and tmp/)
    root: PathBuf,
    /// In-memory cache: oid -> blob metadata
    cache: DashMap<Oid, Arc<BlobInfo>>,
    /// Payloads larger than this are stored zstd-compressed
    compression_threshold: usize,
}

impl BlobStore {
    /// Create a new blob store rooted at `root`
    pub fn new(root: PathBuf, compression_threshold: usize) -> Self {
        Self {
            root,
            cache: DashMap::new(),
            compression_threshold,
        }
    }

    /// Write a payload and return its content address.
    ///
    /// Idempotent: re-inserting identical content returns the existing
    /// address without touching disk again.
    pub fn put(&self, data: &[u8]) -> Result<Oid> {
        use std::fs;
        use std::io::Write;

        let oid = hash_bytes(data);
        let blob_path = self.blob_path(oid);
        if blob_path.exists() {
            return Ok(oid);
        }

        let (info, serialized) = encode_blob(data, self.compression_threshold)?;

        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Atomic write pattern: write to temp, fsync, rename
        let tmp_dir = self.root.join("tmp").join("ingest");
        fs::create_dir_all(&tmp_dir)?;

        let temp_path = tmp_dir.join(format!("{}-{}", uuid::Uuid::new_v4(), oid.to_hex()));

        let mut temp_file = fs::File::create(&temp_path)?;
        temp_file.write_all(&serialized)?;
        temp_file.sync_all()?;
        drop(temp_file);

        fs::rename(&temp_path, &blob_path)?;

        // Fsync parent directory for durability
        if let Some(parent) = blob_path.parent() {
            if let Ok(dir) = fs::File::open(parent) {
                let _ = dir.sync_all(); // Best effort, may fail on some filesystems
            }
        }

        self.cache.insert(oid, Arc::new(info));

        Ok(oid)
    }

    /// Read a payload by content address
    pub fn get(&self, oid: Oid) -> Result<Vec<u8>> {
        use std::fs;

        let blob_path = self.blob_path(oid);
        if !blob_path.exists() {
            anyhow::bail!("Blob not found: {}", oid.to_hex());
        }

        let serialized = fs::read(&blob_path)?;
        let data = decode_blob(&serialized)?;

        // Verify hash matches
        let actual = hash_bytes(&data);
        if actual != oid {
            anyhow::bail!(
                "Hash mismatch: expected {}, got {}",
                oid.to_hex(),
                actual.to_hex()
            );
        }

        Ok(data)
    }

    /// Check if a blob exists
    pub fn contains(&self, oid: Oid) -> bool {
        if self.cache.contains_key(&oid) {
            return true;
        }
        self.blob_path(oid).exists()
    }

    /// Get the filesystem path for a blob
    fn blob_path(&self, oid: Oid) -> PathBuf {
        let hex = oid.to_hex();
        // Fan-out: first 2 chars as prefix directory, rest as filename
        let prefix = &hex[0..2];
        let rest = &hex[2..];
        self.root.join("objects").join("blobs").join(prefix).join(rest)
    }
}
