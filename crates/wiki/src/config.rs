//! Wiki configuration, read from the store's `config.toml`

use anyhow::{Context, Result};
use quill_core::Signature;
use serde::Deserialize;
use std::path::Path;

/// Wiki-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WikiConfig {
    pub wiki: WikiSection,
    pub committer: CommitterSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WikiSection {
    /// Display name of this wiki
    pub name: String,
    /// Canonical title of the front page
    pub main_page: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitterSection {
    pub name: String,
    pub email: String,
}

impl WikiConfig {
    /// Load configuration from a `config.toml` path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: WikiConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// The identity recorded as committer on every commit
    pub fn committer_signature(&self) -> Signature {
        Signature::new(self.committer.name.clone(), self.committer.email.clone())
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            wiki: WikiSection {
                name: "wiki".to_string(),
                main_page: "Main_Page".to_string(),
            },
            committer: CommitterSection {
                name: "Wiki Web Interface".to_string(),
                email: "root@wiki".to_string(),
            },
        }
    }
}
