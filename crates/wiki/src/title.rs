//! Title normalization and storage-path encoding
//!
//! User-supplied titles are canonicalized into display titles
//! (`hello world` -> `Hello_world`, `special:recentChanges` ->
//! `Special:RecentChanges`) and then encoded into storage paths for the tree.
//!
//! A title containing `/` denotes a subpage hierarchy. Directory segments are
//! stored with a `#dir` suffix and a trailing slash stores its content under
//! a `#data` leaf, so a page can hold both its own content and child pages in
//! the same directory node: `Foo` lives next to `Foo#dir/Bar` without
//! collision.

use crate::error::TitleError;

/// Suffix marking a subpage directory in the tree
pub const DIR_MARKER: &str = "#dir";

/// Leaf name holding the content of a trailing-slash title
pub const DATA_MARKER: &str = "#data";

/// Recognized namespace prefixes, compared case-folded
const NAMESPACES: &[&str] = &[
    "special", "talk", "user", "template", "category", "help", "file",
];

/// A canonical wiki title
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    /// The canonical display form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encode this title into tree storage names.
    ///
    /// `Foo` -> `["Foo"]`, `Foo/Bar` -> `["Foo#dir", "Bar"]`,
    /// `Foo/` -> `["Foo#dir", "#data"]`.
    pub fn storage_path(&self) -> Vec<String> {
        let mut segments: Vec<&str> = self.0.split('/').collect();
        let last = segments.pop().expect("split always yields one segment");

        let mut path: Vec<String> = segments
            .iter()
            .map(|seg| format!("{}{}", seg, DIR_MARKER))
            .collect();

        if last.is_empty() {
            path.push(DATA_MARKER.to_string());
        } else {
            path.push(last.to_string());
        }

        path
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonicalize a user-supplied title.
///
/// Spaces become underscores; the first character is uppercased; a
/// `namespace:` prefix is validated against the recognized set and rendered
/// as `Namespace:Rest` with the remainder first-letter-capitalized only.
/// Idempotent: normalizing a canonical title returns it unchanged.
pub fn normalize(raw: &str) -> Result<Title, TitleError> {
    if raw.contains('#') {
        // The marker character would alias the storage encoding
        return Err(TitleError::InvalidTitle(raw.to_string()));
    }

    let replaced = raw.replace(' ', "_");
    if replaced.is_empty() {
        return Err(TitleError::InvalidTitle(raw.to_string()));
    }

    // Only the final segment may be empty (trailing slash = #data leaf)
    let segments: Vec<&str> = replaced.split('/').collect();
    if segments[..segments.len() - 1].iter().any(|seg| seg.is_empty()) {
        return Err(TitleError::InvalidTitle(raw.to_string()));
    }

    if let Some((namespace, rest)) = replaced.split_once(':') {
        if rest.is_empty() || !NAMESPACES.contains(&namespace.to_lowercase().as_str()) {
            return Err(TitleError::UnknownNamespace(namespace.to_string()));
        }
        return Ok(Title(format!("{}:{}", capitalize(namespace), first_cap(rest))));
    }

    Ok(Title(first_cap(&replaced)))
}

/// Decode a top-level storage name for display: `Name#dir` -> `Name/`
pub fn decode_name(name: &str) -> String {
    match name.strip_suffix(DIR_MARKER) {
        Some(stripped) => format!("{}/", stripped),
        None => name.to_string(),
    }
}

/// Uppercase only the first character, leaving the rest untouched
fn first_cap(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Uppercase the first character and lowercase the remainder
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
