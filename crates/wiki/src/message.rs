//! Deterministic commit message composition
//!
//! A message is a summary line block followed by `Note: ` lines. Notes are
//! deduplicated and kept in insertion order so the same edit always produces
//! the same message. When the editor supplied no summary, the first note is
//! promoted to the summary position instead of being prefixed.

use crate::title::Title;

/// Builds a commit message from a user summary plus automatic notes
pub struct MessageComposer {
    summary: Option<String>,
    notes: Vec<String>,
    backlink: String,
}

impl MessageComposer {
    /// Start a message for an edit to `title` with the user-supplied summary
    /// (empty or whitespace-only means no summary was given)
    pub fn new(title: &Title, summary: &str) -> Self {
        let cleaned = clean_summary(summary);
        Self {
            summary: if cleaned.is_empty() { None } else { Some(cleaned) },
            notes: Vec::new(),
            backlink: format!("[[{}]]", title),
        }
    }

    /// Whether a user summary was supplied
    pub fn has_summary(&self) -> bool {
        self.summary.is_some()
    }

    /// Add an automatic note (deduplicated, insertion-ordered)
    pub fn note(&mut self, note: impl Into<String>) {
        let note = note.into();
        if !self.notes.contains(&note) {
            self.notes.push(note);
        }
    }

    /// Mark this edit as minor
    pub fn minor_edit(&mut self) {
        self.note("Minor-Edit");
    }

    /// Render the final message
    pub fn compose(mut self) -> String {
        let backlink = self.backlink.clone();
        self.note(backlink);

        let (summary, notes) = match self.summary {
            Some(summary) => (summary, self.notes),
            None => {
                // No summary: promote the first note to the summary line
                let mut rest = self.notes.into_iter();
                let first = rest.next().unwrap_or_default();
                (first, rest.collect())
            }
        };

        let mut message = summary;
        if !notes.is_empty() {
            message.push_str("\n\n");
            let lines: Vec<String> = notes.iter().map(|n| format!("Note: {}", n)).collect();
            message.push_str(&lines.join("\n"));
        }
        message
    }
}

/// Trim the summary and collapse any run of blank lines to single newlines
fn clean_summary(summary: &str) -> String {
    summary
        .trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default note for a page that did not previously exist
pub fn creation_note(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= 50 {
        format!("Created page with \"{}\"", trimmed)
    } else {
        let excerpt: String = trimmed.chars().take(47).collect();
        format!("Created page with \"{}…\"", excerpt)
    }
}

/// Default note for a page whose content was emptied
pub const BLANKED_NOTE: &str = "Blanked the page";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::title::normalize;

    fn title() -> Title {
        normalize("Main Page").unwrap()
    }

    #[test]
    fn test_summary_with_backlink() {
        let composer = MessageComposer::new(&title(), "fixed a typo");
        assert_eq!(composer.compose(), "fixed a typo\n\nNote: [[Main_Page]]");
    }

    #[test]
    fn test_no_summary_promotes_first_note() {
        let mut composer = MessageComposer::new(&title(), "");
        composer.note(creation_note("Hello world\n"));
        assert_eq!(
            composer.compose(),
            "Created page with \"Hello world\"\n\nNote: [[Main_Page]]"
        );
    }

    #[test]
    fn test_minor_edit_note() {
        let mut composer = MessageComposer::new(&title(), "tweak");
        composer.minor_edit();
        assert_eq!(
            composer.compose(),
            "tweak\n\nNote: Minor-Edit\nNote: [[Main_Page]]"
        );
    }

    #[test]
    fn test_notes_deduplicated_in_insertion_order() {
        let mut composer = MessageComposer::new(&title(), "edit");
        composer.note("alpha");
        composer.note("beta");
        composer.note("alpha");
        composer.minor_edit();
        composer.note("beta");
        assert_eq!(
            composer.compose(),
            "edit\n\nNote: alpha\nNote: beta\nNote: Minor-Edit\nNote: [[Main_Page]]"
        );
    }

    #[test]
    fn test_blank_line_runs_collapse() {
        let composer = MessageComposer::new(&title(), "  first\n\n\n\nsecond  ");
        assert_eq!(composer.compose(), "first\nsecond\n\nNote: [[Main_Page]]");
    }

    #[test]
    fn test_no_summary_no_notes_still_has_backlink() {
        let composer = MessageComposer::new(&title(), "   ");
        // The backlink is the only note, so it becomes the summary line
        assert_eq!(composer.compose(), "[[Main_Page]]");
    }

    #[test]
    fn test_creation_note_short_content() {
        assert_eq!(
            creation_note("Hello\n"),
            "Created page with \"Hello\""
        );
    }

    #[test]
    fn test_creation_note_exactly_fifty_chars() {
        let content = "x".repeat(50);
        assert_eq!(
            creation_note(&content),
            format!("Created page with \"{}\"", content)
        );
    }

    #[test]
    fn test_creation_note_truncates_long_content() {
        let content = "y".repeat(51);
        let expected = format!("Created page with \"{}…\"", "y".repeat(47));
        assert_eq!(creation_note(&content), expected);
    }

    #[test]
    fn test_creation_note_counts_characters_not_bytes() {
        let content = "ü".repeat(50);
        // 100 bytes but 50 characters: no truncation
        assert_eq!(
            creation_note(&content),
            format!("Created page with \"{}\"", content)
        );
    }

    #[test]
    fn test_deterministic_composition() {
        let build = || {
            let mut c = MessageComposer::new(&title(), "");
            c.note(BLANKED_NOTE);
            c.minor_edit();
            c.compose()
        };
        assert_eq!(build(), build());
        assert_eq!(
            build(),
            "Blanked the page\n\nNote: Minor-Edit\nNote: [[Main_Page]]"
        );
    }
}
