//! Line-based diffing between two page revisions
//!
//! A classic longest-common-subsequence edit script, grouped into hunks with
//! a few context lines the way unified diffs present changes. Absent
//! revisions diff as empty content.

/// How a line participates in a hunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTag {
    /// Present in both revisions
    Context,
    /// Only in the newer revision
    Added,
    /// Only in the older revision
    Removed,
}

/// One line of a hunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: DiffTag,
    pub text: String,
}

/// A contiguous group of changes with surrounding context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// 1-based line number of the first old line covered
    pub old_start: usize,
    /// Number of old lines covered (context + removed)
    pub old_lines: usize,
    /// 1-based line number of the first new line covered
    pub new_start: usize,
    /// Number of new lines covered (context + added)
    pub new_lines: usize,
    pub lines: Vec<DiffLine>,
}

/// Context lines kept on each side of a change
const CONTEXT: usize = 3;

struct ScriptEntry {
    tag: DiffTag,
    /// Old-side position before this entry
    old_pos: usize,
    /// New-side position before this entry
    new_pos: usize,
    text: String,
}

/// Diff two revisions line by line
pub fn diff_lines(old: &str, new: &str) -> Vec<Hunk> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);

    let script = edit_script(&old_lines, &new_lines);

    // Cluster changes whose context regions would touch into one hunk
    let changes: Vec<usize> = script
        .iter()
        .enumerate()
        .filter(|(_, e)| e.tag != DiffTag::Context)
        .map(|(i, _)| i)
        .collect();

    if changes.is_empty() {
        return Vec::new();
    }

    let mut clusters: Vec<(usize, usize)> = Vec::new();
    let mut start = changes[0];
    let mut end = changes[0];
    for &c in &changes[1..] {
        if c - end - 1 <= 2 * CONTEXT {
            end = c;
        } else {
            clusters.push((start, end));
            start = c;
            end = c;
        }
    }
    clusters.push((start, end));

    clusters
        .into_iter()
        .map(|(first, last)| {
            let lo = first.saturating_sub(CONTEXT);
            let hi = (last + CONTEXT + 1).min(script.len());
            build_hunk(&script[lo..hi])
        })
        .collect()
}

fn build_hunk(entries: &[ScriptEntry]) -> Hunk {
    let old_start = entries[0].old_pos + 1;
    let new_start = entries[0].new_pos + 1;

    let mut old_count = 0;
    let mut new_count = 0;
    let mut lines = Vec::with_capacity(entries.len());

    for entry in entries {
        match entry.tag {
            DiffTag::Context => {
                old_count += 1;
                new_count += 1;
            }
            DiffTag::Removed => old_count += 1,
            DiffTag::Added => new_count += 1,
        }
        lines.push(DiffLine {
            tag: entry.tag,
            text: entry.text.clone(),
        });
    }

    Hunk {
        old_start,
        old_lines: old_count,
        new_start,
        new_lines: new_count,
        lines,
    }
}

fn split_lines(s: &str) -> Vec<&str> {
    if s.is_empty() {
        Vec::new()
    } else {
        s.lines().collect()
    }
}

/// Full edit script via longest-common-subsequence dynamic programming
fn edit_script(old: &[&str], new: &[&str]) -> Vec<ScriptEntry> {
    let n = old.len();
    let m = new.len();

    // lcs[i][j] = LCS length of old[i..] and new[j..]
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut script = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < n && j < m {
        if old[i] == new[j] {
            script.push(ScriptEntry {
                tag: DiffTag::Context,
                old_pos: i,
                new_pos: j,
                text: old[i].to_string(),
            });
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            script.push(ScriptEntry {
                tag: DiffTag::Removed,
                old_pos: i,
                new_pos: j,
                text: old[i].to_string(),
            });
            i += 1;
        } else {
            script.push(ScriptEntry {
                tag: DiffTag::Added,
                old_pos: i,
                new_pos: j,
                text: new[j].to_string(),
            });
            j += 1;
        }
    }
    while i < n {
        script.push(ScriptEntry {
            tag: DiffTag::Removed,
            old_pos: i,
            new_pos: j,
            text: old[i].to_string(),
        });
        i += 1;
    }
    while j < m {
        script.push(ScriptEntry {
            tag: DiffTag::Added,
            old_pos: i,
            new_pos: j,
            text: new[j].to_string(),
        });
        j += 1;
    }

    script
}
