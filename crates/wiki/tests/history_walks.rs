//! History reconstruction and diff workflows

mod common;

use common::WikiFixture;
use quill_wiki::{DiffTag, Revision, SaveOutcome};

#[test]
fn history_tracks_only_the_requested_page() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    svc.save("Tracked", "v1", "tracked v1", false).unwrap();
    svc.save("Noise", "n1", "noise", false).unwrap();
    svc.save("Tracked", "v2", "tracked v2", false).unwrap();
    svc.save("Noise", "n2", "more noise", false).unwrap();

    let messages: Vec<String> = svc
        .history("Tracked", &Revision::Head)
        .unwrap()
        .map(|r| r.unwrap().message)
        .collect();

    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("tracked v2"));
    assert!(messages[1].starts_with("tracked v1"));
}

#[test]
fn history_ordering_and_boundaries() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    svc.save("Page", "first", "create", false).unwrap();
    svc.delete("Page", "remove").unwrap();
    svc.save("Page", "second", "recreate", false).unwrap();

    let records: Vec<_> = svc
        .history("Page", &Revision::Head)
        .unwrap()
        .map(|r| r.unwrap())
        .collect();

    // Both lives of the page appear, newest first
    assert_eq!(records.len(), 2);
    assert!(records[0].message.starts_with("recreate"));
    assert!(records[1].message.starts_with("create"));
    assert!(records[0].ts_unix_ms >= records[1].ts_unix_ms);
}

#[test]
fn history_pagination_stops_early() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    for i in 0..20 {
        svc.save("Page", &format!("revision {}", i), "edit", false)
            .unwrap();
    }

    let first_page: Vec<_> = svc
        .history("Page", &Revision::Head)
        .unwrap()
        .take(5)
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(first_page.len(), 5);

    let all: Vec<_> = svc
        .history("Page", &Revision::Head)
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(all.len(), 20);
}

#[test]
fn history_from_named_revision() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    svc.save("Page", "v1", "one", false).unwrap();
    let mid = wiki.repo.head().unwrap();
    svc.save("Page", "v2", "two", false).unwrap();

    let from_mid: Vec<_> = svc
        .history("Page", &Revision::Id(mid))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(from_mid.len(), 1);
    assert_eq!(from_mid[0].id, mid);
}

#[test]
fn diff_between_two_revisions() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    svc.save("Page", "alpha\nbeta\ngamma", "one", false).unwrap();
    let old = wiki.repo.head().unwrap();
    svc.save("Page", "alpha\nBETA\ngamma", "two", false).unwrap();
    let new = wiki.repo.head().unwrap();

    let hunks = svc
        .diff("Page", &Revision::Id(old), &Revision::Id(new))
        .unwrap();
    assert_eq!(hunks.len(), 1);

    let removed: Vec<_> = hunks[0]
        .lines
        .iter()
        .filter(|l| l.tag == DiffTag::Removed)
        .collect();
    let added: Vec<_> = hunks[0]
        .lines
        .iter()
        .filter(|l| l.tag == DiffTag::Added)
        .collect();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].text, "beta");
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].text, "BETA");
}

#[test]
fn diff_treats_absent_content_as_empty() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    // Establish a pre-creation revision to diff from
    svc.save("Anchor", "anchor", "anchor", false).unwrap();
    let before = wiki.repo.head().unwrap();

    svc.save("Page", "line one\nline two", "create", false).unwrap();
    let after = wiki.repo.head().unwrap();

    let hunks = svc
        .diff("Page", &Revision::Id(before), &Revision::Id(after))
        .unwrap();
    assert_eq!(hunks.len(), 1);
    assert_eq!(hunks[0].old_lines, 0);
    assert_eq!(hunks[0].new_lines, 2);
    assert!(hunks[0].lines.iter().all(|l| l.tag == DiffTag::Added));
}

#[test]
fn diff_identical_revisions_is_empty() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    svc.save("Page", "steady", "init", false).unwrap();
    let head = wiki.repo.head().unwrap();

    let hunks = svc
        .diff("Page", &Revision::Id(head), &Revision::Head)
        .unwrap();
    assert!(hunks.is_empty());
}

#[test]
fn unchanged_save_does_not_lengthen_history() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    svc.save("Page", "body", "init", false).unwrap();
    assert_eq!(
        svc.save("Page", "body\n", "again", false).unwrap(),
        SaveOutcome::Unchanged
    );

    assert_eq!(svc.history("Page", &Revision::Head).unwrap().count(), 1);
    assert_eq!(svc.recent_commits(100).unwrap().len(), 1);
}

#[test]
fn minor_edit_flag_lands_in_message() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    svc.save("Page", "v1", "init", false).unwrap();
    svc.save("Page", "v2", "typo fix", true).unwrap();

    let records = svc.recent_commits(1).unwrap();
    assert!(records[0].message.contains("Note: Minor-Edit"));
    assert!(records[0].message.contains("Note: [[Page]]"));
}
