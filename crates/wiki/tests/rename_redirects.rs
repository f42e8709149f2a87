//! Move workflows: redirects, occupied targets, missing sources

mod common;

use common::WikiFixture;
use quill_wiki::{MoveOutcome, Revision};

#[test]
fn move_leaves_redirect_behind() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    svc.save("Old Name", "The body", "init", false).unwrap();
    let head_before = wiki.repo.head();

    let outcome = svc.rename("Old Name", "New Name", "better title", true).unwrap();
    assert_eq!(outcome, MoveOutcome::Moved);

    // Exactly one commit for both mutations
    let head_after = wiki.repo.head();
    assert_ne!(head_before, head_after);
    let commit = wiki.repo.store().commit(head_after.unwrap()).unwrap();
    assert_eq!(commit.parent, head_before);

    let source = svc.article("Old Name", &Revision::Head).unwrap();
    assert!(source.exists);
    assert!(source.is_redirect);
    assert_eq!(source.redirect_target.as_deref(), Some("New_Name"));
    assert_eq!(source.content, None);

    let target = svc.article("New Name", &Revision::Head).unwrap();
    assert!(target.exists);
    assert!(!target.is_redirect);
    assert_eq!(target.content.as_deref(), Some(&b"The body\n"[..]));
}

#[test]
fn move_without_redirect_removes_source() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    svc.save("Old", "Body", "init", false).unwrap();
    let outcome = svc.rename("Old", "New", "", false).unwrap();
    assert_eq!(outcome, MoveOutcome::Moved);

    assert!(!svc.article("Old", &Revision::Head).unwrap().exists);
    assert_eq!(
        svc.article("New", &Revision::Head).unwrap().content.as_deref(),
        Some(&b"Body\n"[..])
    );
}

#[test]
fn move_to_occupied_target_fails_without_commit() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    svc.save("Source", "from here", "init", false).unwrap();
    svc.save("Target", "already here", "init", false).unwrap();
    let head_before = wiki.repo.head();

    let outcome = svc.rename("Source", "Target", "collide", true).unwrap();
    assert_eq!(outcome, MoveOutcome::TargetExists);

    // Head unchanged, both pages intact
    assert_eq!(wiki.repo.head(), head_before);
    assert_eq!(
        svc.article("Source", &Revision::Head).unwrap().content.as_deref(),
        Some(&b"from here\n"[..])
    );
    assert_eq!(
        svc.article("Target", &Revision::Head).unwrap().content.as_deref(),
        Some(&b"already here\n"[..])
    );
}

#[test]
fn move_missing_source_is_not_found() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    let outcome = svc.rename("Ghost", "Anywhere", "", true).unwrap();
    assert_eq!(outcome, MoveOutcome::NotFound);
    assert_eq!(wiki.repo.head(), None);
}

#[test]
fn move_onto_itself_is_target_exists() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    svc.save("Page", "content", "init", false).unwrap();
    let outcome = svc.rename("Page", "page", "", true).unwrap();
    assert_eq!(outcome, MoveOutcome::TargetExists);
}

#[test]
fn moving_a_redirect_carries_its_target() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    svc.save("A", "body", "init", false).unwrap();
    svc.rename("A", "B", "", true).unwrap();

    // A is now a redirect to B; move the redirect itself without a new one
    let outcome = svc.rename("A", "C", "", false).unwrap();
    assert_eq!(outcome, MoveOutcome::Moved);

    let moved = svc.article("C", &Revision::Head).unwrap();
    assert!(moved.is_redirect);
    assert_eq!(moved.redirect_target.as_deref(), Some("B"));
    assert!(!svc.article("A", &Revision::Head).unwrap().exists);
}

#[test]
fn move_subpage_into_top_level() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    svc.save("Draft/Article", "promoted text", "init", false).unwrap();
    let outcome = svc.rename("Draft/Article", "Article", "promote", true).unwrap();
    assert_eq!(outcome, MoveOutcome::Moved);

    assert_eq!(
        svc.article("Article", &Revision::Head).unwrap().content.as_deref(),
        Some(&b"promoted text\n"[..])
    );
    let leftover = svc.article("Draft/Article", &Revision::Head).unwrap();
    assert!(leftover.is_redirect);
    assert_eq!(leftover.redirect_target.as_deref(), Some("Article"));
}

#[test]
fn move_commit_message_records_both_titles() {
    let wiki = WikiFixture::new();
    let svc = wiki.service();

    svc.save("Before", "x", "init", false).unwrap();
    svc.rename("Before", "After", "", true).unwrap();

    let head = wiki.repo.head().unwrap();
    let message = wiki.repo.store().commit(head).unwrap().message;
    assert!(message.starts_with("Moved Before to After"));
    assert!(message.contains("[[Before]]"));
}
