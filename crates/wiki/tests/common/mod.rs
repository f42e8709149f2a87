//! Shared fixtures for wiki workflow tests

use quill_core::Signature;
use quill_wiki::{ArticleService, Repository, WikiConfig};
use tempfile::TempDir;

pub struct WikiFixture {
    // Kept alive so the store directory survives the test
    _tmp: TempDir,
    pub repo: Repository,
}

impl WikiFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let repo = Repository::init(tmp.path()).expect("init repository");
        Self { _tmp: tmp, repo }
    }

    pub fn service(&self) -> ArticleService<'_> {
        ArticleService::new(
            &self.repo,
            WikiConfig::default(),
            Signature::new("Ada Editor", "ada@example.org"),
        )
    }
}
