//! In-memory stand-ins for git, GitHub and the model, shared by unit tests.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::NaiveDate;

use crate::ai::TextGenerator;
use crate::error::{ChangelogError, Result};
use crate::git::{DiffSummary, SourceControl};
use crate::github::{PullRequestRecord, PullRequestSource};

fn commit_of(tag: &str) -> String {
    format!("commit-{tag}")
}

#[derive(Default)]
pub struct FakeGit {
    tags: Vec<String>,
    ranges: HashMap<(String, Option<String>), Vec<String>>,
    subjects: HashMap<String, String>,
    dates: HashMap<String, NaiveDate>,
}

impl FakeGit {
    /// A repository where every listed tag resolves to `commit-<tag>`.
    pub fn new(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_range(mut self, newer: &str, older: Option<&str>, commits: &[(&str, &str)]) -> Self {
        let key = (commit_of(newer), older.map(commit_of));
        let hashes = commits.iter().map(|(h, _)| h.to_string()).collect();
        for (hash, subject) in commits {
            self.subjects.insert(hash.to_string(), subject.to_string());
        }
        self.ranges.insert(key, hashes);
        self
    }

    pub fn with_date(mut self, tag: &str, date: NaiveDate) -> Self {
        self.dates.insert(commit_of(tag), date);
        self
    }
}

impl SourceControl for FakeGit {
    fn list_version_tags(&self) -> Vec<String> {
        self.tags.clone()
    }

    fn resolve_commit(&self, tag: &str) -> Option<String> {
        self.tags.iter().any(|t| t == tag).then(|| commit_of(tag))
    }

    fn commits_in_range(&self, newer: &str, older: Option<&str>, depth: usize) -> Vec<String> {
        let key = (newer.to_string(), older.map(String::from));
        let mut commits = self.ranges.get(&key).cloned().unwrap_or_default();
        if older.is_none() {
            commits.truncate(depth);
        }
        commits
    }

    fn subject(&self, commit: &str) -> Option<String> {
        self.subjects.get(commit).cloned()
    }

    fn commit_date(&self, commit: &str) -> Option<NaiveDate> {
        self.dates.get(commit).copied()
    }

    fn diff_summary(
        &self,
        older: &str,
        newer: &str,
        _exclude: &[String],
        _max_bytes: usize,
    ) -> Option<DiffSummary> {
        Some(DiffSummary {
            stat: format!("{older}..{newer}"),
            ..Default::default()
        })
    }
}

pub struct FakePrs {
    known: Vec<u64>,
    fail: bool,
    lookups: RefCell<Vec<u64>>,
}

impl FakePrs {
    /// Only the listed numbers resolve.
    pub fn with(known: &[u64]) -> Self {
        Self {
            known: known.to_vec(),
            fail: false,
            lookups: RefCell::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with(&[])
        }
    }

    pub fn lookups(&self) -> Vec<u64> {
        self.lookups.borrow().clone()
    }
}

impl PullRequestSource for FakePrs {
    fn lookup(&self, number: u64) -> Result<Option<PullRequestRecord>> {
        self.lookups.borrow_mut().push(number);
        if self.fail {
            return Err(ChangelogError::GitHub("500 - boom".into()));
        }
        Ok(self.known.contains(&number).then(|| PullRequestRecord {
            number,
            title: format!("PR {number}"),
            url: format!("https://github.com/o/r/pull/{number}"),
            body: format!("Body of {number}"),
            labels: vec!["provider".into()],
        }))
    }
}

/// Replies with canned responses in order; an exhausted queue is an error.
pub struct FakeAi {
    replies: RefCell<Vec<String>>,
    prompts: RefCell<Vec<String>>,
}

impl FakeAi {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            replies: RefCell::new(replies.iter().rev().map(|r| r.to_string()).collect()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl TextGenerator for FakeAi {
    fn complete(&self, _system_prompt: &str, user_msg: &str) -> Result<String> {
        self.prompts.borrow_mut().push(user_msg.to_string());
        self.replies
            .borrow_mut()
            .pop()
            .ok_or_else(|| ChangelogError::Ai("OpenAI API error (500): unavailable".into()))
    }
}
