//! Maps a release's commit range to the pull requests it shipped.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::git::SourceControl;
use crate::github::{PullRequestRecord, PullRequestSource};
use crate::version::VersionPair;

static PR_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d+)").expect("valid PR reference regex"));

/// First `#<digits>` reference in a commit subject.
pub fn pr_reference(subject: &str) -> Option<u64> {
    PR_REF_RE
        .captures(subject)
        .and_then(|caps| caps[1].parse().ok())
}

/// Distinct PR numbers referenced by `subjects`, in first-seen order.
pub fn extract_pr_numbers<I, S>(subjects: I) -> Vec<u64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    subjects
        .into_iter()
        .filter_map(|s| pr_reference(s.as_ref()))
        .filter(|n| seen.insert(*n))
        .collect()
}

/// Commits shipped in `pair.version` since `pair.previous`, newest first.
/// Empty when the release tag cannot be resolved.
pub fn release_commits(git: &dyn SourceControl, pair: &VersionPair, depth: usize) -> Vec<String> {
    let Some(newer) = git.resolve_commit(&pair.version.tag) else {
        tracing::warn!("could not find commit for version {}", pair.version);
        return Vec::new();
    };
    let older = pair.previous.as_ref().and_then(|prev| {
        let commit = git.resolve_commit(&prev.tag);
        if commit.is_none() {
            tracing::warn!("could not find commit for previous version {prev}");
        }
        commit
    });
    git.commits_in_range(&newer, older.as_deref(), depth)
}

/// Pull requests referenced by the commits of one release. Numbers the
/// source cannot resolve are skipped.
pub fn pull_requests_for_commits(
    git: &dyn SourceControl,
    source: &dyn PullRequestSource,
    commits: &[String],
) -> Result<Vec<PullRequestRecord>> {
    let subjects = commits.iter().filter_map(|c| git.subject(c));
    let numbers = extract_pr_numbers(subjects);
    if numbers.is_empty() {
        tracing::info!("no PR references found in {} commits", commits.len());
        return Ok(Vec::new());
    }
    tracing::info!("found {} unique PRs in commits", numbers.len());

    let mut records = Vec::with_capacity(numbers.len());
    for number in numbers {
        match source.lookup(number)? {
            Some(pr) => records.push(pr),
            None => tracing::warn!("PR #{number} not found or not eligible, skipping"),
        }
    }
    Ok(records)
}
