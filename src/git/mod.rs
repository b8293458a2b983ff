//! Source-control queries, shelled out to the `git` binary.
//!
//! Every lookup is soft: a failing git command is logged and reported as
//! "nothing found" so the caller can skip the affected version.

use std::path::PathBuf;
use std::process::Command;

use chrono::NaiveDate;

/// Read-only view of the repository the release tags live in.
pub trait SourceControl {
    /// Tag names matching `v*`, newest version first.
    fn list_version_tags(&self) -> Vec<String>;

    /// Commit hash a tag points at.
    fn resolve_commit(&self, tag: &str) -> Option<String>;

    /// Commits in `(older, newer]`, newest first. Without `older`, the newest
    /// `depth` commits reachable from `newer`.
    fn commits_in_range(&self, newer: &str, older: Option<&str>, depth: usize) -> Vec<String>;

    /// Subject line of a commit.
    fn subject(&self, commit: &str) -> Option<String>;

    /// Committer date of a commit, in UTC.
    fn commit_date(&self, commit: &str) -> Option<NaiveDate>;

    /// `--stat` summary plus a unified diff capped at `max_bytes`, ignoring
    /// `exclude` paths.
    fn diff_summary(
        &self,
        older: &str,
        newer: &str,
        exclude: &[String],
        max_bytes: usize,
    ) -> Option<DiffSummary>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub stat: String,
    pub patch: String,
    pub truncated: bool,
}

impl DiffSummary {
    /// Text appended to the model prompt.
    pub fn to_prompt(&self) -> String {
        let mut out = format!("Files changed:\n{}\n", self.stat);
        if !self.patch.is_empty() {
            out.push_str("\nDiff:\n```diff\n");
            out.push_str(&self.patch);
            if !self.patch.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
            if self.truncated {
                out.push_str("(diff truncated)\n");
            }
        }
        out
    }
}

/// The real `git` CLI, run inside `root`.
pub struct Git {
    root: PathBuf,
}

impl Git {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn exec(&self, args: &[&str]) -> Option<String> {
        self.exec_with_env(args, &[])
    }

    fn exec_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Option<String> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.root);
        for (k, v) in env {
            cmd.env(k, v);
        }
        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("git {}: {e}", args.join(" "));
                return None;
            }
        };
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!("git {} failed: {}", args.join(" "), stderr.trim());
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn non_empty_lines(out: &str) -> Vec<String> {
    out.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

impl SourceControl for Git {
    fn list_version_tags(&self) -> Vec<String> {
        self.exec(&["tag", "-l", "v*", "--sort=-version:refname"])
            .map(|out| non_empty_lines(&out))
            .unwrap_or_default()
    }

    fn resolve_commit(&self, tag: &str) -> Option<String> {
        self.exec(&["rev-list", "-n", "1", tag])
            .filter(|hash| !hash.is_empty())
    }

    fn commits_in_range(&self, newer: &str, older: Option<&str>, depth: usize) -> Vec<String> {
        let out = match older {
            Some(older) => {
                let range = format!("{older}..{newer}");
                self.exec(&["log", &range, "--format=%H"])
            }
            None => {
                let limit = format!("--max-count={}", depth.max(1));
                self.exec(&["log", newer, &limit, "--format=%H"])
            }
        };
        out.map(|o| non_empty_lines(&o)).unwrap_or_default()
    }

    fn subject(&self, commit: &str) -> Option<String> {
        self.exec(&["log", "-1", "--format=%s", commit])
    }

    fn commit_date(&self, commit: &str) -> Option<NaiveDate> {
        let out = self.exec_with_env(
            &[
                "show",
                "-s",
                "--format=%cd",
                "--date=format-local:%Y-%m-%d",
                commit,
            ],
            &[("TZ", "UTC")],
        )?;
        NaiveDate::parse_from_str(out.trim(), "%Y-%m-%d").ok()
    }

    fn diff_summary(
        &self,
        older: &str,
        newer: &str,
        exclude: &[String],
        max_bytes: usize,
    ) -> Option<DiffSummary> {
        let range = format!("{older}..{newer}");
        let excludes: Vec<String> = exclude.iter().map(|p| format!(":(exclude){p}")).collect();

        let mut stat_args = vec!["diff", "--stat", range.as_str(), "--", "."];
        stat_args.extend(excludes.iter().map(String::as_str));
        let stat = self.exec(&stat_args)?;

        let mut patch_args = vec!["diff", range.as_str(), "--", "."];
        patch_args.extend(excludes.iter().map(String::as_str));
        let full = self.exec(&patch_args).unwrap_or_default();
        let (patch, truncated) = truncate_bytes(&full, max_bytes);

        Some(DiffSummary {
            stat,
            patch: patch.to_string(),
            truncated,
        })
    }
}

/// Cut `s` to at most `max` bytes on a char boundary.
pub fn truncate_bytes(s: &str, max: usize) -> (&str, bool) {
    if s.len() <= max {
        return (s, false);
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    (&s[..end], true)
}
