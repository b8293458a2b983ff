//! One changelog run: find missing releases, draft each, write them once.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::ai::TextGenerator;
use crate::changelog::{default_header, find_missing_versions, Category, ChangelogDocument};
use crate::config::{InsertionOrder, RunMode, ToolConfig, UnknownVersionPolicy};
use crate::correlate::{pull_requests_for_commits, release_commits};
use crate::error::Result;
use crate::git::SourceControl;
use crate::github::PullRequestSource;
use crate::narrative::generate_entry;
use crate::output::CommandOutput;
use crate::version::{resolve_tags, VersionPair};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub mode: RunMode,
    pub insertion_order: InsertionOrder,
    pub on_unknown_version: UnknownVersionPolicy,
    pub diff_context: bool,
    pub max_body_chars: usize,
    pub max_diff_bytes: usize,
    pub exclude_paths: Vec<String>,
    pub first_release_depth: usize,
    pub tag_test_marker: String,
    /// Frontmatter written when the changelog does not exist yet.
    pub header: String,
    /// Generate entries but leave the changelog untouched.
    pub dry_run: bool,
}

impl PipelineOptions {
    pub fn from_config(config: &ToolConfig, mode: RunMode) -> Self {
        Self {
            mode,
            insertion_order: config.changelog.insertion_order,
            on_unknown_version: config.changelog.on_unknown_version,
            diff_context: config.commits.diff_context,
            max_body_chars: config.commits.max_body_chars,
            max_diff_bytes: config.commits.max_diff_bytes,
            exclude_paths: config.commits.exclude_paths.clone(),
            first_release_depth: config.commits.first_release_depth,
            tag_test_marker: config.changelog.tag_test_marker.clone(),
            header: default_header(&config.changelog.title, &config.changelog.description),
            dry_run: false,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&ToolConfig::default(), RunMode::Auto)
    }
}

/// Versions the changelog at `changelog` is missing, oldest first.
pub fn plan(
    git: &dyn SourceControl,
    changelog: &Path,
    options: &PipelineOptions,
) -> Result<Vec<VersionPair>> {
    let tags = resolve_tags(git.list_version_tags(), &options.tag_test_marker);
    let recorded = match ChangelogDocument::read(changelog)? {
        Some(doc) => doc.latest_version(),
        None => {
            tracing::info!("changelog file does not exist: {}", changelog.display());
            None
        }
    };
    match &recorded {
        Some(v) => tracing::info!("latest version in changelog: {v}"),
        None => tracing::info!("no versions found in changelog"),
    }
    find_missing_versions(
        &tags,
        recorded.as_deref(),
        options.mode,
        options.on_unknown_version,
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct PrLink {
    pub number: u64,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionReport {
    pub version: String,
    pub date: NaiveDate,
    pub categories: Vec<Category>,
    pub pull_requests: Vec<PrLink>,
}

/// Outcome of a run, printed by the CLI and exported to GitHub Actions.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub changelog: PathBuf,
    /// Every version the run set out to process, oldest first.
    pub planned: Vec<String>,
    /// Versions that got an entry.
    pub versions: Vec<VersionReport>,
    /// Versions with no qualifying pull requests.
    pub skipped: Vec<String>,
    pub written: bool,
    /// `<Update>` blocks drafted this run, oldest first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rendered: Vec<String>,
}

impl RunSummary {
    fn empty(changelog: &Path) -> Self {
        Self {
            changelog: changelog.to_path_buf(),
            planned: Vec::new(),
            versions: Vec::new(),
            skipped: Vec::new(),
            written: false,
            rendered: Vec::new(),
        }
    }

    /// `first` or `first - last` over the planned versions.
    pub fn version_range(&self) -> Option<String> {
        let first = self.planned.first()?;
        let last = self.planned.last()?;
        if first == last {
            Some(first.clone())
        } else {
            Some(format!("{first} - {last}"))
        }
    }

    /// Markdown list of the pull requests behind each generated entry.
    pub fn pr_list_markdown(&self) -> String {
        let mut out = String::new();
        for report in &self.versions {
            out.push_str(&format!("\n### {}\n", report.version));
            for pr in &report.pull_requests {
                out.push_str(&format!("- [#{}]({}): {}\n", pr.number, pr.url, pr.title));
            }
        }
        out
    }

    /// Append `version`, `versions_count` and `pr_list` to a GitHub Actions
    /// output file.
    pub fn write_github_output(&self, path: &Path) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "version={}", self.version_range().unwrap_or_default())?;
        writeln!(file, "versions_count={}", self.versions.len())?;
        writeln!(file, "pr_list={}", self.pr_list_markdown().replace('\n', "%0A"))?;
        Ok(())
    }
}

impl CommandOutput for RunSummary {
    fn human_display(&self) -> String {
        if self.planned.is_empty() {
            return "No versions need changelogs.".to_string();
        }
        if self.versions.is_empty() {
            return "All versions were skipped (no labelled pull requests)".to_string();
        }
        let verb = if self.written { "Generated" } else { "Drafted" };
        let noun = if self.versions.len() == 1 { "entry" } else { "entries" };
        let mut out = format!(
            "{verb} {} changelog {noun}\n   Version range: {}",
            self.versions.len(),
            self.version_range().unwrap_or_default()
        );
        if !self.skipped.is_empty() {
            out.push_str(&format!("\n   Skipped: {}", self.skipped.join(", ")));
        }
        if self.written {
            out.push_str(&format!("\n   Updated {}", self.changelog.display()));
        }
        out
    }
}

/// The collaborators of a run.
pub struct Pipeline<'a> {
    pub git: &'a dyn SourceControl,
    pub prs: &'a dyn PullRequestSource,
    pub ai: &'a dyn TextGenerator,
    pub options: PipelineOptions,
}

impl Pipeline<'_> {
    /// Plan and execute in one go.
    pub fn run(&self, changelog: &Path) -> Result<RunSummary> {
        let pairs = plan(self.git, changelog, &self.options)?;
        self.execute(changelog, &pairs)
    }

    /// Draft an entry for every pair (oldest first) and insert them all at
    /// once. Any error aborts before the changelog is touched.
    pub fn execute(&self, changelog: &Path, pairs: &[VersionPair]) -> Result<RunSummary> {
        let mut summary = RunSummary::empty(changelog);
        summary.planned = pairs.iter().map(|p| p.version.version_string()).collect();
        if pairs.is_empty() {
            return Ok(summary);
        }

        let mut rendered = Vec::with_capacity(pairs.len());
        for (i, pair) in pairs.iter().enumerate() {
            let version = pair.version.version_string();
            tracing::info!("processing version {}/{}: {pair}", i + 1, pairs.len());

            let date = self.release_date(pair);
            let commits = release_commits(self.git, pair, self.options.first_release_depth);
            tracing::info!("found {} commits", commits.len());

            let prs = pull_requests_for_commits(self.git, self.prs, &commits)?;
            if prs.is_empty() {
                tracing::info!("no eligible PRs found for version {version}, skipping");
                summary.skipped.push(version);
                continue;
            }

            let diff = if self.options.diff_context {
                self.diff_context(pair)
            } else {
                None
            };

            let entry = generate_entry(
                self.ai,
                &version,
                &prs,
                diff.as_deref(),
                date,
                self.options.max_body_chars,
            )?;
            tracing::debug!("generated changelog for {version}:\n{}", entry.render());

            rendered.push(entry.render());
            summary.versions.push(VersionReport {
                version,
                date,
                categories: entry.categories,
                pull_requests: prs
                    .into_iter()
                    .map(|pr| PrLink {
                        number: pr.number,
                        title: pr.title,
                        url: pr.url,
                    })
                    .collect(),
            });
        }

        summary.rendered = rendered;
        if summary.rendered.is_empty() || self.options.dry_run {
            return Ok(summary);
        }

        let mut doc = ChangelogDocument::load_or_create(changelog, &self.options.header)?;
        doc.insert_entries(&summary.rendered, self.options.insertion_order)?;
        doc.save()?;
        tracing::info!("updated {}", changelog.display());
        summary.written = true;
        Ok(summary)
    }

    /// Committer date of the release tag, or today when git cannot say.
    fn release_date(&self, pair: &VersionPair) -> NaiveDate {
        self.git
            .resolve_commit(&pair.version.tag)
            .and_then(|c| self.git.commit_date(&c))
            .unwrap_or_else(|| {
                tracing::warn!("no commit date for {}, using today", pair.version);
                Utc::now().date_naive()
            })
    }

    fn diff_context(&self, pair: &VersionPair) -> Option<String> {
        let previous = pair.previous.as_ref()?;
        let newer = self.git.resolve_commit(&pair.version.tag)?;
        let older = self.git.resolve_commit(&previous.tag)?;
        self.git
            .diff_summary(
                &older,
                &newer,
                &self.options.exclude_paths,
                self.options.max_diff_bytes,
            )
            .map(|d| d.to_prompt())
    }
}
