pub mod defaults;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ai::Provider;
use crate::error::{ChangelogError, Result};

/// Contents of `changelog.toml`. Every field has a default, so a missing file
/// behaves like an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub github: GithubSection,
    #[serde(default)]
    pub ai: AiSection,
    #[serde(default)]
    pub changelog: ChangelogSection,
    #[serde(default)]
    pub commits: CommitsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubSection {
    #[serde(default = "defaults::repo")]
    pub repo: String,
    /// Label a pull request must carry to appear in the changelog.
    #[serde(default = "defaults::label")]
    pub label: String,
    #[serde(default = "defaults::github_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub lookup: LookupStrategy,
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            repo: defaults::repo(),
            label: defaults::label(),
            api_url: defaults::github_api_url(),
            lookup: LookupStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSection {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default = "defaults::model")]
    pub model: String,
    #[serde(default = "defaults::openai_url")]
    pub openai_url: String,
    #[serde(default = "defaults::anthropic_url")]
    pub anthropic_url: String,
    #[serde(default = "defaults::max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: defaults::model(),
            openai_url: defaults::openai_url(),
            anthropic_url: defaults::anthropic_url(),
            max_tokens: defaults::max_tokens(),
            timeout_secs: defaults::timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogSection {
    /// Changelog location relative to the docs checkout.
    #[serde(default = "defaults::changelog_path")]
    pub path: String,
    #[serde(default = "defaults::title")]
    pub title: String,
    #[serde(default = "defaults::description")]
    pub description: String,
    #[serde(default)]
    pub insertion_order: InsertionOrder,
    #[serde(default)]
    pub on_unknown_version: UnknownVersionPolicy,
    /// Tags containing this marker are never released. Empty disables it.
    #[serde(default = "defaults::tag_test_marker")]
    pub tag_test_marker: String,
}

impl Default for ChangelogSection {
    fn default() -> Self {
        Self {
            path: defaults::changelog_path(),
            title: defaults::title(),
            description: defaults::description(),
            insertion_order: InsertionOrder::default(),
            on_unknown_version: UnknownVersionPolicy::default(),
            tag_test_marker: defaults::tag_test_marker(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitsSection {
    /// Send a diff summary of the release range alongside the PR data.
    #[serde(default)]
    pub diff_context: bool,
    #[serde(default = "defaults::max_body_chars")]
    pub max_body_chars: usize,
    #[serde(default = "defaults::max_diff_bytes")]
    pub max_diff_bytes: usize,
    #[serde(default = "defaults::exclude_paths")]
    pub exclude_paths: Vec<String>,
    /// How many commits to scan for a release with no earlier tag.
    #[serde(default = "defaults::first_release_depth")]
    pub first_release_depth: usize,
}

impl Default for CommitsSection {
    fn default() -> Self {
        Self {
            diff_context: false,
            max_body_chars: defaults::max_body_chars(),
            max_diff_bytes: defaults::max_diff_bytes(),
            exclude_paths: defaults::exclude_paths(),
            first_release_depth: defaults::first_release_depth(),
        }
    }
}

/// Which versions a run should produce entries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Every tag newer than the changelog's latest entry.
    #[default]
    Auto,
    /// Only the newest tag.
    Latest,
}

impl RunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Auto => "auto",
            RunMode::Latest => "latest",
        }
    }
}

/// Order of this run's entries directly under the frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InsertionOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// How a pull request number from a commit subject is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LookupStrategy {
    /// Search merged PRs carrying the label; keep the first hit.
    #[default]
    Search,
    /// Fetch the PR by number, then check merge state and label.
    Fetch,
}

/// What to do when the changelog's latest version is not a known tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownVersionPolicy {
    #[default]
    Fail,
    /// Treat every tag as missing.
    Regenerate,
}

impl ToolConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| ChangelogError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Absolute changelog path inside the docs checkout.
    pub fn changelog_file(&self, docs_repo: &Path) -> PathBuf {
        docs_repo.join(&self.changelog.path)
    }
}
