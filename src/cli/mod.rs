pub mod generate;
pub mod insert;
pub mod pending;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::config::{RunMode, ToolConfig};
use crate::error::Result;

#[derive(Parser)]
#[command(
    name = "provider-changelog",
    about = "Generate Terraform provider release notes from git tags, pull requests and an LLM",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to config file
    #[arg(short, long, global = true, default_value = "changelog.toml")]
    pub config: PathBuf,

    /// Working directory (the provider repository)
    #[arg(short, long, global = true)]
    pub dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate changelog entries for every release missing from the docs
    Generate(generate::GenerateArgs),

    /// List the releases that have no changelog entry yet
    Pending(pending::PendingArgs),

    /// Insert pre-generated content after a changelog's frontmatter
    Insert(insert::InsertArgs),
}

/// Where the changelog lives and which versions to consider.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Process every missing version, or only the newest tag
    #[arg(long, value_enum, default_value_t = RunMode::Auto)]
    pub mode: RunMode,

    /// Path to the documentation repository checkout
    #[arg(long, default_value = "docs-repo")]
    pub docs_repo_path: PathBuf,

    /// Changelog file relative to the docs checkout (overrides config)
    #[arg(long)]
    pub changelog: Option<String>,
}

impl TargetArgs {
    /// Changelog path after applying the CLI override.
    pub fn changelog_file(&self, config: &mut ToolConfig) -> PathBuf {
        if let Some(rel) = &self.changelog {
            config.changelog.path = rel.clone();
        }
        config.changelog_file(&self.docs_repo_path)
    }
}

pub fn load_config(path: &Path) -> Result<ToolConfig> {
    ToolConfig::load_or_default(path)
}
