use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use crate::cli::{load_config, TargetArgs};
use crate::config::UnknownVersionPolicy;
use crate::git::Git;
use crate::output::{print_output, CommandOutput, OutputFormat};
use crate::pipeline::{plan, PipelineOptions};
use crate::version::VersionPair;

#[derive(Args)]
pub struct PendingArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// What to do when the changelog's latest version is not a git tag
    #[arg(long, value_enum)]
    pub on_unknown_version: Option<UnknownVersionPolicy>,
}

#[derive(Debug, Serialize)]
pub struct PendingOutput {
    pub changelog: PathBuf,
    pub versions: Vec<VersionPair>,
}

impl CommandOutput for PendingOutput {
    fn human_display(&self) -> String {
        if self.versions.is_empty() {
            return format!("{} is up to date", self.changelog.display());
        }
        let noun = if self.versions.len() == 1 { "version" } else { "versions" };
        let mut out = format!(
            "{} {noun} missing from {} (oldest to newest):",
            self.versions.len(),
            self.changelog.display()
        );
        for (i, pair) in self.versions.iter().enumerate() {
            out.push_str(&format!("\n  {}. {pair}", i + 1));
        }
        out
    }
}

pub fn run(args: &PendingArgs, config_path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(policy) = args.on_unknown_version {
        config.changelog.on_unknown_version = policy;
    }
    let changelog = args.target.changelog_file(&mut config);
    let options = PipelineOptions::from_config(&config, args.target.mode);

    let git = Git::new(std::env::current_dir()?);
    let versions = plan(&git, &changelog, &options)?;
    print_output(&PendingOutput { changelog, versions }, format);
    Ok(())
}
