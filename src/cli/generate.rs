use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;

use crate::ai::{AiClient, Provider};
use crate::cli::{load_config, TargetArgs};
use crate::config::{InsertionOrder, LookupStrategy, ToolConfig, UnknownVersionPolicy};
use crate::error::ChangelogError;
use crate::git::Git;
use crate::github::GitHubClient;
use crate::output::{human, print_output, CommandOutput, OutputFormat};
use crate::pipeline::{plan, Pipeline, PipelineOptions};

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// GitHub repository (owner/name) the pull requests live in
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: Option<String>,

    /// GitHub token used for pull request lookups
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    /// LLM provider to use (overrides config)
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Model to use (overrides config)
    #[arg(long)]
    pub model: Option<String>,

    /// Pull request label required for inclusion (overrides config)
    #[arg(long)]
    pub label: Option<String>,

    /// Send a diff summary of each release to the model
    #[arg(long)]
    pub diff_context: bool,

    /// Order of new entries under the frontmatter
    #[arg(long, value_enum)]
    pub insertion_order: Option<InsertionOrder>,

    /// How PR numbers from commit subjects are resolved
    #[arg(long, value_enum)]
    pub lookup: Option<LookupStrategy>,

    /// What to do when the changelog's latest version is not a git tag
    #[arg(long, value_enum)]
    pub on_unknown_version: Option<UnknownVersionPolicy>,

    /// Print the generated entries instead of writing them
    #[arg(long)]
    pub dry_run: bool,

    /// GitHub Actions output file for version range and PR list
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,
}

impl GenerateArgs {
    fn apply_overrides(&self, config: &mut ToolConfig) {
        if let Some(repo) = &self.repo {
            config.github.repo = repo.clone();
        }
        if let Some(label) = &self.label {
            config.github.label = label.clone();
        }
        if let Some(lookup) = self.lookup {
            config.github.lookup = lookup;
        }
        if let Some(provider) = self.provider {
            config.ai.provider = provider;
        }
        if let Some(model) = &self.model {
            config.ai.model = model.clone();
        }
        if self.diff_context {
            config.commits.diff_context = true;
        }
        if let Some(order) = self.insertion_order {
            config.changelog.insertion_order = order;
        }
        if let Some(policy) = self.on_unknown_version {
            config.changelog.on_unknown_version = policy;
        }
    }

    fn ai_key(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAI => self.openai_api_key.as_deref(),
            Provider::Claude => self.anthropic_api_key.as_deref(),
        }
    }
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, ChangelogError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ChangelogError::MissingCredential { name })
}

pub fn run(args: &GenerateArgs, config_path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    args.apply_overrides(&mut config);

    // Credentials are checked before anything is read or written.
    let github_token = required(args.github_token.as_deref(), "GITHUB_TOKEN")?;
    let provider = config.ai.provider;
    let ai_key = required(args.ai_key(provider), provider.key_env())?;

    let changelog = args.target.changelog_file(&mut config);
    let mut options = PipelineOptions::from_config(&config, args.target.mode);
    options.dry_run = args.dry_run;
    let human_out = format == OutputFormat::Human;

    if human_out {
        human::header("Generating Terraform Provider changelog");
        human::info(&format!("Mode: {}", args.target.mode.as_str()));
        human::step(1, 4, "Finding all missing versions...");
    }

    let git = Git::new(std::env::current_dir()?);
    let pairs = plan(&git, &changelog, &options)?;

    if human_out && !pairs.is_empty() {
        human::info(&format!(
            "Will process {} versions in order (oldest to newest):",
            pairs.len()
        ));
        for (i, pair) in pairs.iter().enumerate() {
            println!("  {}. {pair}", i + 1);
        }
        human::step(2, 4, "Correlating commits with pull requests...");
    }

    let github = GitHubClient::new(
        &config.github.api_url,
        &config.github.repo,
        github_token,
        &config.github.label,
        config.github.lookup,
    );
    let endpoint = match provider {
        Provider::OpenAI => config.ai.openai_url.clone(),
        Provider::Claude => config.ai.anthropic_url.clone(),
    };
    let ai = AiClient::new(
        provider,
        ai_key.to_string(),
        config.ai.model.clone(),
        endpoint,
        config.ai.max_tokens,
        Duration::from_secs(config.ai.timeout_secs),
    );

    let pipeline = Pipeline {
        git: &git,
        prs: &github,
        ai: &ai,
        options,
    };
    if human_out && !pairs.is_empty() {
        human::step(3, 4, "Generating changelog with LLM...");
    }
    let summary = pipeline.execute(&changelog, &pairs)?;

    if human_out {
        for (report, text) in summary.versions.iter().zip(&summary.rendered) {
            human::block(&format!("Generated Changelog for {}:", report.version), text);
        }
        if !summary.skipped.is_empty() {
            human::warning(&format!(
                "No labelled pull requests for {}",
                summary.skipped.join(", ")
            ));
        }
        if summary.written {
            human::step(4, 4, "Inserted changelogs into docs");
        }
    }

    if !summary.versions.is_empty() {
        if let Some(out) = &args.github_output {
            summary.write_github_output(out)?;
        }
    }

    if human_out && summary.written {
        human::success(&summary.human_display());
    } else {
        print_output(&summary, format);
    }
    Ok(())
}
