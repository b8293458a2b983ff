use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use provider_changelog::cli::{Cli, Command};
use provider_changelog::output::json::JsonEnvelope;
use provider_changelog::output::{human, OutputFormat};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging; stdout is reserved for command output
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Change working directory if --dir is specified
    if let Some(ref dir) = cli.dir {
        std::env::set_current_dir(dir)?;
    }

    let format = OutputFormat::from_flag(cli.json);
    let result = match &cli.command {
        Command::Generate(args) => {
            provider_changelog::cli::generate::run(args, &cli.config, format)
        }
        Command::Pending(args) => provider_changelog::cli::pending::run(args, &cli.config, format),
        Command::Insert(args) => provider_changelog::cli::insert::run(args, format),
    };

    if let Err(e) = result {
        match format {
            OutputFormat::Json => JsonEnvelope::print_error(format!("{e:#}")),
            OutputFormat::Human => human::error(&format!("{e:#}")),
        }
        std::process::exit(1);
    }

    Ok(())
}
