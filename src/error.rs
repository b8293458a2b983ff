use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ChangelogError {
    #[error("{name} environment variable is required")]
    MissingCredential { name: &'static str },

    #[error("Invalid config in {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    #[error("Could not find frontmatter in {path}")]
    MissingFrontmatter { path: PathBuf },

    #[error(
        "Version {recorded} from the changelog was not found in git tags \
         (rerun with --on-unknown-version regenerate to rebuild every entry)"
    )]
    InconsistentChangelog { recorded: String },

    #[error("GitHub API error: {0}")]
    GitHub(String),

    #[error("AI error: {0}")]
    Ai(String),

    #[error("Invalid changelog content: {0}")]
    Content(String),

    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChangelogError>;
