use std::path::{Path, PathBuf};

use base64::Engine;
use clap::Args;

use crate::changelog::ChangelogDocument;
use crate::error::ChangelogError;
use crate::output::{human, print_output, MessageOutput, OutputFormat};

#[derive(Args)]
pub struct InsertArgs {
    /// Changelog file to update (must already exist)
    pub changelog: PathBuf,

    /// Base64-encoded content to insert
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub content: Option<String>,

    /// Read the content from a file instead of a base64 argument
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Decode the base64 transport encoding used by the release workflow.
pub fn decode_content(encoded: &str) -> Result<String, ChangelogError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ChangelogError::Content(format!("invalid base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| ChangelogError::Content(format!("not UTF-8: {e}")))
}

fn read_content(args: &InsertArgs) -> Result<String, ChangelogError> {
    match (&args.file, &args.content) {
        (Some(path), _) => Ok(std::fs::read_to_string(path)?),
        (None, Some(encoded)) => decode_content(encoded),
        (None, None) => Err(ChangelogError::Content("no content given".into())),
    }
}

/// Splice `content` into the existing changelog at `path`.
pub fn insert_into(path: &Path, content: &str) -> Result<(), ChangelogError> {
    let mut doc = ChangelogDocument::read(path)?.ok_or_else(|| {
        ChangelogError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        ))
    })?;
    doc.insert(content)?;
    doc.save()
}

pub fn run(args: &InsertArgs, format: OutputFormat) -> anyhow::Result<()> {
    let content = read_content(args)?;
    insert_into(&args.changelog, &content)?;
    let message = format!("Updated {}", args.changelog.display());
    match format {
        OutputFormat::Human => human::success(&message),
        OutputFormat::Json => print_output(
            &MessageOutput {
                message,
                detail: None,
            },
            format,
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_content() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("<Update>\n</Update>");
        assert_eq!(decode_content(&encoded).unwrap(), "<Update>\n</Update>");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_content("not base64!!"),
            Err(ChangelogError::Content(_))
        ));
    }

    #[test]
    fn test_insert_into_missing_file_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = insert_into(&tmp.path().join("none.mdx"), "x").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_insert_into_existing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("c.mdx");
        std::fs::write(&path, "---\ntitle: x\n---\nbody\n").unwrap();
        insert_into(&path, "NEW").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "---\ntitle: x\n---\n\nNEW\n\nbody\n"
        );
    }
}
