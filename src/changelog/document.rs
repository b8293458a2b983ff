use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

use crate::config::InsertionOrder;
use crate::error::{ChangelogError, Result};

static FRONTMATTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\n.*?\n---\n").expect("valid frontmatter regex"));

static VERSION_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^##\s+(\d+\.\d+\.\d+)").expect("valid version heading regex")
});

/// An MDX changelog held in memory. Mutations only touch `content`; nothing
/// reaches disk until [`ChangelogDocument::save`].
#[derive(Debug, Clone)]
pub struct ChangelogDocument {
    path: PathBuf,
    content: String,
}

/// Default frontmatter for a changelog that does not exist yet.
pub fn default_header(title: &str, description: &str) -> String {
    format!("---\ntitle: \"{title}\"\ndescription: \"{description}\"\n---\n\n")
}

/// Length of the frontmatter block at the very start of `raw`, including the
/// closing `---\n`.
pub fn frontmatter_len(raw: &str) -> Option<usize> {
    FRONTMATTER_RE.find(raw).map(|m| m.end())
}

/// Highest `## X.Y.Z` heading in the document. Entries are not always in
/// descending order (`oldest-first` batches), so every heading is compared.
pub fn latest_recorded_version(raw: &str) -> Option<String> {
    VERSION_HEADING_RE
        .captures_iter(raw)
        .filter_map(|caps| Version::parse(&caps[1]).ok())
        .max()
        .map(|v| v.to_string())
}

impl ChangelogDocument {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Read an existing changelog. Returns `None` when the file is absent.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(Self::new(path, content))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the changelog, creating it (and its parent directories) with
    /// `header` when it does not exist.
    pub fn load_or_create(path: &Path, header: &str) -> Result<Self> {
        if let Some(doc) = Self::read(path)? {
            return Ok(doc);
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let doc = Self::new(path, header);
        doc.save()?;
        tracing::info!("created {}", path.display());
        Ok(doc)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn latest_version(&self) -> Option<String> {
        latest_recorded_version(&self.content)
    }

    /// Splice `block` directly after the frontmatter:
    /// `frontmatter + "\n" + block + "\n\n" + rest`.
    pub fn insert(&mut self, block: &str) -> Result<()> {
        let pos = frontmatter_len(&self.content).ok_or_else(|| {
            ChangelogError::MissingFrontmatter {
                path: self.path.clone(),
            }
        })?;
        let rest = self.content.split_off(pos);
        self.content.push('\n');
        self.content.push_str(block);
        self.content.push_str("\n\n");
        self.content.push_str(&rest);
        Ok(())
    }

    /// Insert rendered entries as one block. `entries` must be oldest first
    /// (the order versions are processed in); `order` decides which of them
    /// ends up directly under the frontmatter.
    pub fn insert_entries(&mut self, entries: &[String], order: InsertionOrder) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let block = match order {
            InsertionOrder::OldestFirst => entries.join("\n\n"),
            InsertionOrder::NewestFirst => entries
                .iter()
                .rev()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n\n"),
        };
        self.insert(&block)
    }

    /// Persist the document. Content goes to a temp file beside the target
    /// which then replaces it, so a failed write leaves the old file intact.
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(self.content.as_bytes())?;
        tmp.flush()?;

        // Temp files are created 0600; keep the mode the changelog had.
        let permissions = match fs::metadata(&self.path) {
            Ok(meta) => meta.permissions(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => new_file_permissions(tmp.as_file())?,
            Err(e) => return Err(e.into()),
        };
        tmp.as_file().set_permissions(permissions)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(unix)]
fn new_file_permissions(_file: &fs::File) -> io::Result<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions(file: &fs::File) -> io::Result<fs::Permissions> {
    Ok(file.metadata()?.permissions())
}
