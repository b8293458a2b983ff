//! Semantic-version release tags (`v<major>.<minor>.<patch>`).

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use serde::Serialize;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v(\d+)\.(\d+)\.(\d+)$").expect("valid tag regex"));

/// A release tag and the version it names. `tag` is the git ref name,
/// `v` followed by the dotted version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionTag {
    pub tag: String,
    #[serde(serialize_with = "serialize_version")]
    pub version: Version,
}

fn serialize_version<S: serde::Serializer>(v: &Version, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(v)
}

impl VersionTag {
    /// Parse a strict `vX.Y.Z` tag. Anything else (pre-release suffixes,
    /// missing `v`, extra components) is rejected.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        let caps = TAG_RE.captures(tag)?;
        let num = |i: usize| caps[i].parse::<u64>().ok();
        let version = Version::new(num(1)?, num(2)?, num(3)?);
        Some(Self {
            tag: tag.to_string(),
            version,
        })
    }

    /// Build the tag for a bare `X.Y.Z` version string.
    pub fn from_version(version: &str) -> Option<Self> {
        Self::parse(&format!("v{}", version.trim()))
    }

    /// The dotted version without the `v` prefix.
    pub fn version_string(&self) -> String {
        self.version.to_string()
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

impl PartialOrd for VersionTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}

/// A version lacking a changelog entry, paired with the release before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionPair {
    pub version: VersionTag,
    pub previous: Option<VersionTag>,
}

impl VersionPair {
    pub fn new(version: VersionTag, previous: Option<VersionTag>) -> Self {
        Self { version, previous }
    }
}

impl fmt::Display for VersionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.previous {
            Some(prev) => write!(f, "{} (vs {prev})", self.version),
            None => write!(f, "{} (first version)", self.version),
        }
    }
}

/// Turn raw tag names into release tags, newest first.
///
/// Non-`vX.Y.Z` names and names containing `test_marker` are dropped; an
/// empty marker disables that filter. Duplicates collapse to one entry.
pub fn resolve_tags<I, S>(raw: I, test_marker: &str) -> Vec<VersionTag>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<VersionTag> = raw
        .into_iter()
        .filter(|t| test_marker.is_empty() || !t.as_ref().contains(test_marker))
        .filter_map(|t| VersionTag::parse(t.as_ref()))
        .collect();
    tags.sort_by(|a, b| b.cmp(a));
    tags.dedup_by(|a, b| a.version == b.version);
    tags
}
