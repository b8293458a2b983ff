//! Works out which releases are missing from the changelog.

use crate::config::{RunMode, UnknownVersionPolicy};
use crate::error::{ChangelogError, Result};
use crate::version::{VersionPair, VersionTag};

/// Versions that need an entry, oldest to newest.
///
/// `tags` must be newest first. `recorded` is the newest version already in
/// the changelog, or `None` when the file is missing or has no entries yet.
pub fn find_missing_versions(
    tags: &[VersionTag],
    recorded: Option<&str>,
    mode: RunMode,
    policy: UnknownVersionPolicy,
) -> Result<Vec<VersionPair>> {
    let Some(newest) = tags.first() else {
        tracing::info!("no version tags found");
        return Ok(Vec::new());
    };

    if mode == RunMode::Latest {
        tracing::info!("mode is 'latest', processing only version {newest}");
        return Ok(vec![VersionPair::new(newest.clone(), tags.get(1).cloned())]);
    }

    let Some(recorded) = recorded else {
        tracing::info!("no changelog entries yet, will process all {} versions", tags.len());
        return Ok(all_pairs(tags));
    };

    if newest.version_string() == recorded {
        tracing::info!("changelog is already up to date at version {newest}");
        return Ok(Vec::new());
    }

    let Some(index) = tags.iter().position(|t| t.version_string() == recorded) else {
        return match policy {
            UnknownVersionPolicy::Fail => Err(ChangelogError::InconsistentChangelog {
                recorded: recorded.to_string(),
            }),
            UnknownVersionPolicy::Regenerate => {
                tracing::warn!(
                    "version {recorded} from changelog not found in git tags, regenerating all {} versions",
                    tags.len()
                );
                Ok(all_pairs(tags))
            }
        };
    };

    let pairs: Vec<VersionPair> = (1..=index)
        .rev()
        .map(|i| VersionPair::new(tags[i - 1].clone(), Some(tags[i].clone())))
        .collect();
    tracing::info!("found {} missing versions to process", pairs.len());
    Ok(pairs)
}

fn all_pairs(tags: &[VersionTag]) -> Vec<VersionPair> {
    tags.iter()
        .enumerate()
        .rev()
        .map(|(i, tag)| VersionPair::new(tag.clone(), tags.get(i + 1).cloned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::resolve_tags;

    fn tags(names: &[&str]) -> Vec<VersionTag> {
        resolve_tags(names.iter().copied(), "test")
    }

    fn summary(pairs: &[VersionPair]) -> Vec<(String, Option<String>)> {
        pairs
            .iter()
            .map(|p| {
                (
                    p.version.version_string(),
                    p.previous.as_ref().map(|v| v.version_string()),
                )
            })
            .collect()
    }

    #[test]
    fn test_gap_after_recorded_version() {
        let tags = tags(&["v3.0.0", "v2.1.0", "v2.0.0"]);
        let pairs = find_missing_versions(
            &tags,
            Some("2.0.0"),
            RunMode::Auto,
            UnknownVersionPolicy::Fail,
        )
        .unwrap();
        assert_eq!(
            summary(&pairs),
            vec![
                ("2.1.0".into(), Some("2.0.0".into())),
                ("3.0.0".into(), Some("2.1.0".into())),
            ]
        );
    }

    #[test]
    fn test_empty_changelog_processes_every_tag() {
        let tags = tags(&["v3.0.0", "v2.1.0", "v2.0.0"]);
        let pairs =
            find_missing_versions(&tags, None, RunMode::Auto, UnknownVersionPolicy::Fail).unwrap();
        assert_eq!(
            summary(&pairs),
            vec![
                ("2.0.0".into(), None),
                ("2.1.0".into(), Some("2.0.0".into())),
                ("3.0.0".into(), Some("2.1.0".into())),
            ]
        );
    }

    #[test]
    fn test_up_to_date_is_empty() {
        let tags = tags(&["v3.0.0", "v2.1.0"]);
        let pairs = find_missing_versions(
            &tags,
            Some("3.0.0"),
            RunMode::Auto,
            UnknownVersionPolicy::Fail,
        )
        .unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_no_tags_is_empty() {
        let pairs =
            find_missing_versions(&[], None, RunMode::Latest, UnknownVersionPolicy::Fail).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_single_tag_has_no_previous() {
        let tags = tags(&["v0.1.0"]);
        let pairs =
            find_missing_versions(&tags, None, RunMode::Auto, UnknownVersionPolicy::Fail).unwrap();
        assert_eq!(summary(&pairs), vec![("0.1.0".into(), None)]);
    }

    #[test]
    fn test_latest_mode_ignores_recorded_version() {
        let tags = tags(&["v3.0.0", "v2.1.0", "v2.0.0"]);
        let pairs = find_missing_versions(
            &tags,
            Some("2.0.0"),
            RunMode::Latest,
            UnknownVersionPolicy::Fail,
        )
        .unwrap();
        assert_eq!(summary(&pairs), vec![("3.0.0".into(), Some("2.1.0".into()))]);

        let single = self::tags(&["v1.0.0"]);
        let pairs =
            find_missing_versions(&single, None, RunMode::Latest, UnknownVersionPolicy::Fail)
                .unwrap();
        assert_eq!(summary(&pairs), vec![("1.0.0".into(), None)]);
    }

    #[test]
    fn test_unknown_recorded_version_fails_by_default() {
        let tags = tags(&["v3.0.0", "v2.1.0"]);
        let err = find_missing_versions(
            &tags,
            Some("9.9.9"),
            RunMode::Auto,
            UnknownVersionPolicy::Fail,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ChangelogError::InconsistentChangelog { ref recorded } if recorded == "9.9.9"
        ));
    }

    #[test]
    fn test_unknown_recorded_version_can_regenerate() {
        let tags = tags(&["v3.0.0", "v2.1.0"]);
        let pairs = find_missing_versions(
            &tags,
            Some("9.9.9"),
            RunMode::Auto,
            UnknownVersionPolicy::Regenerate,
        )
        .unwrap();
        assert_eq!(
            summary(&pairs),
            vec![("2.1.0".into(), None), ("3.0.0".into(), Some("2.1.0".into()))]
        );
    }
}
