//! Drafts one release's changelog prose with the text-generation API.

use chrono::NaiveDate;

use crate::ai::prompt::{user_message, CHANGELOG_SYSTEM_PROMPT};
use crate::ai::TextGenerator;
use crate::changelog::ChangelogEntry;
use crate::error::Result;
use crate::github::PullRequestRecord;

/// Ask the model for `version`'s changelog and shape the reply into an entry.
/// A failed model call is returned as-is; there is no retry.
pub fn generate_entry(
    ai: &dyn TextGenerator,
    version: &str,
    prs: &[PullRequestRecord],
    diff: Option<&str>,
    date: NaiveDate,
    max_body_chars: usize,
) -> Result<ChangelogEntry> {
    let user_msg = user_message(version, prs, max_body_chars, diff)?;
    let raw = ai.complete(CHANGELOG_SYSTEM_PROMPT, &user_msg)?;
    Ok(ChangelogEntry::from_model_output(version, date, &raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::Category;
    use crate::error::ChangelogError;
    use crate::testing::FakeAi;

    fn pr() -> PullRequestRecord {
        PullRequestRecord {
            number: 5,
            title: "Add listener rules".into(),
            url: "https://github.com/o/r/pull/5".into(),
            body: "Long description".into(),
            labels: vec!["provider".into()],
        }
    }

    #[test]
    fn test_reply_is_cleaned_and_categorised() {
        let ai = FakeAi::replying(&["# Terraform Provider 1.4.0\n\n### Changed\n- Improve listener rule validation\n"]);
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let entry = generate_entry(&ai, "1.4.0", &[pr()], None, date, 100).unwrap();

        assert_eq!(entry.body, "### Changed\n- Improve listener rule validation");
        assert_eq!(entry.categories, vec![Category::Improvements]);
        assert_eq!(entry.version, "1.4.0");
        assert!(ai.prompts()[0].contains("version 1.4.0"));
    }

    #[test]
    fn test_diff_context_reaches_prompt() {
        let ai = FakeAi::replying(&["### Fixed\n- Fix a crash on empty policies"]);
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        generate_entry(&ai, "1.4.1", &[pr()], Some("Files changed:\n x.go\n"), date, 100).unwrap();
        assert!(ai.prompts()[0].contains("Files changed:\n x.go"));
    }

    #[test]
    fn test_model_failure_propagates() {
        let ai = FakeAi::replying(&[]);
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let err = generate_entry(&ai, "1.4.1", &[pr()], None, date, 100).unwrap_err();
        assert!(matches!(err, ChangelogError::Ai(_)));
    }
}
