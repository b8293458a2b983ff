use crate::error::Result;
use crate::github::PullRequestRecord;

pub const CHANGELOG_SYSTEM_PROMPT: &str = "You are a technical writer creating an external-facing changelog for our customers. Your goal is to communicate **high-level functionality changes**, not internal implementation details like code refactors, function changes, or technical restructuring.

### Changelog Format:
- Each release must include only the relevant sections:
  - **### New** (for new features)
  - **### Fixed** (for bug fixes)
  - **### Changed** (for modifications to existing functionality)
- Omit any section that has no changes.
- Each bullet point should be **short, clear, and impact-focused**.
- Keep bullet points between 15-120 characters.
- Use a single line per change; only use two lines for complex changes that cannot be simplified further.

### What to Include:
1. Extract only customer-facing changes of PRs.
2. **Choose only one category per change** (do not list the same item in multiple sections).
3. **Explain why the change matters** to users, avoiding technical jargon.
4. **Do not include PR numbers, internal function names, or implementation details.**
5. **Start each bullet point with a verb** in present tense (e.g., 'Add', 'Fix', 'Update').
6. **Group related changes** under a single bullet point to avoid fragmentation.

### Grouping Related Changes:
- Combine related changes into a single, comprehensive bullet point
- Include all relevant aspects of the feature or change
- Use commas or 'with' to connect related components

Example of good grouping:
✓ Add PDF export with custom headers, watermarks, and page numbering
✗ Add PDF export
✗ Add custom headers to PDF export
✗ Add watermarks to PDF export
✗ Add page numbering to PDF export

Follow this structure strictly. The focus should always be on how the changes affect customers, **not on how the changes were implemented.**";

/// Truncation marker appended to shortened PR bodies.
const ELLIPSIS: char = '…';

/// Cap a PR body at `max_chars` characters.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let mut out = body[..idx].trim_end().to_string();
            out.push(ELLIPSIS);
            out
        }
        None => body.to_string(),
    }
}

/// User message for one release: the PR list as pretty JSON, plus the diff
/// summary when one is supplied.
pub fn user_message(
    version: &str,
    prs: &[PullRequestRecord],
    max_body_chars: usize,
    diff: Option<&str>,
) -> Result<String> {
    let trimmed: Vec<PullRequestRecord> = prs
        .iter()
        .map(|pr| PullRequestRecord {
            body: truncate_body(&pr.body, max_body_chars),
            ..pr.clone()
        })
        .collect();
    let mut msg = format!(
        "Generate a changelog for Terraform Provider version {version} based on these Pull Requests:\n{}",
        serde_json::to_string_pretty(&trimmed)?
    );
    if let Some(diff) = diff {
        msg.push_str("\n\nSummary of code changes in this release:\n");
        msg.push_str(diff);
    }
    Ok(msg)
}
