use chrono::NaiveDate;
use serde::Serialize;

/// Changelog category, inferred from the `###` sections in the model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    NewFeatures,
    BugFixes,
    Improvements,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::NewFeatures,
        Category::BugFixes,
        Category::Improvements,
    ];

    /// Section heading the model writes for this category.
    pub fn heading(self) -> &'static str {
        match self {
            Category::NewFeatures => "### New",
            Category::BugFixes => "### Fixed",
            Category::Improvements => "### Changed",
        }
    }

    /// Tag shown on the rendered `<Update>` block.
    pub fn label(self) -> &'static str {
        match self {
            Category::NewFeatures => "New Features",
            Category::BugFixes => "Bug Fixes",
            Category::Improvements => "Improvements",
        }
    }
}

/// One release in the changelog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogEntry {
    pub date: NaiveDate,
    pub categories: Vec<Category>,
    pub version: String,
    pub body: String,
}

impl ChangelogEntry {
    /// Build an entry from a raw model reply.
    pub fn from_model_output(version: &str, date: NaiveDate, raw: &str) -> Self {
        let body = strip_title(raw).trim().to_string();
        let categories = detect_categories(&body);
        Self {
            date,
            categories,
            version: version.to_string(),
            body,
        }
    }

    /// Render as a Mintlify `<Update>` block.
    pub fn render(&self) -> String {
        let tags = if self.categories.is_empty() {
            String::new()
        } else {
            let labels: Vec<&str> = self.categories.iter().map(|c| c.label()).collect();
            // serializing a Vec<&str> cannot fail
            let json = serde_json::to_string(&labels).unwrap_or_default();
            format!(" tags={{{json}}}")
        };
        format!(
            "<Update label=\"{}\"{tags}>\n\n## {}\n\n{}\n\n</Update>",
            date_label(self.date),
            self.version,
            self.body,
        )
    }
}

/// Drop a leading top-level title (`# ...` or `## ...`) that precedes the
/// first `### ` section. Replies that already start at a section, or that
/// have no section at all, are left alone.
pub fn strip_title(raw: &str) -> &str {
    if raw.starts_with('#') && !raw.starts_with("###") {
        if let Some(idx) = raw.find("### ") {
            return &raw[idx..];
        }
    }
    raw
}

/// Categories present in `body`, each at most once, in fixed order.
pub fn detect_categories(body: &str) -> Vec<Category> {
    Category::ALL
        .into_iter()
        .filter(|c| body.contains(c.heading()))
        .collect()
}

/// `October 5, 2025`
pub fn date_label(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
