#![no_main]
use libfuzzer_sys::fuzz_target;
use provider_changelog::changelog::document::{frontmatter_len, latest_recorded_version};
use provider_changelog::changelog::ChangelogDocument;

fuzz_target!(|data: &str| {
    // Scanning and splicing arbitrary changelog text must never panic.
    let _ = latest_recorded_version(data);
    let Some(end) = frontmatter_len(data) else {
        return;
    };
    let mut doc = ChangelogDocument::new("fuzz.mdx", data);
    doc.insert("<Update label=\"x\">\n\n## 1.0.0\n\n</Update>")
        .expect("frontmatter was found");
    assert!(doc.content().starts_with(&data[..end]));
});
