pub fn repo() -> String {
    "formalco/terraform-provider-formal".to_string()
}

pub fn label() -> String {
    "provider".to_string()
}

pub fn github_api_url() -> String {
    "https://api.github.com".to_string()
}

pub fn model() -> String {
    "gpt-5".to_string()
}

pub fn openai_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

pub fn anthropic_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

pub fn max_tokens() -> u32 {
    4096
}

pub fn timeout_secs() -> u64 {
    120
}

pub fn changelog_path() -> String {
    "docs/changelog/terraform-provider.mdx".to_string()
}

pub fn title() -> String {
    "Terraform Provider".to_string()
}

pub fn description() -> String {
    "Release notes for Formal Terraform Provider".to_string()
}

pub fn tag_test_marker() -> String {
    "test".to_string()
}

pub fn max_body_chars() -> usize {
    4000
}

pub fn max_diff_bytes() -> usize {
    20_000
}

pub fn exclude_paths() -> Vec<String> {
    vec!["go.sum".to_string()]
}

pub fn first_release_depth() -> usize {
    1
}
