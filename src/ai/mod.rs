pub mod prompt;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ChangelogError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Claude,
    #[default]
    #[serde(rename = "openai")]
    #[value(name = "openai")]
    OpenAI,
}

impl Provider {
    /// Environment variable holding this provider's API key.
    pub fn key_env(self) -> &'static str {
        match self {
            Provider::Claude => "ANTHROPIC_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }
}

/// Anything that turns a system + user prompt into a completion.
pub trait TextGenerator {
    fn complete(&self, system_prompt: &str, user_msg: &str) -> Result<String>;
}

pub struct AiClient {
    provider: Provider,
    api_key: String,
    model: String,
    endpoint: String,
    max_tokens: u32,
    agent: ureq::Agent,
}

// Claude API types
#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

// OpenAI API types
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl AiClient {
    pub fn new(
        provider: Provider,
        api_key: String,
        model: String,
        endpoint: String,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::config::Config::builder()
                .timeout_global(Some(timeout))
                .http_status_as_error(false)
                .build(),
        );
        Self {
            provider,
            api_key,
            model,
            endpoint,
            max_tokens,
            agent,
        }
    }

    fn call_claude(&self, system_prompt: &str, user_msg: &str) -> Result<String> {
        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: system_prompt.to_string(),
            messages: vec![Message {
                role: "user".into(),
                content: user_msg.into(),
            }],
        };

        let mut response = self
            .agent
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .send_json(&request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.body_mut().read_to_string().unwrap_or_default();
            return Err(ChangelogError::Ai(format!(
                "Claude API error ({status}): {}",
                error_message(body)
            )));
        }

        let resp: ClaudeResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| ChangelogError::Ai(format!("failed to parse Claude response: {e}")))?;

        resp.content
            .into_iter()
            .map(|b| b.text)
            .find(|t| !t.trim().is_empty())
            .ok_or_else(|| ChangelogError::Ai("empty response from Claude".into()))
    }

    fn call_openai(&self, system_prompt: &str, user_msg: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system_prompt.into(),
                },
                Message {
                    role: "user".into(),
                    content: user_msg.into(),
                },
            ],
        };

        let mut response = self
            .agent
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send_json(&request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.body_mut().read_to_string().unwrap_or_default();
            return Err(ChangelogError::Ai(format!(
                "OpenAI API error ({status}): {}",
                error_message(body)
            )));
        }

        let resp: OpenAIResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| ChangelogError::Ai(format!("failed to parse OpenAI response: {e}")))?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ChangelogError::Ai("empty response from OpenAI".into()))
    }
}

fn error_message(body: String) -> String {
    serde_json::from_str::<ApiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

impl TextGenerator for AiClient {
    fn complete(&self, system_prompt: &str, user_msg: &str) -> Result<String> {
        tracing::debug!("calling {:?} model {}", self.provider, self.model);
        match self.provider {
            Provider::Claude => self.call_claude(system_prompt, user_msg),
            Provider::OpenAI => self.call_openai(system_prompt, user_msg),
        }
    }
}
