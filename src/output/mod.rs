pub mod human;
pub mod json;

use serde::Serialize;

use json::JsonEnvelope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Command results that can be shown to a person or emitted as JSON.
pub trait CommandOutput: Serialize {
    fn human_display(&self) -> String;
}

/// Render `output` in the requested format.
pub fn render_output<T: CommandOutput>(output: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => output.human_display(),
        OutputFormat::Json => serde_json::to_string_pretty(&JsonEnvelope::success(output))
            .expect("failed to serialize output"),
    }
}

/// Print a command output in the requested format.
pub fn print_output<T: CommandOutput>(output: &T, format: OutputFormat) {
    println!("{}", render_output(output, format));
}

/// Simple message output for commands that just need to report a string.
#[derive(Debug, Serialize)]
pub struct MessageOutput {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CommandOutput for MessageOutput {
    fn human_display(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{}\n{}", self.message, detail),
            None => self.message.clone(),
        }
    }
}
