use serde::Serialize;

/// Standard JSON envelope for `--json` output.
#[derive(Serialize)]
pub struct JsonEnvelope<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> JsonEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonEnvelope<()> {
    pub fn error(message: String) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(message),
        }
    }

    /// Print a failed run to stdout so CI can parse it.
    pub fn print_error(message: String) {
        if let Ok(json) = serde_json::to_string_pretty(&Self::error(message)) {
            println!("{json}");
        }
    }
}
