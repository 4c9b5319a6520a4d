//! # HTTP Utilities
//!
//! Response-handling helpers shared by the API client, the TUI and the CLI.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Return a user-friendly error message for common HTTP status codes.
///
/// # Example
/// ```rust
/// use senpy_util::http::status_error_message;
///
/// let not_found = status_error_message(404).unwrap();
/// assert!(not_found.contains("plugin"));
///
/// assert!(status_error_message(200).is_none());
/// ```
pub fn status_error_message(status_code: u16) -> Option<String> {
    match status_code {
        400 => Some("Bad Request (400). Hint: check the parameters; the service lists the invalid ones".into()),
        404 => Some("Not Found (404). Hint: the plugin or dataset may not exist on this service".into()),
        500 => Some("Internal Server Error (500). Hint: the plugin may not be activated".into()),
        _ => None,
    }
}

/// Parse HTTP response text into JSON, providing detailed errors on failure.
///
/// The error carries the originating status code plus a truncated preview of
/// the body so malformed payloads can be diagnosed from a log line.
pub fn parse_response_json_strict(text: &str, status: Option<StatusCode>) -> Result<Value, JsonParseError> {
    serde_json::from_str::<Value>(text).map_err(|error| {
        let status_note = status
            .map(|code| format!("status {code}"))
            .unwrap_or_else(|| "unknown status".to_string());
        let preview = truncate_response_preview(text, 200);

        JsonParseError::new(status_note, error, preview)
    })
}

/// Collapse whitespace and cut `text` to roughly `limit` bytes.
pub fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

/// Error returned when strict JSON parsing of an HTTP response fails.
#[derive(Debug, Error)]
#[error("failed to parse JSON response ({status_note}): {source}. body preview: {body_preview}")]
pub struct JsonParseError {
    status_note: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    pub fn new(status_note: String, source: serde_json::Error, body_preview: String) -> Self {
        Self {
            status_note,
            source,
            body_preview,
        }
    }

    /// Access the truncated response preview captured during parsing.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_parse_reports_status_and_preview() {
        let error = parse_response_json_strict("<html>\n<body>oops</body>", Some(StatusCode::BAD_GATEWAY))
            .expect_err("html is not json");
        let message = error.to_string();
        assert!(message.contains("status 502"));
        assert_eq!(error.body_preview(), "<html> <body>oops</body>");
    }

    #[test]
    fn preview_is_truncated() {
        let long = "x".repeat(500);
        let preview = truncate_response_preview(&long, 10);
        assert!(preview.ends_with("..."));
        assert!(preview.len() < 20);
        assert_eq!(truncate_response_preview("  ", 10), "<empty>");
    }
}
