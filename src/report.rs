//! Host-facing error reports.
//!
//! The embedded application reports errors in several shapes: plain
//! strings such as `"400 Bad Request"`, `{message, code, details}` objects,
//! and arrays of schema validation issues. [`ErrorReport`] folds all of them
//! into one `{message, code, details}` triple.
//!
//! | Input | `message` | `code` |
//! |-------|-----------|--------|
//! | `"404 Not Found"` | the string | `"404"` |
//! | `{message, code?, details?}` | `message`, or flattened validation issues from `details.message` | `code`, else status in `message` |
//! | `[{path, expected}, ...]` | `Invalid a.b: expected string; ...` | first issue's `code` |
//! | `{error}` / `{detail}` | that field | `code`, `status`, or status in the field |
//! | anything else | fallback | none |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

// ============================================================================
// Constants
// ============================================================================

/// Fallback message when nothing better can be extracted.
pub const DEFAULT_REPORT_MESSAGE: &str = "An error occurred";

/// Three-digit HTTP-like status code, 100-599, as a whole word.
static STATUS_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([1-5]\d{2})\b").unwrap_or_else(|e| panic!("invalid status pattern: {e}"))
});

// ============================================================================
// ErrorReport
// ============================================================================

/// Normalized error for host callbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable code, often an HTTP status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Original error data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorReport {
    /// Creates a report with only a message.
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
        }
    }

    /// Normalizes an arbitrary error value.
    ///
    /// `fallback` is used when no message can be extracted.
    #[must_use]
    pub fn from_value(error: &Value, fallback: &str) -> Self {
        let details = (!error.is_null()).then(|| error.clone());

        match error {
            Value::String(message) if !message.is_empty() => Self {
                message: message.clone(),
                code: extract_status_code(message),
                details,
            },

            Value::Array(items) if items.iter().all(is_validation_issue) => Self {
                message: format_issues(items),
                code: items.first().and_then(|item| code_field(item, "code")),
                details,
            },

            Value::Array(items) => Self {
                message: format!("Multiple errors: {} item(s)", items.len()),
                code: None,
                details,
            },

            Value::Object(object) => Self::from_object(object, error, fallback),

            _ => Self {
                message: fallback.to_string(),
                code: None,
                details,
            },
        }
    }

    fn from_object(object: &Map<String, Value>, raw: &Value, fallback: &str) -> Self {
        if let Some(message) = non_empty_str(object.get("message")) {
            let code = code_field(raw, "code").or_else(|| extract_status_code(message));

            // Validation issues often arrive JSON-encoded in details.message
            let message = object
                .get("details")
                .and_then(|d| non_empty_str(d.get("message")))
                .and_then(|encoded| serde_json::from_str::<Value>(encoded).ok())
                .and_then(|parsed| match parsed {
                    Value::Array(items) if items.iter().all(is_validation_issue) => {
                        Some(format_issues(&items))
                    }
                    _ => None,
                })
                .unwrap_or_else(|| message.to_string());

            return Self {
                message,
                code,
                details: object.get("details").cloned(),
            };
        }

        if is_validation_issue(raw) {
            return Self {
                message: format_issue(raw),
                code: code_field(raw, "code"),
                details: Some(raw.clone()),
            };
        }

        let field = ["error", "detail"]
            .iter()
            .filter_map(|key| object.get(*key))
            .find(|value| is_truthy(value));

        match field {
            Some(value) => {
                let text = value.as_str();
                Self {
                    message: text.unwrap_or(fallback).to_string(),
                    code: code_field(raw, "code")
                        .or_else(|| code_field(raw, "status"))
                        .or_else(|| text.and_then(extract_status_code)),
                    details: Some(raw.clone()),
                }
            }
            None => Self {
                message: fallback.to_string(),
                code: None,
                details: Some(raw.clone()),
            },
        }
    }
}

impl From<&Error> for ErrorReport {
    fn from(error: &Error) -> Self {
        let message = error.to_string();
        let code = error
            .code()
            .map(str::to_string)
            .or_else(|| extract_status_code(&message));
        let details = match error {
            Error::RemoteFailure { details, .. } => details.clone(),
            _ => None,
        };

        Self {
            message,
            code,
            details,
        }
    }
}

impl From<Error> for ErrorReport {
    fn from(error: Error) -> Self {
        Self::from(&error)
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Extracts the first status-code-like number from a message.
#[must_use]
pub fn extract_status_code(message: &str) -> Option<String> {
    STATUS_CODE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reads a string or numeric code field.
fn code_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_validation_issue(value: &Value) -> bool {
    value.as_object().is_some_and(|object| {
        ["expected", "code", "path", "message"]
            .iter()
            .any(|key| object.contains_key(*key))
    })
}

fn format_issue(issue: &Value) -> String {
    if let Some(message) = non_empty_str(issue.get("message")) {
        return message.to_string();
    }

    let path = issue
        .get("path")
        .and_then(Value::as_array)
        .filter(|segments| !segments.is_empty())
        .map(|segments| {
            segments
                .iter()
                .map(|segment| match segment {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".")
        })
        .unwrap_or_else(|| "field".to_string());

    if let Some(expected) = non_empty_str(issue.get("expected")) {
        return format!("Invalid {path}: expected {expected}");
    }
    if let Some(code) = non_empty_str(issue.get("code")) {
        return format!("Validation error in {path} ({code})");
    }
    format!("Validation error in {path}")
}

fn format_issues(issues: &[Value]) -> String {
    match issues {
        [] => "Unknown validation error".to_string(),
        [issue] => format_issue(issue),
        _ => {
            let messages: Vec<String> = issues.iter().map(format_issue).collect();
            format!("Multiple validation errors: {}", messages.join("; "))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
