//! Failure model shared by every call into the wallet API.
//!
//! The backend's error envelope differs between endpoints (plain strings,
//! `{"detail": ...}`, validation arrays, `{"message": ...}`), so every
//! non-2xx body goes through [`normalize_error`] before it reaches the user.

use serde_json::Value;
use thiserror::Error;

/// Message shown when no response was obtained at all.
pub const UNREACHABLE_MESSAGE: &str = "Cannot reach the server. Check your connection and try again.";

/// Fallback for structured bodies that carry no recognisable message.
pub const GENERIC_FAILURE: &str = "Request failed";

/// Default text for a validation entry without a `msg` field.
const INVALID_ENTRY: &str = "Invalid";

/// Every way a user action can fail. `Display` is the sentence shown in the toast.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShellError {
    /// Required input missing; detected before contacting the server.
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// No response was obtained (offline, DNS, TLS, timeout).
    #[error("{0}")]
    Unreachable(String),

    /// 2xx response that lacks a field the shell cannot proceed without.
    #[error("{0}")]
    Contract(String),

    /// Background worker ended without reporting a result.
    #[error("{0}")]
    Aborted(String),
}

impl ShellError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn contract(message: impl Into<String>) -> Self {
        Self::Contract(message.into())
    }

    /// Generic connectivity failure. The transport detail goes to the log only.
    pub fn unreachable(detail: impl std::fmt::Display) -> Self {
        tracing::warn!("Request did not reach the server: {}", detail);
        Self::Unreachable(UNREACHABLE_MESSAGE.to_string())
    }

    /// HTTP status of a server rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server refused the credential that was attached (401/403).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

/// Reduce a response body of unknown shape to one display string.
///
/// `body` is `None` when the response had no parseable content at all; the
/// status-qualified `"Error (<status>)"` is used then.
pub fn normalize_error(body: Option<&Value>, status: u16) -> String {
    let body = match body {
        None | Some(Value::Null) => return format!("Error ({})", status),
        Some(body) => body,
    };

    if let Value::String(text) = body {
        return text.clone();
    }

    match body.get("detail") {
        Some(Value::Array(entries)) => {
            return entries
                .iter()
                .map(|entry| {
                    entry
                        .get("msg")
                        .and_then(Value::as_str)
                        .unwrap_or(INVALID_ENTRY)
                })
                .collect::<Vec<_>>()
                .join(", ");
        }
        Some(Value::Null) | None => {}
        Some(detail) => return value_text(detail),
    }

    match body.get("message") {
        Some(Value::Null) | None => GENERIC_FAILURE.to_string(),
        Some(message) => value_text(message),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==================== normalize_error tests ====================

    #[test]
    fn test_normalize_bare_string_verbatim() {
        let body = json!("boom");
        assert_eq!(normalize_error(Some(&body), 500), "boom");
    }

    #[test]
    fn test_normalize_validation_array_joins_msgs() {
        let body = json!({"detail": [{"msg": "X"}, {"msg": "Y"}]});
        assert_eq!(normalize_error(Some(&body), 422), "X, Y");
    }

    #[test]
    fn test_normalize_validation_array_missing_msg_defaults() {
        let body = json!({"detail": [{"loc": ["body", "email"]}, {"msg": "too short"}]});
        assert_eq!(normalize_error(Some(&body), 422), "Invalid, too short");
    }

    #[test]
    fn test_normalize_validation_array_non_string_msg_defaults() {
        let body = json!({"detail": [{"msg": 7}]});
        assert_eq!(normalize_error(Some(&body), 422), "Invalid");
    }

    #[test]
    fn test_normalize_empty_validation_array() {
        let body = json!({"detail": []});
        assert_eq!(normalize_error(Some(&body), 422), "");
    }

    #[test]
    fn test_normalize_detail_string() {
        let body = json!({"detail": "Invalid credentials"});
        assert_eq!(normalize_error(Some(&body), 401), "Invalid credentials");
    }

    #[test]
    fn test_normalize_detail_object_returned_as_is() {
        let body = json!({"detail": {"code": 7}});
        assert_eq!(normalize_error(Some(&body), 400), r#"{"code":7}"#);
    }

    #[test]
    fn test_normalize_detail_takes_priority_over_message() {
        let body = json!({"detail": "first", "message": "second"});
        assert_eq!(normalize_error(Some(&body), 400), "first");
    }

    #[test]
    fn test_normalize_message_field() {
        let body = json!({"message": "Account is frozen"});
        assert_eq!(normalize_error(Some(&body), 403), "Account is frozen");
    }

    #[test]
    fn test_normalize_null_detail_falls_through_to_message() {
        let body = json!({"detail": null, "message": "fallback"});
        assert_eq!(normalize_error(Some(&body), 400), "fallback");
    }

    #[test]
    fn test_normalize_unknown_object_is_generic() {
        let body = json!({"error": "nope"});
        assert_eq!(normalize_error(Some(&body), 500), "Request failed");
    }

    #[test]
    fn test_normalize_no_body_uses_status() {
        assert_eq!(normalize_error(None, 502), "Error (502)");
        assert_eq!(normalize_error(Some(&Value::Null), 404), "Error (404)");
    }

    // ==================== ShellError tests ====================

    #[test]
    fn test_shell_error_display_is_message() {
        let err = ShellError::Rejected { status: 400, message: "Insufficient balance".into() };
        assert_eq!(err.to_string(), "Insufficient balance");
        assert_eq!(ShellError::validation("Enter an email").to_string(), "Enter an email");
    }

    #[test]
    fn test_shell_error_unreachable_is_generic() {
        let err = ShellError::unreachable("dns error: no such host");
        assert_eq!(err.to_string(), UNREACHABLE_MESSAGE);
        assert!(!err.to_string().contains("dns"));
    }

    #[test]
    fn test_shell_error_auth_failure() {
        let unauthorized = ShellError::Rejected { status: 401, message: "x".into() };
        let forbidden = ShellError::Rejected { status: 403, message: "x".into() };
        let not_found = ShellError::Rejected { status: 404, message: "x".into() };
        assert!(unauthorized.is_auth_failure());
        assert!(forbidden.is_auth_failure());
        assert!(!not_found.is_auth_failure());
        assert!(!ShellError::contract("Token not returned").is_auth_failure());
    }
}
