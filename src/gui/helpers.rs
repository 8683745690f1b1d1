//! Formatting helpers for the views

use serde::Serialize;

pub const PLACEHOLDER: &str = "—";

/// Longest toast text shown before truncation.
pub const TOAST_MAX_CHARS: usize = 60;

/// Display a possibly missing field.
pub fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => PLACEHOLDER,
    }
}

/// `2024-05-01T10:00:00.123456` -> `2024-05-01 10:00:00`
pub fn format_audit_time(raw: Option<&str>) -> String {
    match raw {
        Some(raw) if !raw.is_empty() => raw.chars().take(19).collect::<String>().replacen('T', " ", 1),
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn pretty_json<S: Serialize + ?Sized>(value: &S) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {}>", e))
}

/// `0123456789abcdef` -> `012345…cdef`; short values pass through.
pub fn short_hash(hash: &str) -> String {
    let count = hash.chars().count();
    if count <= 12 {
        return hash.to_string();
    }
    let head: String = hash.chars().take(6).collect();
    let tail: String = hash.chars().skip(count - 4).collect();
    format!("{}…{}", head, tail)
}

/// Cut on a char boundary and mark the cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max).collect::<String>())
    }
}

/// Header line shown in the admin view so the token can be copied into other tools.
pub fn admin_token_hint(header: &str, token: &str) -> String {
    if token.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        format!("{}: {}", header, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==================== or_dash tests ====================

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(Some("LORD_x")), "LORD_x");
        assert_eq!(or_dash(Some("  ")), PLACEHOLDER);
        assert_eq!(or_dash(None), PLACEHOLDER);
    }

    // ==================== format_audit_time tests ====================

    #[test]
    fn test_format_audit_time_truncates_and_replaces_t() {
        assert_eq!(format_audit_time(Some("2024-05-01T10:00:00.123456")), "2024-05-01 10:00:00");
    }

    #[test]
    fn test_format_audit_time_short_input() {
        assert_eq!(format_audit_time(Some("2024-05-01")), "2024-05-01");
        assert_eq!(format_audit_time(None), PLACEHOLDER);
        assert_eq!(format_audit_time(Some("")), PLACEHOLDER);
    }

    // ==================== short_hash tests ====================

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash("00ab"), "00ab");
        assert_eq!(short_hash("0123456789abcdef"), "012345…cdef");
    }

    // ==================== truncate_chars tests ====================

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_chars("short", 40), "short");
    }

    // ==================== misc tests ====================

    #[test]
    fn test_admin_token_hint() {
        assert_eq!(admin_token_hint("X-Admin-Token", "adm-1"), "X-Admin-Token: adm-1");
        assert_eq!(admin_token_hint("X-Admin-Token", ""), PLACEHOLDER);
    }

    #[test]
    fn test_pretty_json() {
        assert_eq!(pretty_json(&json!({"a": 1})), "{\n  \"a\": 1\n}");
    }
}
