//! Wire shapes exchanged with the wallet API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `/auth/register` and `/auth/login`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Field names a user token may arrive under, in order of preference.
pub const USER_TOKEN_FIELDS: &[&str] = &["access_token", "token"];

/// Field names an admin token may arrive under, in order of preference.
pub const ADMIN_TOKEN_FIELDS: &[&str] = &["admin_token", "token"];

/// First non-empty string among `fields` of a JSON object.
pub fn extract_token(data: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|field| data.get(field).and_then(Value::as_str))
        .map(str::trim)
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

/// Caller's own account, as returned by `/users/me`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Profile {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub balance: Option<String>,
}

/// One ledger entry from `/tx/history` or the explorer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TxRecord {
    #[serde(default)]
    pub from_address: String,
    #[serde(default)]
    pub to_address: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub amount: Option<String>,
    #[serde(default)]
    pub block_hash: String,
    #[serde(default)]
    pub block_index: Option<u64>,
    #[serde(default)]
    pub prev_hash: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `/tx/create`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransferRequest {
    pub to_address: String,
    pub amount: Value,
}

impl TransferRequest {
    /// Amounts that read as a JSON number are sent as one; anything else is sent
    /// as the raw text and left for the server to accept or reject.
    pub fn new(to_address: &str, amount: &str) -> Self {
        let amount = amount.trim();
        let amount = match serde_json::from_str::<Value>(amount) {
            Ok(number @ Value::Number(_)) => number,
            _ => Value::String(amount.to_string()),
        };
        Self {
            to_address: to_address.trim().to_string(),
            amount,
        }
    }
}

/// Row of `/admin/audit`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub actor: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub entity: String,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub meta: Value,
}

/// Verdict of `/explorer/verify-chain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStatus {
    Valid,
    Invalid,
    /// The response carried neither `ok` nor `valid` as a boolean.
    Indeterminate,
}

impl ChainStatus {
    /// `ok` wins over `valid` when both are present.
    pub fn from_response(data: &Value) -> Self {
        let verdict = ["ok", "valid"]
            .iter()
            .find_map(|field| data.get(field).and_then(Value::as_bool));
        match verdict {
            Some(true) => ChainStatus::Valid,
            Some(false) => ChainStatus::Invalid,
            None => ChainStatus::Indeterminate,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChainStatus::Valid => "VALID",
            ChainStatus::Invalid => "INVALID",
            ChainStatus::Indeterminate => "OK",
        }
    }
}

/// Decode a JSON array into `T`s, skipping entries that do not fit.
/// Anything other than an array decodes to an empty list.
pub fn decode_list<T: for<'de> Deserialize<'de>>(data: Value) -> Vec<T> {
    let Value::Array(items) = data else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::warn!("Skipping malformed row: {}", e);
                None
            }
        })
        .collect()
}

/// Accepts strings and numbers (the backend serialises decimals either way).
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==================== extract_token tests ====================

    #[test]
    fn test_extract_token_access_token() {
        let data = json!({"access_token": "abc123456789", "token_type": "bearer"});
        assert_eq!(extract_token(&data, USER_TOKEN_FIELDS), Some("abc123456789".into()));
    }

    #[test]
    fn test_extract_token_falls_back_to_token() {
        let data = json!({"token": "fallback-token"});
        assert_eq!(extract_token(&data, USER_TOKEN_FIELDS), Some("fallback-token".into()));
    }

    #[test]
    fn test_extract_token_prefers_first_field() {
        let data = json!({"admin_token": "primary", "token": "secondary"});
        assert_eq!(extract_token(&data, ADMIN_TOKEN_FIELDS), Some("primary".into()));
    }

    #[test]
    fn test_extract_token_skips_empty_values() {
        let data = json!({"access_token": "", "token": "second"});
        assert_eq!(extract_token(&data, USER_TOKEN_FIELDS), Some("second".into()));
    }

    #[test]
    fn test_extract_token_absent() {
        assert_eq!(extract_token(&json!({"id": 1}), USER_TOKEN_FIELDS), None);
        assert_eq!(extract_token(&json!("abc"), USER_TOKEN_FIELDS), None);
        assert_eq!(extract_token(&json!({"access_token": 42}), USER_TOKEN_FIELDS), None);
    }

    // ==================== Profile / TxRecord tests ====================

    #[test]
    fn test_profile_balance_number_or_string() {
        let numeric: Profile = serde_json::from_value(json!({"email": "a@b.c", "balance": 1000.5})).unwrap();
        let textual: Profile = serde_json::from_value(json!({"balance": "1000.00000000"})).unwrap();
        assert_eq!(numeric.balance.as_deref(), Some("1000.5"));
        assert_eq!(textual.balance.as_deref(), Some("1000.00000000"));
        assert_eq!(textual.email, None);
    }

    #[test]
    fn test_tx_record_from_history_row() {
        let row: TxRecord = serde_json::from_value(json!({
            "from_address": "LORD_a",
            "to_address": "LORD_b",
            "amount": "12.50000000",
            "block_hash": "00ff",
            "block_index": 7
        }))
        .unwrap();
        assert_eq!(row.amount.as_deref(), Some("12.50000000"));
        assert_eq!(row.block_index, Some(7));
        assert_eq!(row.created_at, None);
    }

    // ==================== TransferRequest tests ====================

    #[test]
    fn test_transfer_numeric_amount_sent_as_number() {
        let request = TransferRequest::new(" LORD_b ", " 12.5 ");
        assert_eq!(request.to_address, "LORD_b");
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({"to_address": "LORD_b", "amount": 12.5}));
    }

    #[test]
    fn test_transfer_non_numeric_amount_sent_as_text() {
        let request = TransferRequest::new("LORD_b", "ten");
        assert_eq!(request.amount, json!("ten"));
    }

    // ==================== ChainStatus tests ====================

    #[test]
    fn test_chain_status_ok_field() {
        assert_eq!(ChainStatus::from_response(&json!({"ok": true})), ChainStatus::Valid);
        assert_eq!(ChainStatus::from_response(&json!({"ok": false})), ChainStatus::Invalid);
    }

    #[test]
    fn test_chain_status_valid_field() {
        assert_eq!(ChainStatus::from_response(&json!({"valid": true, "blocks": 3})), ChainStatus::Valid);
        assert_eq!(ChainStatus::from_response(&json!({"valid": false})), ChainStatus::Invalid);
    }

    #[test]
    fn test_chain_status_ok_wins_over_valid() {
        assert_eq!(ChainStatus::from_response(&json!({"ok": false, "valid": true})), ChainStatus::Invalid);
    }

    #[test]
    fn test_chain_status_indeterminate() {
        assert_eq!(ChainStatus::from_response(&json!({"blocks": 3})), ChainStatus::Indeterminate);
        assert_eq!(ChainStatus::from_response(&json!({"ok": "yes"})), ChainStatus::Indeterminate);
        assert_eq!(ChainStatus::from_response(&json!([1, 2])), ChainStatus::Indeterminate);
        assert_eq!(ChainStatus::Indeterminate.label(), "OK");
    }

    // ==================== decode_list tests ====================

    #[test]
    fn test_decode_list_non_array_is_empty() {
        let rows: Vec<AuditEntry> = decode_list(json!({"detail": "nope"}));
        assert!(rows.is_empty());
    }

    #[test]
    fn test_decode_list_skips_malformed_rows() {
        let rows: Vec<AuditEntry> = decode_list(json!([
            {"actor": "ADMIN", "action": "ADMIN_FREEZE", "entity": "users", "created_at": "2024-01-02T03:04:05.123"},
            "garbage",
            {"actor": "a@b.c", "action": "LOGIN_OK_TOKEN", "entity": "users"}
        ]));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].action, "ADMIN_FREEZE");
        assert_eq!(rows[1].actor, "a@b.c");
    }
}
