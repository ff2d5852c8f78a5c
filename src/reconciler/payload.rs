//! # Payload Conversion
//!
//! Turns backend values into what the credential store holds: listing entries
//! into secret names, and read responses into `field -> bytes` maps.

use crate::reconciler::paths::KvMode;
use crate::source::SecretData;
use serde_json::Value;
use std::collections::BTreeMap;

/// Convert any JSON value to the bytes stored for it
///
/// Total over every JSON value:
/// - string: its UTF-8 bytes, unchanged
/// - integer: decimal digits (`30` -> `"30"`)
/// - float: shortest round-trip decimal (`1.5` -> `"1.5"`)
/// - bool: `"true"` / `"false"`
/// - null: empty
/// - array, object: compact JSON text
#[must_use]
pub fn scalar_to_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::String(s) => s.as_bytes().to_vec(),
        Value::Number(n) => n.to_string().into_bytes(),
        Value::Bool(b) => b.to_string().into_bytes(),
        Value::Null => Vec::new(),
        Value::Array(_) | Value::Object(_) => value.to_string().into_bytes(),
    }
}

/// Name for a listing entry, or `None` when the entry is not a scalar
#[must_use]
pub fn entry_name(entry: &Value) -> Option<String> {
    match entry {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Extract the payload fields of a read response
///
/// KV v2 nests the payload under `data`; KV v1 stores it at the top level.
///
/// # Errors
/// Returns a description when a KV v2 response has no nested `data` object,
/// which is what Vault serves for a deleted or destroyed version.
pub fn extract_payload(
    mode: KvMode,
    data: &SecretData,
) -> Result<BTreeMap<String, Vec<u8>>, String> {
    let fields = match mode {
        KvMode::V1 => data,
        KvMode::V2 => match data.get("data") {
            Some(Value::Object(fields)) => fields,
            Some(Value::Null) | None => {
                return Err("KV v2 response has no data (version deleted or destroyed?)".to_string())
            }
            Some(_) => return Err("KV v2 data field is not an object".to_string()),
        },
    };

    Ok(fields
        .iter()
        .map(|(key, value)| (key.clone(), scalar_to_bytes(value)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> SecretData {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn test_scalar_to_bytes() {
        assert_eq!(scalar_to_bytes(&json!("alice")), b"alice".to_vec());
        assert_eq!(scalar_to_bytes(&json!(30)), b"30".to_vec());
        assert_eq!(scalar_to_bytes(&json!(-7)), b"-7".to_vec());
        assert_eq!(scalar_to_bytes(&json!(1.5)), b"1.5".to_vec());
        assert_eq!(scalar_to_bytes(&json!(true)), b"true".to_vec());
        assert_eq!(scalar_to_bytes(&json!(false)), b"false".to_vec());
        assert_eq!(scalar_to_bytes(&Value::Null), Vec::<u8>::new());
        assert_eq!(scalar_to_bytes(&json!(["a", 1])), br#"["a",1]"#.to_vec());
        assert_eq!(scalar_to_bytes(&json!({"k": "v"})), br#"{"k":"v"}"#.to_vec());
    }

    #[test]
    fn test_scalar_to_bytes_keeps_unicode() {
        assert_eq!(scalar_to_bytes(&json!("pässwörd")), "pässwörd".as_bytes().to_vec());
    }

    #[test]
    fn test_entry_name() {
        assert_eq!(entry_name(&json!("db")), Some("db".to_string()));
        assert_eq!(entry_name(&json!(42)), Some("42".to_string()));
        assert_eq!(entry_name(&json!(true)), Some("true".to_string()));
        assert_eq!(entry_name(&Value::Null), None);
        assert_eq!(entry_name(&json!({"name": "db"})), None);
        assert_eq!(entry_name(&json!(["db"])), None);
    }

    #[test]
    fn test_extract_kv_v2_payload() {
        let data = as_map(json!({
            "data": {"user": "alice", "ttl": 30},
            "metadata": {"version": 3}
        }));
        let payload = extract_payload(KvMode::V2, &data).unwrap();

        assert_eq!(payload.len(), 2);
        assert_eq!(payload["user"], b"alice".to_vec());
        assert_eq!(payload["ttl"], b"30".to_vec());
    }

    #[test]
    fn test_extract_kv_v1_payload() {
        let data = as_map(json!({"user": "alice", "enabled": true}));
        let payload = extract_payload(KvMode::V1, &data).unwrap();

        assert_eq!(payload["user"], b"alice".to_vec());
        assert_eq!(payload["enabled"], b"true".to_vec());
    }

    #[test]
    fn test_extract_kv_v2_deleted_version() {
        let data = as_map(json!({"data": null, "metadata": {"deletion_time": "2024-01-01T00:00:00Z"}}));
        assert!(extract_payload(KvMode::V2, &data).is_err());

        let data = as_map(json!({"data": "oops"}));
        assert!(extract_payload(KvMode::V2, &data).is_err());
    }

    #[test]
    fn test_extract_empty_payload() {
        let data = as_map(json!({"data": {}}));
        assert!(extract_payload(KvMode::V2, &data).unwrap().is_empty());
    }
}
