pub mod class_session;
pub mod job;
pub mod subscription;

use serde_json::Value;

/// Read a key column as text. Integer and string keys are both accepted.
pub(crate) fn key_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
