//! Payloads of the case-management API.
//!
//! The output node answers with an envelope whose `data` member is either a
//! JSON object or a string holding one. Identifiers and counts come back as
//! numbers or numeric strings depending on the server version.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/v1/auth`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub ticket: String,
}

/// Body of `GET /api/v1/nodes/{case}/output`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputEnvelope {
    #[serde(default)]
    pub data: Option<Value>,
}

/// Workspace identifiers attached to an item on the case system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    pub workspace_id: u64,
    pub final_planning_pkg_count: u32,
    pub final_wo_pkg_count: u32,
}

impl OutputEnvelope {
    /// Extract the workspace record.
    ///
    /// `Ok(None)` when the envelope carries no identifier (absent, empty or
    /// zero `dataid`); `Err` with a description when `data` is present but
    /// not in a readable shape.
    pub fn workspace(&self) -> Result<Option<WorkspaceRecord>, String> {
        let data = match &self.data {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
            Some(Value::String(s)) => serde_json::from_str::<Value>(s)
                .map_err(|e| format!("data is not JSON: {e}"))?,
            Some(v @ Value::Object(_)) => v.clone(),
            Some(other) => return Err(format!("unexpected data shape: {other}")),
        };
        let Value::Object(fields) = data else {
            return Err("data does not hold an object".into());
        };

        let workspace_id = match fields.get("dataid") {
            None | Some(Value::Null) => return Ok(None),
            Some(v) => number(v).ok_or_else(|| format!("dataid is not numeric: {v}"))?,
        };
        if workspace_id == 0 {
            return Ok(None);
        }

        Ok(Some(WorkspaceRecord {
            workspace_id,
            final_planning_pkg_count: count(fields.get("fpp"), "fpp")?,
            final_wo_pkg_count: count(fields.get("fwop"), "fwop")?,
        }))
    }
}

fn number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn count(value: Option<&Value>, field: &str) -> Result<u32, String> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(v) => number(v)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| format!("{field} is not a count: {v}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(data: Value) -> OutputEnvelope {
        OutputEnvelope { data: Some(data) }
    }

    #[test]
    fn object_data_is_read() {
        let record = envelope(json!({"dataid": 48213, "fpp": 2, "fwop": 5}))
            .workspace()
            .unwrap()
            .unwrap();
        assert_eq!(
            record,
            WorkspaceRecord {
                workspace_id: 48213,
                final_planning_pkg_count: 2,
                final_wo_pkg_count: 5,
            }
        );
    }

    #[test]
    fn stringified_data_is_read() {
        let record = envelope(json!(r#"{"dataid": "77", "fpp": "1"}"#))
            .workspace()
            .unwrap()
            .unwrap();
        assert_eq!(record.workspace_id, 77);
        assert_eq!(record.final_planning_pkg_count, 1);
        assert_eq!(record.final_wo_pkg_count, 0);
    }

    #[test]
    fn missing_or_zero_identifier_is_none() {
        assert_eq!(OutputEnvelope::default().workspace(), Ok(None));
        assert_eq!(envelope(Value::Null).workspace(), Ok(None));
        assert_eq!(envelope(json!("")).workspace(), Ok(None));
        assert_eq!(envelope(json!({"fpp": 3})).workspace(), Ok(None));
        assert_eq!(envelope(json!({"dataid": 0})).workspace(), Ok(None));
    }

    #[test]
    fn malformed_data_is_an_error() {
        assert!(envelope(json!("{not json")).workspace().is_err());
        assert!(envelope(json!([1, 2, 3])).workspace().is_err());
        assert!(envelope(json!("[1, 2]")).workspace().is_err());
        assert!(envelope(json!({"dataid": "abc"})).workspace().is_err());
        assert!(envelope(json!({"dataid": 5, "fwop": -1})).workspace().is_err());
    }

    #[test]
    fn envelope_deserializes_without_data() {
        let env: OutputEnvelope = serde_json::from_str(r#"{"links": {}}"#).unwrap();
        assert!(env.data.is_none());
    }
}
