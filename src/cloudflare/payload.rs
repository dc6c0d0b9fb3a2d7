use serde::Serialize;
use serde_json::{Map, Number, Value};

use super::error::CfError;

/// The resendable subset of a routing rule.
///
/// Only fields that are present and of the expected JSON type are copied;
/// anything else is left out rather than nulled. `id` never goes into a
/// write body, it addresses the request instead.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RulePayload {
    #[serde(skip_serializing)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matchers: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Number>,
}

impl RulePayload {
    /// `None` when the record is not an object or carries none of the known fields.
    pub fn normalize(record: &Value) -> Option<Self> {
        let obj = record.as_object()?;
        let payload = Self {
            id: obj
                .get("id")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            matchers: obj.get("matchers").and_then(Value::as_array).cloned(),
            actions: obj.get("actions").and_then(Value::as_array).cloned(),
            name: obj.get("name").and_then(Value::as_str).map(str::to_string),
            priority: match obj.get("priority") {
                Some(Value::Number(n)) => Some(n.clone()),
                _ => None,
            },
        };
        if payload == Self::default() {
            return None;
        }
        Some(payload)
    }

    /// Complete enough to be resubmitted as a full replacement.
    pub fn is_update_safe(&self) -> bool {
        self.matchers.is_some() && self.actions.is_some()
    }

    /// Replacement body: every carried field except `id`, plus one override.
    pub fn write_body(&self, field: &str, value: Value) -> Result<Map<String, Value>, CfError> {
        let mut body = match serde_json::to_value(self).map_err(CfError::Decode)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        body.insert(field.to_string(), value);
        Ok(body)
    }
}
