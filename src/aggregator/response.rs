//! Call-tree node returned by every service in the mesh.
//!
//! # Wire Format
//! ```text
//! {
//!   "name": "frontend",
//!   "message": "Hi from frontend",
//!   "backendResponses": [ { "name": "color", "message": "Hi from color", "timeMs": 3 } ],
//!   "timeMs": 5
//! }
//! ```
//!
//! Empty strings and empty child lists are omitted on output. `timeMs` is
//! always emitted. Older nodes name the child list `backendMessages`; it is
//! accepted on input so their trees nest unchanged. On input `null` reads
//! as the field's empty value and `timeMs` may be negative.

use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// A node in the call-result tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    /// Node identity, or the backend address when no structured body came back.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,

    /// Set only when this node's own call failed.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub error: String,

    /// Human-readable status text.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub message: String,

    /// One child per backend this node called, in resolution order.
    #[serde(
        default,
        alias = "backendMessages",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub backend_responses: Vec<ServiceResponse>,

    /// Milliseconds this node spent producing its subtree.
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_ms: i64,
}

impl ServiceResponse {
    /// Node describing a backend whose call failed.
    pub fn failed(backend: impl Into<String>, error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            name: backend.into(),
            error: error.into(),
            time_ms: millis(elapsed),
            ..Default::default()
        }
    }

    /// Returns true if this node's own call failed.
    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }
}

/// Whole milliseconds in `elapsed`, saturating.
pub fn millis(elapsed: Duration) -> i64 {
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn leaf_omits_empty_fields_but_keeps_time() {
        let leaf = ServiceResponse {
            name: "color".into(),
            message: "Hi from color".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&leaf).unwrap();
        assert_eq!(value, json!({"name": "color", "message": "Hi from color", "timeMs": 0}));
    }

    #[test]
    fn field_order_matches_wire_format() {
        let node = ServiceResponse {
            name: "a".into(),
            error: "e".into(),
            message: "m".into(),
            backend_responses: vec![ServiceResponse::default()],
            time_ms: 7,
        };
        let text = serde_json::to_string(&node).unwrap();
        assert_eq!(
            text,
            r#"{"name":"a","error":"e","message":"m","backendResponses":[{"timeMs":0}],"timeMs":7}"#
        );
    }

    #[test]
    fn accepts_legacy_child_list_name() {
        let node: ServiceResponse = serde_json::from_str(
            r#"{"name":"front","backendMessages":[{"name":"back","timeMs":2}],"timeMs":4}"#,
        )
        .unwrap();
        assert_eq!(node.backend_responses.len(), 1);
        assert_eq!(node.backend_responses[0].name, "back");
    }

    #[test]
    fn unknown_fields_and_missing_fields_are_tolerated() {
        let node: ServiceResponse = serde_json::from_str(r#"{"color":"blue"}"#).unwrap();
        assert_eq!(node, ServiceResponse::default());
    }

    #[test]
    fn null_fields_read_as_empty() {
        let node: ServiceResponse = serde_json::from_str(
            r#"{"name":null,"error":null,"message":null,"backendMessages":null,"timeMs":null}"#,
        )
        .unwrap();
        assert_eq!(node, ServiceResponse::default());
    }

    #[test]
    fn negative_time_is_kept() {
        let node: ServiceResponse = serde_json::from_str(r#"{"timeMs":-1}"#).unwrap();
        assert_eq!(node.time_ms, -1);
        assert_eq!(serde_json::to_string(&node).unwrap(), r#"{"timeMs":-1}"#);
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        assert!(serde_json::from_str::<ServiceResponse>("blue").is_err());
        assert!(serde_json::from_str::<ServiceResponse>("[1,2]").is_err());
    }

    #[test]
    fn failed_node_records_backend_and_time() {
        let node = ServiceResponse::failed("db:8080", "boom", Duration::from_millis(42));
        assert!(node.has_error());
        assert_eq!(node.name, "db:8080");
        assert_eq!(node.time_ms, 42);
    }
}
