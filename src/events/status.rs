//! # Status Updates
//!
//! Wire and client representations of a task status change, and the pure
//! translation between them.
//!
//! Workers publish a compact wire update whose information map carries the
//! task identifier alongside internal control fields. Clients receive the
//! identifier as a first-class field, a readable status label, and the
//! information map with internal keys removed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::error;

use crate::constants::{RESERVED_INFORMATION_KEYS, TASK_ID_INFORMATION_KEY};

/// Status codes shared with the publishing side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Starting,
    Monitoring,
    ProductFound,
    AddingToCart,
    SolvingCaptcha,
    CheckingOut,
    CheckedOut,
    Error,
    ActionNeeded,
    Paused,
    Stopped,
}

/// Label used for codes outside the known table
pub const UNKNOWN_STATUS_LABEL: &str = "UNKNOWN";

impl TaskStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        let status = match code {
            0 => TaskStatus::Starting,
            1 => TaskStatus::Monitoring,
            2 => TaskStatus::ProductFound,
            3 => TaskStatus::AddingToCart,
            4 => TaskStatus::SolvingCaptcha,
            5 => TaskStatus::CheckingOut,
            6 => TaskStatus::CheckedOut,
            7 => TaskStatus::Error,
            8 => TaskStatus::ActionNeeded,
            9 => TaskStatus::Paused,
            10 => TaskStatus::Stopped,
            _ => return None,
        };
        Some(status)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Starting => "STARTING",
            TaskStatus::Monitoring => "MONITORING",
            TaskStatus::ProductFound => "PRODUCT_FOUND",
            TaskStatus::AddingToCart => "ADDING_TO_CART",
            TaskStatus::SolvingCaptcha => "SOLVING_CAPTCHA",
            TaskStatus::CheckingOut => "CHECKING_OUT",
            TaskStatus::CheckedOut => "CHECKED_OUT",
            TaskStatus::Error => "ERROR",
            TaskStatus::ActionNeeded => "ACTION_NEEDED",
            TaskStatus::Paused => "PAUSED",
            TaskStatus::Stopped => "STOPPED",
        }
    }

    /// Label for a raw code, [`UNKNOWN_STATUS_LABEL`] when unrecognized
    pub fn label_for_code(code: i32) -> &'static str {
        Self::from_code(code)
            .map(|status| status.label())
            .unwrap_or(UNKNOWN_STATUS_LABEL)
    }
}

/// Status update as published by workers
///
/// Field names are accepted in either case, since publishers serialize the
/// capitalized protobuf names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireStatusUpdate {
    #[serde(default, alias = "Status")]
    pub status: i32,
    #[serde(default, alias = "Error")]
    pub error: Option<String>,
    #[serde(default, alias = "Information")]
    pub information: HashMap<String, String>,
}

impl WireStatusUpdate {
    /// Parse a published payload
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// Status update as delivered to clients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStatusUpdate {
    #[serde(rename = "taskID")]
    pub task_id: String,
    pub status: String,
    pub error: Option<String>,
    pub information: BTreeMap<String, String>,
}

/// Translate a wire update into its client shape
///
/// Pure: the input is left untouched. Every information entry except the
/// reserved keys is carried over unchanged.
pub fn translate(wire: &WireStatusUpdate) -> ClientStatusUpdate {
    ClientStatusUpdate {
        task_id: wire
            .information
            .get(TASK_ID_INFORMATION_KEY)
            .cloned()
            .unwrap_or_default(),
        status: TaskStatus::label_for_code(wire.status).to_string(),
        error: wire.error.clone(),
        information: wire
            .information
            .iter()
            .filter(|(key, _)| !RESERVED_INFORMATION_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    }
}

/// Parse and translate a raw payload
///
/// Malformed payloads are logged and yield `None`; they never surface as
/// errors to the stream.
pub fn process_update(payload: &str) -> Option<ClientStatusUpdate> {
    match WireStatusUpdate::parse(payload) {
        Ok(wire) => Some(translate(&wire)),
        Err(e) => {
            error!(error = %e, payload_len = payload.len(), "Error unmarshalling status payload");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wire(status: i32, information: &[(&str, &str)]) -> WireStatusUpdate {
        WireStatusUpdate {
            status,
            error: None,
            information: information
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_translate_redacts_reserved_keys() {
        let input = wire(
            2,
            &[("taskID", "t9"), ("stoppedFromCMD", "true"), ("proxy", "1.2.3.4")],
        );

        let client = translate(&input);

        assert_eq!(client.task_id, "t9");
        assert_eq!(client.status, "PRODUCT_FOUND");
        assert_eq!(client.error, None);
        assert_eq!(
            client.information,
            BTreeMap::from([("proxy".to_string(), "1.2.3.4".to_string())])
        );
        assert_eq!(input.information.len(), 3, "input must not be mutated");
    }

    #[test]
    fn test_translate_copies_error_verbatim() {
        let mut input = wire(7, &[("taskID", "t1")]);
        input.error = Some("card declined".to_string());

        let client = translate(&input);
        assert_eq!(client.status, "ERROR");
        assert_eq!(client.error.as_deref(), Some("card declined"));
    }

    #[test]
    fn test_unknown_status_code() {
        assert_eq!(TaskStatus::label_for_code(999), UNKNOWN_STATUS_LABEL);
        assert_eq!(TaskStatus::label_for_code(-1), UNKNOWN_STATUS_LABEL);
    }

    #[test]
    fn test_parse_accepts_capitalized_fields() {
        let parsed = WireStatusUpdate::parse(
            r#"{"Status": 1, "Error": "", "Information": {"taskID": "abc"}}"#,
        )
        .unwrap();
        assert_eq!(parsed.status, 1);
        assert_eq!(parsed.error.as_deref(), Some(""));
        assert_eq!(parsed.information["taskID"], "abc");
    }

    #[test]
    fn test_process_update_drops_malformed_payloads() {
        assert!(process_update("not json").is_none());
        assert!(process_update("null").is_none());
        assert!(process_update(r#"{"status": "two"}"#).is_none());
        assert!(process_update(r#"{"information": {"taskID": 5}}"#).is_none());
    }

    #[test]
    fn test_client_serialization_uses_task_id_key() {
        let client = translate(&wire(0, &[("taskID", "t1")]));
        let json = serde_json::to_value(&client).unwrap();
        assert_eq!(json["taskID"], "t1");
        assert_eq!(json["status"], "STARTING");
    }

    proptest! {
        #[test]
        fn prop_translate_preserves_all_but_reserved(
            information in prop::collection::hash_map("[a-zA-Z]{1,12}", ".{0,16}", 0..12),
            status in any::<i32>(),
        ) {
            let input = WireStatusUpdate { status, error: None, information: information.clone() };
            let client = translate(&input);

            for key in RESERVED_INFORMATION_KEYS {
                prop_assert!(!client.information.contains_key(key));
            }
            for (key, value) in &information {
                if !RESERVED_INFORMATION_KEYS.contains(&key.as_str()) {
                    prop_assert_eq!(client.information.get(key), Some(value));
                }
            }
            prop_assert_eq!(input.information, information);
        }

        #[test]
        fn prop_arbitrary_payloads_never_panic(payload in ".{0,64}") {
            let _ = process_update(&payload);
        }
    }
}
