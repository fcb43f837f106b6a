pub mod transport;

use serde::{Deserialize, Serialize};

/// Lifecycle notifications, distinct from telemetry. The wire names match
/// what subscribers of the original protocol expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusType {
    VehicleReady,
    ConnectionLost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub vehicle_id: String,
    #[serde(rename = "type")]
    pub status_type: StatusType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusMessage {
    pub fn vehicle_ready(vehicle_id: impl Into<String>) -> Self {
        StatusMessage {
            vehicle_id: vehicle_id.into(),
            status_type: StatusType::VehicleReady,
            message: None,
        }
    }

    /// The one constructor for the end-of-session notification. Both the
    /// last-will registration and the explicit publish on graceful shutdown
    /// go through here, so the two payloads cannot drift apart.
    pub fn connection_lost(vehicle_id: impl Into<String>) -> Self {
        StatusMessage {
            vehicle_id: vehicle_id.into(),
            status_type: StatusType::ConnectionLost,
            message: Some(String::from("Connection no longer available")),
        }
    }

    pub fn to_payload(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("Failed to serialize status message")
    }
}

/// Telemetry goes to a per-vehicle subtopic of the shared status topic.
pub fn telemetry_topic(status_topic: &str, vehicle_id: &str) -> String {
    format!("{status_topic}/{vehicle_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_types_use_the_wire_names() {
        let ready = StatusMessage::vehicle_ready("postauto");
        let json = String::from_utf8(ready.to_payload()).unwrap();
        assert!(json.contains("\"type\":\"VEHICLE_READY\""));
        assert!(json.contains("\"vehicle_id\":\"postauto\""));
        // no message set, so the field is left off the wire
        assert!(!json.contains("\"message\""));

        let lost = StatusMessage::connection_lost("postauto");
        let json = String::from_utf8(lost.to_payload()).unwrap();
        assert!(json.contains("\"type\":\"CONNECTION_LOST\""));
    }

    #[test]
    fn telemetry_topic_is_derived_from_the_status_topic() {
        assert_eq!(telemetry_topic("vehicles", "postauto"), "vehicles/postauto");
    }
}
