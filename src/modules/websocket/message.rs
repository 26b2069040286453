/// WebSocket Message Protocol
///
/// Message types exchanged between client and server over the WebSocket
/// connection.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::notifier::{ChangeEvent, NotificationEvent, RelationshipEvent};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Authenticate the connection with a bearer token. Events start flowing
    /// for that user once this succeeds.
    #[serde(rename_all = "camelCase")]
    Auth { token: String },

    /// Keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    AuthSuccess { user_id: Uuid },

    #[serde(rename_all = "camelCase")]
    AuthFailed { reason: String },

    /// A friendship involving this user was created or removed
    Relationship { event: RelationshipEvent },

    /// A notification addressed to (or sent by) this user changed
    Notification { event: NotificationEvent },

    Pong,

    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

impl From<ChangeEvent> for ServerMessage {
    fn from(event: ChangeEvent) -> Self {
        match event {
            ChangeEvent::Relationship(event) => ServerMessage::Relationship { event },
            ChangeEvent::Notification(event) => ServerMessage::Notification { event },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::notification::schema::RequestStatus;

    #[test]
    fn test_client_auth_deserialize() {
        let json = r#"{"type":"auth","token":"my-jwt-token"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Auth { token } if token == "my-jwt-token"));
    }

    #[test]
    fn test_client_ping_deserialize() {
        let json = r#"{"type":"ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_invalid_type_returns_error() {
        let json = r#"{"type":"subscribe","userId":"550e8400-e29b-41d4-a716-446655440000"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_server_pong_serialize() {
        let json = serde_json::to_string(&ServerMessage::Pong).unwrap();
        assert_eq!(json, r#"{"type":"pong"}"#);
    }

    #[test]
    fn test_server_auth_failed_serialize() {
        let msg = ServerMessage::AuthFailed { reason: "Token expired".to_string() };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"authFailed\""));
        assert!(json.contains("Token expired"));
    }

    #[test]
    fn test_relationship_event_wire_shape() {
        let (user_a, user_b) = (Uuid::now_v7(), Uuid::now_v7());
        let msg: ServerMessage =
            ChangeEvent::Relationship(RelationshipEvent::Created { user_a, user_b }).into();

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "relationship");
        assert_eq!(value["event"]["kind"], "created");
        assert_eq!(value["event"]["userA"], user_a.to_string());
        assert_eq!(value["event"]["userB"], user_b.to_string());
    }

    #[test]
    fn test_notification_resolved_wire_shape() {
        let id = Uuid::now_v7();
        let msg: ServerMessage = ChangeEvent::Notification(NotificationEvent::Resolved {
            notification_id: id,
            status: RequestStatus::Declined,
        })
        .into();

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "notification");
        assert_eq!(value["event"]["kind"], "resolved");
        assert_eq!(value["event"]["notificationId"], id.to_string());
        assert_eq!(value["event"]["status"], "declined");
    }
}
