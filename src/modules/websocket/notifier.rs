/// Change Notifier
///
/// Publish side of the realtime feed. Services describe what changed and
/// for whom; the transport decides how it reaches the client. Delivery is
/// fire-and-forget: a user without live sessions simply misses the push and
/// catches up on the next fetch.
use actix::Addr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{SendToUser, SendToUsers};
use super::server::WebSocketServer;
use crate::modules::notification::{model::NotificationResponse, schema::RequestStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelationshipEvent {
    #[serde(rename_all = "camelCase")]
    Created { user_a: Uuid, user_b: Uuid },
    #[serde(rename_all = "camelCase")]
    Removed { user_a: Uuid, user_b: Uuid },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationEvent {
    Created { notification: NotificationResponse },
    /// A friend request left the pending state
    #[serde(rename_all = "camelCase")]
    Resolved { notification_id: Uuid, status: RequestStatus },
    #[serde(rename_all = "camelCase")]
    Deleted { notification_id: Uuid },
    #[serde(rename_all = "camelCase")]
    Read { notification_id: Uuid },
    AllRead,
}

#[derive(Debug, Clone)]
pub enum ChangeEvent {
    Relationship(RelationshipEvent),
    Notification(NotificationEvent),
}

/// Events published for the same target are delivered in publish order.
pub trait ChangeNotifier: Send + Sync {
    fn publish(&self, event: ChangeEvent, targets: &[Uuid]);
}

/// Routes events through the WebSocket server actor. Its mailbox is FIFO,
/// which preserves per-user ordering.
#[derive(Clone)]
pub struct WsChangeNotifier {
    server: Addr<WebSocketServer>,
}

impl WsChangeNotifier {
    pub fn new(server: Addr<WebSocketServer>) -> Self {
        Self { server }
    }
}

impl ChangeNotifier for WsChangeNotifier {
    fn publish(&self, event: ChangeEvent, targets: &[Uuid]) {
        let mut user_ids = targets.to_vec();
        user_ids.sort_unstable();
        user_ids.dedup();

        match user_ids.as_slice() {
            [] => {}
            [user_id] => self.server.do_send(SendToUser { user_id: *user_id, message: event.into() }),
            _ => self.server.do_send(SendToUsers { user_ids, message: event.into() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix::Actor;
    use tokio::{sync::mpsc, time::timeout};

    use super::*;
    use crate::modules::websocket::events::{Authenticate, Connect, SessionCount};
    use crate::modules::websocket::session::WebSocketSession;
    use crate::utils::JwtSecret;

    /// Starts a session actor bound to `user_id` and returns its outbound channel.
    async fn connect_user(
        server: &Addr<WebSocketServer>,
        user_id: Uuid,
    ) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let session = WebSocketSession::new(server.clone(), tx, JwtSecret("test".into()));
        let session_id = session.id;
        let addr = session.start();

        server.send(Connect { id: session_id, addr }).await.unwrap();
        server.send(Authenticate { session_id, user_id }).await.unwrap().unwrap();
        rx
    }

    #[actix_web::test]
    async fn test_events_reach_only_targeted_users_in_order() {
        let server = WebSocketServer::new().start();
        let notifier = WsChangeNotifier::new(server.clone());

        let (alice, bob, carol) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let mut alice_rx = connect_user(&server, alice).await;
        let mut carol_rx = connect_user(&server, carol).await;

        let request_id = Uuid::now_v7();
        notifier.publish(
            ChangeEvent::Notification(NotificationEvent::Resolved {
                notification_id: request_id,
                status: RequestStatus::Accepted,
            }),
            &[alice, bob],
        );
        notifier.publish(
            ChangeEvent::Relationship(RelationshipEvent::Created { user_a: alice, user_b: bob }),
            &[alice, bob, alice],
        );

        let first: serde_json::Value =
            serde_json::from_str(&alice_rx.recv().await.unwrap()).unwrap();
        let second: serde_json::Value =
            serde_json::from_str(&alice_rx.recv().await.unwrap()).unwrap();
        assert_eq!(first["event"]["kind"], "resolved");
        assert_eq!(second["type"], "relationship");

        // duplicate targets collapse into a single delivery
        let quiet = Duration::from_millis(100);
        assert!(timeout(quiet, alice_rx.recv()).await.is_err());
        assert!(timeout(quiet, carol_rx.recv()).await.is_err());
    }

    #[actix_web::test]
    async fn test_every_session_of_a_user_receives_event() {
        let server = WebSocketServer::new().start();
        let notifier = WsChangeNotifier::new(server.clone());

        let alice = Uuid::now_v7();
        let mut phone = connect_user(&server, alice).await;
        let mut desktop = connect_user(&server, alice).await;
        assert_eq!(server.send(SessionCount { user_id: alice }).await.unwrap(), 2);

        notifier.publish(
            ChangeEvent::Notification(NotificationEvent::AllRead),
            &[alice],
        );

        assert!(phone.recv().await.unwrap().contains("all_read"));
        assert!(desktop.recv().await.unwrap().contains("all_read"));
    }
}
