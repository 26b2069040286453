/// WebSocket Actor Events
///
/// Messages exchanged between the Session actors and the Server actor.
use actix::prelude::*;
use uuid::Uuid;

use super::message::ServerMessage;
use super::session::WebSocketSession;

/// Event: a session connected to the WebSocket server
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    /// Unique session ID
    pub id: Uuid,
    /// Session actor address used for delivery
    pub addr: Addr<WebSocketSession>,
}

/// Event: a session disconnected
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: Uuid,
}

/// Event: a session authenticated as a user
#[derive(Message)]
#[rtype(result = "Result<Uuid, String>")]
pub struct Authenticate {
    pub session_id: Uuid,
    pub user_id: Uuid,
}

/// Event: deliver a message to every session of one user
#[derive(Message)]
#[rtype(result = "()")]
pub struct SendToUser {
    pub user_id: Uuid,
    pub message: ServerMessage,
}

/// Event: deliver a message to every session of several users
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct SendToUsers {
    pub user_ids: Vec<Uuid>,
    pub message: ServerMessage,
}

/// Event: number of live sessions for a user
#[cfg(test)]
#[derive(Message)]
#[rtype(result = "usize")]
pub struct SessionCount {
    pub user_id: Uuid,
}
