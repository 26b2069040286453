/// WebSocket Server Actor
///
/// Tracks every WebSocket connection and which user it is authenticated
/// as, and fans change events out to all sessions of the targeted users.
use actix::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::events::*;
use super::message::ServerMessage;
use super::session::WebSocketSession;

pub struct WebSocketServer {
    /// session_id -> session actor address
    sessions: HashMap<Uuid, Addr<WebSocketSession>>,

    /// user_id -> session_ids (one user may be connected from several devices)
    users: HashMap<Uuid, HashSet<Uuid>>,
}

impl WebSocketServer {
    pub fn new() -> Self {
        Self { sessions: HashMap::new(), users: HashMap::new() }
    }

    fn send_to_session(&self, session_id: &Uuid, message: ServerMessage) {
        if let Some(session_addr) = self.sessions.get(session_id) {
            session_addr.do_send(message);
        }
    }

    /// Returns the number of sessions the message was handed to.
    fn send_to_user(&self, user_id: &Uuid, message: &ServerMessage) -> usize {
        let Some(session_ids) = self.users.get(user_id) else {
            return 0;
        };

        for session_id in session_ids {
            self.send_to_session(session_id, message.clone());
        }
        session_ids.len()
    }
}

impl Actor for WebSocketServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server stopped");
    }
}

impl Handler<Connect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        tracing::debug!("New WebSocket session connected: {}", msg.id);
        self.sessions.insert(msg.id, msg.addr);
    }
}

impl Handler<Disconnect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        tracing::debug!("WebSocket session disconnected: {}", msg.id);

        self.sessions.remove(&msg.id);

        let mut user_to_remove: Option<Uuid> = None;
        for (&user_id, sessions) in self.users.iter_mut() {
            if sessions.remove(&msg.id) {
                if sessions.is_empty() {
                    user_to_remove = Some(user_id);
                }
                break;
            }
        }

        if let Some(user_id) = user_to_remove {
            self.users.remove(&user_id);
            tracing::info!("User {} fully disconnected (no more sessions)", user_id);
        }
    }
}

impl Handler<Authenticate> for WebSocketServer {
    type Result = Result<Uuid, String>;

    fn handle(&mut self, msg: Authenticate, _: &mut Context<Self>) -> Self::Result {
        if !self.sessions.contains_key(&msg.session_id) {
            return Err(format!("unknown session {}", msg.session_id));
        }

        let sessions = self.users.entry(msg.user_id).or_default();
        sessions.insert(msg.session_id);

        tracing::info!(
            "User {} authenticated on session {} ({} active)",
            msg.user_id,
            msg.session_id,
            sessions.len()
        );

        Ok(msg.user_id)
    }
}

impl Handler<SendToUser> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: SendToUser, _: &mut Context<Self>) {
        let delivered = self.send_to_user(&msg.user_id, &msg.message);
        if delivered == 0 {
            tracing::debug!("User {} not online, message not sent", msg.user_id);
        }
    }
}

impl Handler<SendToUsers> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: SendToUsers, _: &mut Context<Self>) {
        let sent_count: usize =
            msg.user_ids.iter().map(|user_id| self.send_to_user(user_id, &msg.message)).sum();

        tracing::debug!(
            "Sent message to {} users ({} total sessions)",
            msg.user_ids.len(),
            sent_count
        );
    }
}

#[cfg(test)]
impl Handler<SessionCount> for WebSocketServer {
    type Result = usize;

    fn handle(&mut self, msg: SessionCount, _: &mut Context<Self>) -> Self::Result {
        self.users.get(&msg.user_id).map_or(0, HashSet::len)
    }
}

impl Message for ServerMessage {
    type Result = ();
}

impl Default for WebSocketServer {
    fn default() -> Self {
        Self::new()
    }
}
