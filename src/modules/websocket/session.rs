/// WebSocket Session Actor
///
/// Each WebSocket connection gets its own Session actor. The session holds
/// the authenticated user id and forwards server messages to the client
/// through the mpsc channel bridged in handler.rs.
use actix::prelude::*;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::utils::{Claims, JwtSecret};

use super::events::*;
use super::message::{ClientMessage, ServerMessage};
use super::server::WebSocketServer;

pub struct WebSocketSession {
    pub id: Uuid,

    /// Set once the client has authenticated
    pub user_id: Option<Uuid>,

    pub server: Addr<WebSocketServer>,

    /// Outbound JSON frames (bridge -> handler.rs -> WebSocket)
    pub tx: mpsc::UnboundedSender<String>,

    secret: JwtSecret,
}

impl WebSocketSession {
    pub fn new(
        server: Addr<WebSocketServer>,
        tx: mpsc::UnboundedSender<String>,
        secret: JwtSecret,
    ) -> Self {
        Self { id: Uuid::now_v7(), user_id: None, server, tx, secret }
    }

    fn send_to_client(&self, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = self.tx.send(json) {
                    tracing::error!("Failed to send message to client (session {}): {}", self.id, e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to serialize ServerMessage (session {}): {}", self.id, e);
            }
        }
    }

    fn send_error(&self, message: &str) {
        self.send_to_client(&ServerMessage::Error { message: message.to_string() });
    }

    fn handle_client_message(&mut self, msg: &ClientMessage) {
        match msg {
            ClientMessage::Auth { token } => self.handle_auth(token),
            ClientMessage::Ping => self.send_to_client(&ServerMessage::Pong),
        }
    }

    /// Verify the bearer token and bind this session to its user
    fn handle_auth(&mut self, token: &str) {
        if self.user_id.is_some() {
            self.send_error("Session already authenticated");
            return;
        }

        let claims = match Claims::decode(token, self.secret.as_bytes()) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("JWT verification failed (session {}): {}", self.id, e);
                self.send_to_client(&ServerMessage::AuthFailed {
                    reason: "Token invalid or expired".to_string(),
                });
                return;
            }
        };

        let user_id = claims.sub;
        self.user_id = Some(user_id);

        // the feed is filtered server-side: only events targeted at this user arrive
        self.server.do_send(Authenticate { session_id: self.id, user_id });

        self.send_to_client(&ServerMessage::AuthSuccess { user_id });

        tracing::info!("User {} authenticated on session {}", user_id, self.id);
    }
}

impl Actor for WebSocketSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session started: {}", self.id);
        self.server.do_send(Connect { id: self.id, addr: ctx.address() });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session stopped: {}", self.id);
        self.server.do_send(Disconnect { id: self.id });
    }
}

impl Message for ClientMessage {
    type Result = ();
}

impl Handler<ClientMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, _ctx: &mut Context<Self>) {
        self.handle_client_message(&msg);
    }
}

impl Handler<ServerMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, _ctx: &mut Context<Self>) {
        self.send_to_client(&msg);
    }
}
