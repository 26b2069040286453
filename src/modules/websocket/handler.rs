/// WebSocket HTTP Handler
///
/// Upgrades the HTTP request and runs the bidirectional message loop:
/// - Inbound:  Client -> WebSocket -> parse ClientMessage -> Session Actor
/// - Outbound: Server Actor -> Session Actor -> mpsc channel -> WebSocket -> Client
use actix::{Actor, Addr};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::Message;
use tokio::sync::mpsc;

use super::events::Disconnect;
use super::message::ClientMessage;
use super::server::WebSocketServer;
use super::session::WebSocketSession;
use crate::utils::JwtSecret;

/// Endpoint: GET /ws
pub async fn websocket_handler(
    req: HttpRequest,
    stream: web::Payload,
    server: web::Data<Addr<WebSocketServer>>,
    secret: web::Data<JwtSecret>,
) -> Result<HttpResponse, Error> {
    tracing::debug!("WebSocket upgrade request from {:?}", req.peer_addr());

    let (response, mut ws_session, mut msg_stream) = actix_ws::handle(&req, stream)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let session = WebSocketSession::new(server.get_ref().clone(), tx, secret.get_ref().clone());
    let session_id = session.id;
    let addr = session.start();
    let server = server.get_ref().clone();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                // Client -> Server
                msg = msg_stream.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<ClientMessage>(&text) {
                                Ok(client_msg) => {
                                    addr.do_send(client_msg);
                                }
                                Err(e) => {
                                    tracing::warn!(
                                        "Could not parse client message: {} - raw: {}",
                                        e,
                                        text.chars().take(100).collect::<String>()
                                    );
                                }
                            }
                        }

                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = ws_session.pong(&data).await {
                                tracing::error!("Failed to send pong: {}", e);
                                break;
                            }
                        }

                        Some(Ok(Message::Pong(_))) => {}

                        Some(Ok(Message::Close(reason))) => {
                            tracing::info!("WebSocket close frame: {:?}", reason);
                            break;
                        }

                        Some(Ok(Message::Binary(_))) => {
                            tracing::warn!("Binary messages are not supported");
                        }

                        Some(Ok(Message::Continuation(_) | Message::Nop)) => {}

                        Some(Err(e)) => {
                            tracing::error!("WebSocket protocol error: {}", e);
                            break;
                        }

                        None => break,
                    }
                }

                // Server -> Client
                Some(json) = rx.recv() => {
                    if ws_session.text(json).await.is_err() {
                        tracing::error!("Failed to deliver message to WebSocket client");
                        break;
                    }
                }
            }
        }

        // the server holds the last strong address; releasing it lets the session stop
        server.do_send(Disconnect { id: session_id });
        let _ = ws_session.close(None).await;
        tracing::debug!("WebSocket message loop finished");
    });

    tracing::info!("WebSocket connection established");
    Ok(response)
}
