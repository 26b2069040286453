/// Realtime change feed
///
/// Pushes relationship and notification changes to connected clients over
/// WebSocket:
///
/// - Message protocol (ClientMessage & ServerMessage)
/// - WebSocket Server actor (tracks authenticated sessions per user)
/// - WebSocket Session actor (one per connection)
/// - HTTP handler (upgrades HTTP to WebSocket)
/// - ChangeNotifier (the publish side used by the services)
pub mod events;
pub mod handler;
pub mod message;
pub mod notifier;
pub mod server;
pub mod session;
