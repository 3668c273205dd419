//! Live-reload WebSocket server.
//!
//! Each connection registers a client with the context's registry and receives the
//! reload message as a text frame whenever a watched file changes. Incoming frames
//! are ignored apart from close.

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use kiln_core::SharedContext;

/// Router accepting live-reload connections on any path.
pub fn reload_router(ctx: SharedContext) -> Router {
    Router::new().fallback(handle_upgrade).with_state(ctx)
}

async fn handle_upgrade(ws: WebSocketUpgrade, State(ctx): State<SharedContext>) -> Response {
    ws.on_upgrade(move |socket| client_session(socket, ctx))
}

async fn client_session(mut socket: WebSocket, ctx: SharedContext) {
    let (id, mut rx) = ctx.clients.register();
    tracing::debug!(client = id, clients = ctx.clients.len(), "Live-reload client connected");

    loop {
        tokio::select! {
            outgoing = rx.recv() => {
                let Some(message) = outgoing else { break };
                if let Err(err) = socket.send(Message::Text(message.into())).await {
                    tracing::debug!(client = id, error = %err, "Live-reload send failed");
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    ctx.clients.unregister(id);
    tracing::debug!(client = id, "Live-reload client disconnected");
}
