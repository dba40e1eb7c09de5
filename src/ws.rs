use crate::client::{ClientMessage, MoodClient, ServerMessage};
use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Runs one page's client. Page intents and record changes are handled
/// in arrival order on this task.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut client = MoodClient::new(Arc::clone(&state.identity), Arc::clone(&state.store));
    debug!("websocket connection established");

    if send_all(&mut sender, client.hello()).await.is_err() {
        return;
    }

    loop {
        let outgoing = tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => client.handle(message).await,
                    Err(err) => {
                        warn!("malformed client message: {err}");
                        vec![ServerMessage::error("The request could not be understood.")]
                    }
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(err)) => {
                    debug!("websocket receive failed: {err}");
                    break;
                }
            },
            outgoing = client.next_change() => outgoing,
        };

        if send_all(&mut sender, outgoing).await.is_err() {
            break;
        }
    }

    debug!("websocket connection closed");
}

async fn send_all(
    sender: &mut SplitSink<WebSocket, Message>,
    messages: Vec<ServerMessage>,
) -> Result<(), axum::Error> {
    for message in messages {
        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(err) => {
                error!("failed to encode server message: {err}");
                continue;
            }
        };
        sender.send(Message::Text(text)).await?;
    }
    Ok(())
}
