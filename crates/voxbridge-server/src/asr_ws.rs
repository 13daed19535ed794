//! Recognition endpoint: binary PCM frames in, JSON events out.

use crate::context::EngineContext;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use voxbridge_core::{AsrControl, AsrEvent};
use voxbridge_asr::RecognitionSession;

pub async fn ws_handler(
    State(ctx): State<Arc<EngineContext>>,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    upgrade.on_upgrade(move |socket| handle_socket(ctx, socket))
}

async fn handle_socket(ctx: Arc<EngineContext>, socket: WebSocket) {
    info!("recognition client connected");
    let (mut sender, mut receiver) = socket.split();
    let (event_tx, mut event_rx) = mpsc::channel::<AsrEvent>(64);

    // Detached dispatch tasks keep clones of event_tx; the send task
    // runs until the last of them drops or the socket closes.
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    error!(error = %e, "failed to serialize event");
                    continue;
                }
            };
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    let mut session = RecognitionSession::new(
        ctx.config.asr.clone(),
        Arc::clone(&ctx.decoder_factory),
        ctx.chat.clone(),
        event_tx.clone(),
    );

    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<AsrControl>(&text) {
                Ok(AsrControl::Start) => session.handle_start().await,
                Ok(AsrControl::Stop) => session.handle_stop().await,
                Err(e) => {
                    warn!(error = %e, payload = %text, "malformed control message, dropped");
                }
            },
            Message::Binary(audio) => session.handle_audio(&audio).await,
            Message::Close(_) => {
                debug!("recognition client sent close");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    session.teardown().await;
    drop(event_tx);
    info!("recognition client disconnected");
}
