//! Synthesis endpoint: JSON requests in, JSON events and raw PCM
//! frames out.

use crate::context::EngineContext;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use voxbridge_core::{TtsEvent, TtsRequest};
use voxbridge_tts::{
    fallback_voice, filter_by_locale, process_text, resolve_voice, SynthesisPipeline, TtsFrame,
};

pub async fn ws_handler(
    State(ctx): State<Arc<EngineContext>>,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    upgrade.on_upgrade(move |socket| handle_socket(ctx, socket))
}

async fn handle_socket(ctx: Arc<EngineContext>, socket: WebSocket) {
    info!("synthesis client connected");
    let (mut sender, mut receiver) = socket.split();
    let (frame_tx, mut frame_rx) = mpsc::channel::<TtsFrame>(64);

    tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            let message = match frame {
                TtsFrame::Audio(pcm) => Message::Binary(pcm),
                TtsFrame::Event(event) => match serde_json::to_string(&event) {
                    Ok(payload) => Message::Text(payload),
                    Err(e) => {
                        error!(error = %e, "failed to serialize event");
                        continue;
                    }
                },
            };
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let pipeline = Arc::new(SynthesisPipeline::new(
        Arc::clone(&ctx.synthesizer),
        Arc::clone(&ctx.transcoder),
        ctx.config.tts.buffer_threshold,
    ));
    let mut current_voice = ctx.config.tts.default_voice.clone();
    let mut synth_tasks: Vec<JoinHandle<()>> = Vec::new();

    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<TtsRequest>(&text) {
                Ok(request) => {
                    handle_request(
                        &ctx,
                        &pipeline,
                        &mut current_voice,
                        &mut synth_tasks,
                        request,
                        &frame_tx,
                    )
                    .await;
                }
                Err(e) => {
                    warn!(error = %e, payload = %text, "malformed synthesis request");
                    let _ = frame_tx
                        .send(TtsFrame::Event(TtsEvent::Error {
                            message: format!("invalid request: {e}"),
                        }))
                        .await;
                }
            },
            Message::Binary(_) => {
                warn!("unexpected binary frame on synthesis endpoint, dropped");
            }
            Message::Close(_) => {
                debug!("synthesis client sent close");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    drop(frame_tx);
    // in-flight synthesis tasks finish on their own; their frames go
    // nowhere once the send task exits
    synth_tasks.retain(|t| !t.is_finished());
    if !synth_tasks.is_empty() {
        debug!(
            in_flight = synth_tasks.len(),
            "leaving synthesis tasks to finish"
        );
    }
    info!("synthesis client disconnected");
}

async fn handle_request(
    ctx: &Arc<EngineContext>,
    pipeline: &Arc<SynthesisPipeline>,
    current_voice: &mut String,
    synth_tasks: &mut Vec<JoinHandle<()>>,
    request: TtsRequest,
    frame_tx: &mpsc::Sender<TtsFrame>,
) {
    match request {
        TtsRequest::Synthesize { text, voice } => {
            let (cleaned, emotion) = process_text(&text);
            let requested = voice.unwrap_or_else(|| current_voice.clone());
            let resolved = match ctx.synthesizer.voices().await {
                Ok(catalog) => resolve_voice(&requested, &catalog),
                Err(e) => {
                    warn!(error = %e, "voice catalog unavailable, using requested voice");
                    requested
                }
            };

            // Each request runs as its own task; replies for two quick
            // requests may interleave at the client.
            let pipeline = Arc::clone(pipeline);
            let frame_tx = frame_tx.clone();
            let task = tokio::spawn(async move {
                pipeline.run(&cleaned, &resolved, emotion, &frame_tx).await;
            });
            synth_tasks.retain(|t| !t.is_finished());
            synth_tasks.push(task);
        }
        TtsRequest::ListVoices => {
            let prefix = &ctx.config.tts.locale_prefix;
            let voices = match ctx.synthesizer.voices().await {
                Ok(catalog) => {
                    let filtered: Vec<_> = filter_by_locale(&catalog, prefix)
                        .into_iter()
                        .cloned()
                        .collect();
                    if filtered.is_empty() {
                        vec![fallback_voice(&ctx.config.tts.default_voice)]
                    } else {
                        filtered
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to fetch voice catalog");
                    vec![fallback_voice(&ctx.config.tts.default_voice)]
                }
            };
            let _ = frame_tx
                .send(TtsFrame::Event(TtsEvent::VoicesList { voices }))
                .await;
        }
        TtsRequest::SetVoice { voice } => {
            info!(voice, "voice switched");
            *current_voice = voice.clone();
            let _ = frame_tx
                .send(TtsFrame::Event(TtsEvent::VoiceSet { voice }))
                .await;
        }
    }
}
