//! Per-connection recognition state machine.
//!
//! Driven by the connection's sequential message loop: one `start`
//! control creates the decoders and the silence-check task, audio
//! chunks feed every active decoder, `stop` drains and returns to idle.

use crate::accumulator::{SentenceAccumulator, SentenceTerminators};
use crate::chat::ChatDispatcher;
use crate::merger;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use voxbridge_core::{AsrConfig, AsrEvent, Hypothesis, Utterance};
use voxbridge_engine::{DecoderFactory, SpeechDecoder};

/// Routes a completed utterance either into a spawned chat dispatch or,
/// with no chat back-end configured, straight to the client.
#[derive(Clone)]
struct UtteranceSink {
    events: mpsc::Sender<AsrEvent>,
    chat: Option<Arc<ChatDispatcher>>,
    dispatches: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl UtteranceSink {
    async fn handle(&self, utterance: Utterance) {
        info!(text = %utterance.text, "utterance completed");
        match &self.chat {
            Some(dispatcher) => {
                let dispatcher = Arc::clone(dispatcher);
                let events = self.events.clone();
                let task = tokio::spawn(async move {
                    dispatcher.dispatch(&utterance.text, &events).await;
                });
                let mut dispatches = self.dispatches.lock().await;
                dispatches.retain(|t| !t.is_finished());
                dispatches.push(task);
            }
            None => {
                let _ = self
                    .events
                    .send(AsrEvent::SentenceComplete {
                        text: utterance.text,
                    })
                    .await;
            }
        }
    }

    /// Tracked dispatch tasks are released, not aborted: a reply still
    /// in flight when the session winds down runs to completion, and
    /// its sends fail silently once the client is gone.
    async fn release_dispatches(&self) {
        let tasks: Vec<JoinHandle<()>> = self.dispatches.lock().await.drain(..).collect();
        let in_flight = tasks.iter().filter(|t| !t.is_finished()).count();
        if in_flight > 0 {
            debug!(in_flight, "leaving dispatch tasks to finish");
        }
    }
}

struct ActiveState {
    primary: Box<dyn SpeechDecoder>,
    secondary: Option<Box<dyn SpeechDecoder>>,
    accumulator: Arc<Mutex<SentenceAccumulator>>,
    silence_task: JoinHandle<()>,
}

pub struct RecognitionSession {
    config: AsrConfig,
    factory: Arc<dyn DecoderFactory>,
    events: mpsc::Sender<AsrEvent>,
    sink: UtteranceSink,
    active: Option<ActiveState>,
}

impl RecognitionSession {
    pub fn new(
        config: AsrConfig,
        factory: Arc<dyn DecoderFactory>,
        chat: Option<Arc<ChatDispatcher>>,
        events: mpsc::Sender<AsrEvent>,
    ) -> Self {
        let sink = UtteranceSink {
            events: events.clone(),
            chat,
            dispatches: Arc::new(Mutex::new(Vec::new())),
        };
        Self {
            config,
            factory,
            events,
            sink,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Idle→Active. A `start` while already active drains the previous
    /// cycle first.
    pub async fn handle_start(&mut self) {
        if self.active.is_some() {
            warn!("start received while active, restarting session");
            self.teardown().await;
        }

        let primary = match self.factory.create(&self.config.primary_language) {
            Ok(decoder) => decoder,
            Err(e) => {
                error!(error = %e, language = %self.config.primary_language, "failed to create primary decoder");
                self.send_error(format!("failed to initialize decoder: {e}")).await;
                return;
            }
        };
        let secondary = match &self.config.secondary_language {
            Some(language) => match self.factory.create(language) {
                Ok(decoder) => Some(decoder),
                Err(e) => {
                    error!(error = %e, language = %language, "failed to create secondary decoder");
                    self.send_error(format!("failed to initialize decoder: {e}")).await;
                    return;
                }
            },
            None => None,
        };

        let accumulator = Arc::new(Mutex::new(SentenceAccumulator::new(
            SentenceTerminators::new(&self.config.sentence_terminators),
            self.config.min_sentence_length,
            self.config.silence_timeout(),
        )));
        let silence_task = spawn_silence_task(
            Arc::clone(&accumulator),
            self.sink.clone(),
            self.config.silence_check_interval(),
        );

        self.active = Some(ActiveState {
            primary,
            secondary,
            accumulator,
            silence_task,
        });
        info!(
            primary = %self.config.primary_language,
            secondary = ?self.config.secondary_language,
            "recognition session started"
        );
        let _ = self.events.send(AsrEvent::Ready).await;
    }

    /// Feed one binary audio frame to every active decoder. Ignored
    /// while idle.
    pub async fn handle_audio(&mut self, audio: &[u8]) {
        let Some(active) = self.active.as_mut() else {
            debug!("audio frame while idle, dropped");
            return;
        };

        let mut primary_final: Option<Hypothesis> = None;
        let mut secondary_final: Option<Hypothesis> = None;
        let mut partial: Option<String> = None;

        match active.primary.accept_chunk(audio).await {
            Ok(outcome) => {
                if let Some(text) = outcome.partial_text() {
                    partial = Some(text.to_string());
                }
                primary_final = outcome.into_final();
            }
            Err(e) => {
                error!(error = %e, "primary decoder failed on chunk");
                self.send_error(format!("decode error: {e}")).await;
                return;
            }
        }

        if let Some(secondary) = active.secondary.as_mut() {
            match secondary.accept_chunk(audio).await {
                Ok(outcome) => {
                    if partial.is_none() {
                        partial = outcome.partial_text().map(str::to_string);
                    }
                    secondary_final = outcome.into_final();
                }
                Err(e) => {
                    error!(error = %e, "secondary decoder failed on chunk");
                    self.send_error(format!("decode error: {e}")).await;
                    return;
                }
            }
        }

        if primary_final.is_some() || secondary_final.is_some() {
            let merged = merger::merge(primary_final.as_ref(), secondary_final.as_ref());
            if let Some(merged) = merged {
                debug!(text = %merged.text, confidence = merged.confidence, "merged final hypothesis");
                let _ = self
                    .events
                    .send(AsrEvent::Result {
                        text: merged.text.clone(),
                    })
                    .await;
                let utterance = active.accumulator.lock().await.append(&merged.text);
                if let Some(utterance) = utterance {
                    self.sink.handle(utterance).await;
                }
            }
        } else if let Some(text) = partial {
            let _ = self.events.send(AsrEvent::Partial { text }).await;
        }
    }

    /// Active→Draining→Idle. Flushes decoder tails, force-finalizes the
    /// accumulator, and stops the silence task.
    pub async fn handle_stop(&mut self) {
        let Some(mut active) = self.active.take() else {
            debug!("stop while idle, ignored");
            return;
        };

        let primary_tail = match active.primary.flush().await {
            Ok(hyp) => Some(hyp),
            Err(e) => {
                warn!(error = %e, "primary decoder flush failed");
                None
            }
        };
        let secondary_tail = match active.secondary.as_mut() {
            Some(decoder) => match decoder.flush().await {
                Ok(hyp) => Some(hyp),
                Err(e) => {
                    warn!(error = %e, "secondary decoder flush failed");
                    None
                }
            },
            None => None,
        };

        let merged = merger::merge(primary_tail.as_ref(), secondary_tail.as_ref());
        let utterance = {
            let mut accumulator = active.accumulator.lock().await;
            let mut utterance = None;
            if let Some(merged) = &merged {
                utterance = accumulator.append(&merged.text);
            }
            if utterance.is_none() {
                utterance = accumulator.force_flush();
            }
            accumulator.reset();
            utterance
        };

        if let Some(merged) = merged {
            let _ = self.events.send(AsrEvent::Final { text: merged.text }).await;
        }
        if let Some(utterance) = utterance {
            self.sink.handle(utterance).await;
        }

        active.silence_task.abort();
        let _ = active.silence_task.await;
        self.sink.release_dispatches().await;
        info!("recognition session stopped");
    }

    /// Connection closed: stop the silence task and drop decoder
    /// handles without emitting events. In-flight dispatch tasks are
    /// left to finish on their own.
    pub async fn teardown(&mut self) {
        if let Some(active) = self.active.take() {
            active.silence_task.abort();
            let _ = active.silence_task.await;
            active.accumulator.lock().await.reset();
        }
        self.sink.release_dispatches().await;
    }

    async fn send_error(&self, message: String) {
        let _ = self.events.send(AsrEvent::Error { message }).await;
    }
}

fn spawn_silence_task(
    accumulator: Arc<Mutex<SentenceAccumulator>>,
    sink: UtteranceSink,
    interval: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let utterance = accumulator.lock().await.check_timeout(Instant::now());
            if let Some(utterance) = utterance {
                debug!(text = %utterance.text, "sentence finalized by silence timeout");
                sink.handle(utterance).await;
            }
        }
    })
}
