//! Chunked transcode-and-forward for synthesized speech.

use crate::text::Emotion;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use voxbridge_core::{SynthesisError, TtsEvent};
use voxbridge_engine::{AudioTranscoder, SpeechSynthesizer};

/// One outbound frame of a synthesis request: a JSON event or a raw
/// PCM block.
#[derive(Debug, Clone, PartialEq)]
pub enum TtsFrame {
    Event(TtsEvent),
    Audio(Vec<u8>),
}

/// Accumulates compressed chunks until a decode is worthwhile.
pub struct StreamingAudioBuffer {
    data: Vec<u8>,
    threshold: usize,
}

impl StreamingAudioBuffer {
    pub fn new(threshold: usize) -> Self {
        Self {
            data: Vec::new(),
            threshold,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.data.extend_from_slice(chunk);
    }

    pub fn ready(&self) -> bool {
        self.data.len() >= self.threshold
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn drain(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }
}

/// Pulls compressed chunks from the synthesizer, decodes them in blocks
/// of at least the configured threshold, and forwards raw PCM as soon as
/// each block is ready so the client can start playback early.
pub struct SynthesisPipeline {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    transcoder: Arc<dyn AudioTranscoder>,
    buffer_threshold: usize,
}

impl SynthesisPipeline {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        transcoder: Arc<dyn AudioTranscoder>,
        buffer_threshold: usize,
    ) -> Self {
        Self {
            synthesizer,
            transcoder,
            buffer_threshold,
        }
    }

    /// Runs one synthesis request to completion. A closed output channel
    /// means the client went away; forwarding just stops. Failures are
    /// reported as an `error` event and abort the request before
    /// `audio_end`.
    pub async fn run(&self, text: &str, voice: &str, emotion: Emotion, out: &mpsc::Sender<TtsFrame>) {
        let emotion = emotion.as_str();
        if send_event(out, TtsEvent::audio_start(voice, emotion)).await.is_err() {
            return;
        }

        if text.trim().is_empty() {
            warn!("empty text after cleanup, skipping synthesis");
            let _ = send_event(out, TtsEvent::audio_end(voice, emotion, 0)).await;
            return;
        }

        let mut chunks = match self.synthesizer.synthesize(text, voice).await {
            Ok(rx) => rx,
            Err(e) => {
                warn!(error = %e, "synthesis request failed");
                let _ = send_error(out, format!("synthesis failed: {e}")).await;
                return;
            }
        };

        let mut buffer = StreamingAudioBuffer::new(self.buffer_threshold);
        let mut total_size = 0usize;

        while let Some(chunk) = chunks.recv().await {
            buffer.push(&chunk);
            if buffer.ready() {
                match self.decode_and_forward(buffer.drain(), out).await {
                    Ok(forwarded) => total_size += forwarded,
                    Err(PipelineHalt::ClientGone) => return,
                    Err(PipelineHalt::Decode(e)) => {
                        let _ = send_error(out, e.to_string()).await;
                        return;
                    }
                }
            }
        }

        if !buffer.is_empty() {
            match self.decode_and_forward(buffer.drain(), out).await {
                Ok(forwarded) => total_size += forwarded,
                Err(PipelineHalt::ClientGone) => return,
                Err(PipelineHalt::Decode(e)) => {
                    let _ = send_error(out, e.to_string()).await;
                    return;
                }
            }
        }

        info!(total_size, voice, emotion, "synthesis request finished");
        let _ = send_event(out, TtsEvent::audio_end(voice, emotion, total_size)).await;
    }

    async fn decode_and_forward(
        &self,
        block: Vec<u8>,
        out: &mpsc::Sender<TtsFrame>,
    ) -> Result<usize, PipelineHalt> {
        let raw = self
            .transcoder
            .decode(&block)
            .await
            .map_err(PipelineHalt::Decode)?;
        if raw.is_empty() {
            return Ok(0);
        }
        let size = raw.len();
        out.send(TtsFrame::Audio(raw))
            .await
            .map_err(|_| PipelineHalt::ClientGone)?;
        Ok(size)
    }
}

enum PipelineHalt {
    ClientGone,
    Decode(SynthesisError),
}

async fn send_event(out: &mpsc::Sender<TtsFrame>, event: TtsEvent) -> Result<(), ()> {
    out.send(TtsFrame::Event(event)).await.map_err(|_| ())
}

async fn send_error(out: &mpsc::Sender<TtsFrame>, message: String) -> Result<(), ()> {
    send_event(out, TtsEvent::Error { message }).await
}
