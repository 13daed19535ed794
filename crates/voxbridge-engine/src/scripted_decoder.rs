use crate::decoder::{DecodeOutcome, DecoderFactory, SpeechDecoder};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use voxbridge_core::{DecodeError, Hypothesis};

/// Decoder that replays a fixed script of outcomes, one per chunk.
/// Used by tests to drive sessions deterministically.
pub struct ScriptedDecoder {
    language: String,
    outcomes: VecDeque<DecodeOutcome>,
    flush_result: Hypothesis,
    fail_on_chunk: bool,
}

impl ScriptedDecoder {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            outcomes: VecDeque::new(),
            flush_result: Hypothesis::final_text("", 0.0),
            fail_on_chunk: false,
        }
    }

    pub fn with_outcomes(mut self, outcomes: Vec<DecodeOutcome>) -> Self {
        self.outcomes = outcomes.into();
        self
    }

    pub fn with_flush(mut self, hypothesis: Hypothesis) -> Self {
        self.flush_result = hypothesis;
        self
    }

    pub fn with_chunk_failure(mut self) -> Self {
        self.fail_on_chunk = true;
        self
    }
}

#[async_trait]
impl SpeechDecoder for ScriptedDecoder {
    fn language(&self) -> &str {
        &self.language
    }

    async fn accept_chunk(&mut self, _audio: &[u8]) -> Result<DecodeOutcome, DecodeError> {
        if self.fail_on_chunk {
            return Err(DecodeError::DecodeFailed("scripted failure".to_string()));
        }
        Ok(self
            .outcomes
            .pop_front()
            .unwrap_or(DecodeOutcome::Partial(String::new())))
    }

    async fn flush(&mut self) -> Result<Hypothesis, DecodeError> {
        Ok(self.flush_result.clone())
    }
}

/// Hands out pre-built decoders in order, ignoring the requested language.
pub struct ScriptedDecoderFactory {
    queue: Mutex<VecDeque<Box<dyn SpeechDecoder>>>,
}

impl ScriptedDecoderFactory {
    pub fn new(decoders: Vec<Box<dyn SpeechDecoder>>) -> Self {
        Self {
            queue: Mutex::new(decoders.into()),
        }
    }
}

impl DecoderFactory for ScriptedDecoderFactory {
    fn create(&self, language: &str) -> Result<Box<dyn SpeechDecoder>, DecodeError> {
        self.queue.lock().unwrap().pop_front().ok_or_else(|| {
            DecodeError::InitializationFailed(format!(
                "no scripted decoder left for language '{language}'"
            ))
        })
    }
}
