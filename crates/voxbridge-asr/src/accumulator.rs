//! Sentence-boundary accumulation over merged recognition fragments.

use std::time::{Duration, Instant};
use voxbridge_core::Utterance;

/// The set of sentence-ending marks. Defaults to the CJK and Latin
/// terminators but is configurable per deployment under `[asr]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceTerminators {
    chars: Vec<char>,
}

impl SentenceTerminators {
    pub fn new(chars: &str) -> Self {
        Self {
            chars: chars.chars().collect(),
        }
    }

    pub fn is_terminal(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    pub fn contains_terminal(&self, text: &str) -> bool {
        text.chars().any(|c| self.is_terminal(c))
    }
}

impl Default for SentenceTerminators {
    fn default() -> Self {
        Self::new("。！？.!?")
    }
}

/// Collects merged recognition fragments until a full sentence emerges,
/// either by terminal punctuation or by silence timeout.
///
/// `append` and `check_timeout` mutate the same buffer from different
/// tasks; callers serialize them behind a mutex per session.
pub struct SentenceAccumulator {
    terminators: SentenceTerminators,
    min_sentence_length: usize,
    silence_timeout: Duration,
    buffer: String,
    last_update: Instant,
}

impl SentenceAccumulator {
    pub fn new(
        terminators: SentenceTerminators,
        min_sentence_length: usize,
        silence_timeout: Duration,
    ) -> Self {
        Self {
            terminators,
            min_sentence_length,
            silence_timeout,
            buffer: String::new(),
            last_update: Instant::now(),
        }
    }

    /// Add one recognized fragment. Returns a completed utterance when
    /// the buffer now contains a terminal mark and the trimmed sentence
    /// is long enough; a too-short sentence is dropped, not retried.
    pub fn append(&mut self, text: &str) -> Option<Utterance> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if self.buffer.is_empty() {
            self.buffer.push_str(text);
        } else {
            self.buffer.push(' ');
            self.buffer.push_str(text);
        }
        self.last_update = Instant::now();

        if self.terminators.contains_terminal(&self.buffer) {
            return self.take_sentence();
        }
        None
    }

    /// Called by the periodic silence task. Finalizes the buffer without
    /// punctuation once no fragment has arrived for the timeout window.
    pub fn check_timeout(&mut self, now: Instant) -> Option<Utterance> {
        if self.buffer.is_empty() {
            return None;
        }
        if now.duration_since(self.last_update) >= self.silence_timeout {
            return self.take_sentence();
        }
        None
    }

    /// Finalize whatever is buffered, used when the session drains.
    pub fn force_flush(&mut self) -> Option<Utterance> {
        if self.buffer.is_empty() {
            return None;
        }
        self.take_sentence()
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_update = Instant::now();
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn take_sentence(&mut self) -> Option<Utterance> {
        let sentence = self.buffer.trim().to_string();
        self.buffer.clear();
        if sentence.chars().count() >= self.min_sentence_length {
            Some(Utterance::new(sentence))
        } else {
            None
        }
    }
}
