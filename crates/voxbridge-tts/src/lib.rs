//! Synthesis-side pipeline: text cleanup, voice resolution, and the
//! chunked transcode-and-forward loop.

pub mod pipeline;
pub mod text;
pub mod voices;

pub use pipeline::{StreamingAudioBuffer, SynthesisPipeline, TtsFrame};
pub use text::{process_text, Emotion};
pub use voices::{fallback_voice, filter_by_locale, resolve_voice};
