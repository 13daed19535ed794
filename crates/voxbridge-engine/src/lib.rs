//! Pluggable speech decoding, synthesis, and transcoding backends.

pub mod decoder;
pub mod http_synthesizer;
pub mod null_decoder;
pub mod null_synthesizer;
pub mod scripted_decoder;
pub mod synthesizer;
pub mod transcode;

pub use decoder::{
    DecodeOutcome, DecoderFactory, DecoderRegistry, DecoderSpec, RegistryDecoderFactory,
    SpeechDecoder,
};
pub use http_synthesizer::HttpSynthesizer;
pub use null_decoder::NullDecoder;
pub use null_synthesizer::NullSynthesizer;
pub use scripted_decoder::{ScriptedDecoder, ScriptedDecoderFactory};
pub use synthesizer::{SpeechSynthesizer, SynthesisBackend};
pub use transcode::{AudioTranscoder, FfmpegTranscoder, PassthroughTranscoder};
