pub mod config;
pub mod error;
pub mod protocol;
pub mod types;

pub use config::{AppConfig, AsrConfig, ChatConfig, GeneralConfig, ServerConfig, TtsConfig};
pub use error::{ChatError, ConfigError, DecodeError, SynthesisError};
pub use protocol::{
    AsrControl, AsrEvent, TtsEvent, TtsRequest, TTS_BITS_PER_SAMPLE, TTS_CHANNELS, TTS_SAMPLE_RATE,
};
pub use types::{Hypothesis, Utterance, VoiceInfo};
