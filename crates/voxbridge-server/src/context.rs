//! Process-wide engine handles, built once at startup and shared
//! read-only across connections.

use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use voxbridge_asr::ChatDispatcher;
use voxbridge_core::{AppConfig, ConfigError, TTS_SAMPLE_RATE};
use voxbridge_engine::{
    AudioTranscoder, DecoderFactory, DecoderRegistry, FfmpegTranscoder, HttpSynthesizer,
    NullSynthesizer, PassthroughTranscoder, RegistryDecoderFactory, SpeechSynthesizer,
    SynthesisBackend,
};

pub struct EngineContext {
    pub config: AppConfig,
    pub decoder_factory: Arc<dyn DecoderFactory>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub transcoder: Arc<dyn AudioTranscoder>,
    pub chat: Option<Arc<ChatDispatcher>>,
}

impl EngineContext {
    pub fn from_config(config: AppConfig) -> Result<Self, ConfigError> {
        let decoder_factory: Arc<dyn DecoderFactory> = Arc::new(RegistryDecoderFactory::new(
            DecoderRegistry::new(),
            config.asr.engine.clone(),
            config.asr.sample_rate,
        ));

        let backend =
            SynthesisBackend::from_str(&config.tts.backend).map_err(|e| ConfigError::InvalidValue {
                key: "tts.backend".to_string(),
                message: e.to_string(),
            })?;
        let (synthesizer, transcoder): (Arc<dyn SpeechSynthesizer>, Arc<dyn AudioTranscoder>) =
            match backend {
                SynthesisBackend::Http => {
                    let endpoint = config.tts.endpoint.clone().ok_or_else(|| {
                        ConfigError::InvalidValue {
                            key: "tts.endpoint".to_string(),
                            message: "required for the http backend".to_string(),
                        }
                    })?;
                    (
                        Arc::new(HttpSynthesizer::new(reqwest_client()?, endpoint)),
                        Arc::new(FfmpegTranscoder::new(TTS_SAMPLE_RATE)),
                    )
                }
                SynthesisBackend::Null => (
                    Arc::new(NullSynthesizer::new()),
                    Arc::new(PassthroughTranscoder),
                ),
            };

        let chat = match &config.chat {
            Some(chat_config) => {
                let dispatcher =
                    ChatDispatcher::new(chat_config.clone()).map_err(|e| ConfigError::InvalidValue {
                        key: "chat".to_string(),
                        message: e.to_string(),
                    })?;
                Some(Arc::new(dispatcher))
            }
            None => {
                info!("no chat section configured, utterances are reported as sentence_complete");
                None
            }
        };

        info!(
            engine = %config.asr.engine,
            backend = backend.as_str(),
            chat = chat.is_some(),
            "engine context initialized"
        );
        Ok(Self {
            config,
            decoder_factory,
            synthesizer,
            transcoder,
            chat,
        })
    }
}

fn reqwest_client() -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .build()
        .map_err(|e| ConfigError::InvalidValue {
            key: "tts.endpoint".to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxbridge_core::TtsConfig;

    fn null_config() -> AppConfig {
        AppConfig {
            tts: TtsConfig {
                backend: "null".to_string(),
                ..TtsConfig::default()
            },
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_context_with_null_backend() {
        let ctx = EngineContext::from_config(null_config()).unwrap();
        assert!(ctx.chat.is_none());
        assert_eq!(ctx.synthesizer.backend(), SynthesisBackend::Null);
    }

    #[test]
    fn test_context_rejects_unknown_backend() {
        let mut config = null_config();
        config.tts.backend = "bogus".to_string();
        assert!(EngineContext::from_config(config).is_err());
    }

    #[test]
    fn test_http_backend_requires_endpoint() {
        let mut config = null_config();
        config.tts.backend = "http".to_string();
        config.tts.endpoint = None;
        assert!(EngineContext::from_config(config).is_err());
    }
}
