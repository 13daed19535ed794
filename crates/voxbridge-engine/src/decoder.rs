use async_trait::async_trait;
use std::collections::HashMap;
use voxbridge_core::{DecodeError, Hypothesis};

/// What a decoder produced for one audio chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// In-progress hypothesis; may be empty while the decoder warms up.
    Partial(String),
    /// The decoder detected a segment boundary and finalized it.
    Final(Hypothesis),
}

impl DecodeOutcome {
    pub fn into_final(self) -> Option<Hypothesis> {
        match self {
            DecodeOutcome::Final(hyp) => Some(hyp),
            DecodeOutcome::Partial(_) => None,
        }
    }

    pub fn partial_text(&self) -> Option<&str> {
        match self {
            DecodeOutcome::Partial(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

/// Parameters for constructing one decoder instance.
#[derive(Debug, Clone)]
pub struct DecoderSpec {
    pub language: String,
    pub sample_rate: u32,
}

/// A speech-decoding capability bound to one language.
///
/// Instances are owned exclusively by one recognition session and are
/// never shared; the underlying model may be a process-wide singleton
/// behind the implementation.
#[async_trait]
pub trait SpeechDecoder: Send + Sync {
    fn language(&self) -> &str;

    /// Feed one chunk of raw PCM (16-bit LE mono) and get the decoder's
    /// current view of the segment.
    async fn accept_chunk(&mut self, audio: &[u8]) -> Result<DecodeOutcome, DecodeError>;

    /// Force a terminal hypothesis over any buffered-but-unconsumed audio.
    async fn flush(&mut self) -> Result<Hypothesis, DecodeError>;
}

/// Creates per-session decoder instances; shared across connections.
pub trait DecoderFactory: Send + Sync {
    fn create(&self, language: &str) -> Result<Box<dyn SpeechDecoder>, DecodeError>;
}

pub struct DecoderRegistry {
    factories: HashMap<String, fn(DecoderSpec) -> Box<dyn SpeechDecoder>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("null", |spec| {
            Box::new(crate::null_decoder::NullDecoder::new(spec))
        });
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn(DecoderSpec) -> Box<dyn SpeechDecoder>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(
        &self,
        name: &str,
        spec: DecoderSpec,
    ) -> Result<Box<dyn SpeechDecoder>, DecodeError> {
        self.factories
            .get(name)
            .map(|f| f(spec))
            .ok_or_else(|| DecodeError::EngineNotFound(name.to_string()))
    }

    pub fn list_engines(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// [`DecoderFactory`] backed by a registry, pinned to one engine name and
/// sample rate at startup.
pub struct RegistryDecoderFactory {
    registry: DecoderRegistry,
    engine: String,
    sample_rate: u32,
}

impl RegistryDecoderFactory {
    pub fn new(registry: DecoderRegistry, engine: impl Into<String>, sample_rate: u32) -> Self {
        Self {
            registry,
            engine: engine.into(),
            sample_rate,
        }
    }
}

impl DecoderFactory for RegistryDecoderFactory {
    fn create(&self, language: &str) -> Result<Box<dyn SpeechDecoder>, DecodeError> {
        self.registry.create(
            &self.engine,
            DecoderSpec {
                language: language.to_string(),
                sample_rate: self.sample_rate,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_new_has_null_decoder() {
        let registry = DecoderRegistry::new();
        let spec = DecoderSpec {
            language: "zh".to_string(),
            sample_rate: 16_000,
        };
        assert!(registry.create("null", spec).is_ok());
    }

    #[test]
    fn test_registry_create_unknown_returns_error() {
        let registry = DecoderRegistry::new();
        let spec = DecoderSpec {
            language: "zh".to_string(),
            sample_rate: 16_000,
        };
        match registry.create("nope", spec) {
            Err(DecodeError::EngineNotFound(name)) => assert_eq!(name, "nope"),
            _ => panic!("expected EngineNotFound"),
        }
    }

    #[test]
    fn test_registry_list_engines_includes_null() {
        let registry = DecoderRegistry::new();
        assert!(registry.list_engines().contains(&"null"));
    }

    #[test]
    fn test_registry_factory_pins_engine_and_rate() {
        let factory = RegistryDecoderFactory::new(DecoderRegistry::new(), "null", 16_000);
        let decoder = factory.create("en").unwrap();
        assert_eq!(decoder.language(), "en");
    }

    #[test]
    fn test_decode_outcome_partial_text_filters_empty() {
        assert_eq!(
            DecodeOutcome::Partial("你好".to_string()).partial_text(),
            Some("你好")
        );
        assert_eq!(DecodeOutcome::Partial(String::new()).partial_text(), None);
        assert_eq!(
            DecodeOutcome::Final(Hypothesis::final_text("x", 1.0)).partial_text(),
            None
        );
    }

    #[test]
    fn test_decode_outcome_into_final() {
        let hyp = Hypothesis::final_text("好的", 0.8);
        assert_eq!(
            DecodeOutcome::Final(hyp.clone()).into_final(),
            Some(hyp)
        );
        assert_eq!(DecodeOutcome::Partial("x".to_string()).into_final(), None);
    }
}
