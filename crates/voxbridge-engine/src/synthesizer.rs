use async_trait::async_trait;
use std::str::FromStr;
use tokio::sync::mpsc;
use voxbridge_core::{SynthesisError, VoiceInfo};

/// Synthesis backend tag, chosen once at startup from `[tts].backend`.
/// Each tag has a dedicated [`SpeechSynthesizer`] implementation; the
/// choice is fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisBackend {
    Http,
    Null,
}

impl SynthesisBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SynthesisBackend::Http => "http",
            SynthesisBackend::Null => "null",
        }
    }
}

impl FromStr for SynthesisBackend {
    type Err = SynthesisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(SynthesisBackend::Http),
            "null" => Ok(SynthesisBackend::Null),
            other => Err(SynthesisError::BackendNotFound(other.to_string())),
        }
    }
}

/// A streaming speech-synthesis capability: text in, a sequence of
/// compressed audio chunks out. Shared read-only across connections.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn backend(&self) -> SynthesisBackend;

    /// The available voice catalog. May be empty when the backend cannot
    /// enumerate voices; callers fall back to the configured default.
    async fn voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError>;

    /// Start synthesis and return a receiver of compressed audio chunks.
    /// The channel closes when synthesis completes.
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
    ) -> Result<mpsc::Receiver<Vec<u8>>, SynthesisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("http".parse::<SynthesisBackend>().unwrap(), SynthesisBackend::Http);
        assert_eq!("null".parse::<SynthesisBackend>().unwrap(), SynthesisBackend::Null);
    }

    #[test]
    fn test_backend_from_str_unknown() {
        match "edge".parse::<SynthesisBackend>() {
            Err(SynthesisError::BackendNotFound(name)) => assert_eq!(name, "edge"),
            _ => panic!("expected BackendNotFound"),
        }
    }

    #[test]
    fn test_backend_as_str_roundtrip() {
        for backend in [SynthesisBackend::Http, SynthesisBackend::Null] {
            assert_eq!(backend.as_str().parse::<SynthesisBackend>().unwrap(), backend);
        }
    }
}
