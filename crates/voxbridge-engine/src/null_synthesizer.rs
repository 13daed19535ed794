use crate::synthesizer::{SpeechSynthesizer, SynthesisBackend};
use async_trait::async_trait;
use tokio::sync::mpsc;
use voxbridge_core::{SynthesisError, VoiceInfo};

/// Synthesizer that emits a fixed set of chunks regardless of input text.
/// Lets the synthesis pipeline run without a real TTS service; tests use
/// it to control chunk sizes exactly.
pub struct NullSynthesizer {
    chunks: Vec<Vec<u8>>,
    voices: Vec<VoiceInfo>,
}

impl NullSynthesizer {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            voices: vec![VoiceInfo {
                name: "Null Voice".to_string(),
                short_name: "zh-CN-NullNeural".to_string(),
                locale: "zh-CN".to_string(),
                gender: "Unknown".to_string(),
            }],
        }
    }

    pub fn with_chunks(mut self, chunks: Vec<Vec<u8>>) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn with_voices(mut self, voices: Vec<VoiceInfo>) -> Self {
        self.voices = voices;
        self
    }
}

impl Default for NullSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for NullSynthesizer {
    fn backend(&self) -> SynthesisBackend {
        SynthesisBackend::Null
    }

    async fn voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        Ok(self.voices.clone())
    }

    async fn synthesize(
        &self,
        _text: &str,
        _voice: &str,
    ) -> Result<mpsc::Receiver<Vec<u8>>, SynthesisError> {
        let (tx, rx) = mpsc::channel(32);
        let chunks = self.chunks.clone();
        tokio::spawn(async move {
            for chunk in chunks {
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_synthesizer_streams_configured_chunks() {
        let synth = NullSynthesizer::new().with_chunks(vec![vec![1u8; 10], vec![2u8; 20]]);
        let mut rx = synth.synthesize("你好", "any").await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), vec![1u8; 10]);
        assert_eq!(rx.recv().await.unwrap(), vec![2u8; 20]);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_null_synthesizer_empty_script_closes_channel() {
        let synth = NullSynthesizer::new();
        let mut rx = synth.synthesize("x", "v").await.unwrap();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_null_synthesizer_default_catalog() {
        let synth = NullSynthesizer::new();
        let voices = synth.voices().await.unwrap();
        assert_eq!(voices.len(), 1);
        assert!(voices[0].locale.starts_with("zh-"));
    }
}
