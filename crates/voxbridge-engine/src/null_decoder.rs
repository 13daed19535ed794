use crate::decoder::{DecodeOutcome, DecoderSpec, SpeechDecoder};
use async_trait::async_trait;
use voxbridge_core::{DecodeError, Hypothesis};

/// Decoder that consumes audio and never recognizes anything. Lets the
/// server run end-to-end without a speech model attached.
pub struct NullDecoder {
    spec: DecoderSpec,
    bytes_fed: usize,
}

impl NullDecoder {
    pub fn new(spec: DecoderSpec) -> Self {
        Self { spec, bytes_fed: 0 }
    }

    pub fn bytes_fed(&self) -> usize {
        self.bytes_fed
    }
}

#[async_trait]
impl SpeechDecoder for NullDecoder {
    fn language(&self) -> &str {
        &self.spec.language
    }

    async fn accept_chunk(&mut self, audio: &[u8]) -> Result<DecodeOutcome, DecodeError> {
        self.bytes_fed += audio.len();
        tracing::trace!(
            language = %self.spec.language,
            chunk_bytes = audio.len(),
            total_bytes = self.bytes_fed,
            "null decoder consumed chunk"
        );
        Ok(DecodeOutcome::Partial(String::new()))
    }

    async fn flush(&mut self) -> Result<Hypothesis, DecodeError> {
        Ok(Hypothesis::final_text("", 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_decoder() -> NullDecoder {
        NullDecoder::new(DecoderSpec {
            language: "zh".to_string(),
            sample_rate: 16_000,
        })
    }

    #[tokio::test]
    async fn test_null_decoder_counts_bytes() {
        let mut decoder = make_decoder();
        decoder.accept_chunk(&[0u8; 320]).await.unwrap();
        decoder.accept_chunk(&[0u8; 160]).await.unwrap();
        assert_eq!(decoder.bytes_fed(), 480);
    }

    #[tokio::test]
    async fn test_null_decoder_emits_empty_partial() {
        let mut decoder = make_decoder();
        let outcome = decoder.accept_chunk(&[0u8; 320]).await.unwrap();
        assert_eq!(outcome, DecodeOutcome::Partial(String::new()));
    }

    #[tokio::test]
    async fn test_null_decoder_flush_is_empty_final() {
        let mut decoder = make_decoder();
        let hyp = decoder.flush().await.unwrap();
        assert!(hyp.is_final);
        assert!(hyp.is_empty());
    }

    #[test]
    fn test_null_decoder_language() {
        let decoder = make_decoder();
        assert_eq!(decoder.language(), "zh");
    }
}
