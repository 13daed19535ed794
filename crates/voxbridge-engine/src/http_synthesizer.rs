use crate::synthesizer::{SpeechSynthesizer, SynthesisBackend};
use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{mpsc, OnceCell};
use voxbridge_core::{SynthesisError, VoiceInfo};

/// Synthesizer backed by a remote streaming TTS service over HTTP.
///
/// `POST {endpoint}` with `{"text", "voice"}` returns compressed audio as
/// a chunked body; `GET {endpoint}/voices` returns the voice catalog,
/// fetched once per synthesizer and cached. A failed fetch is not
/// cached, so the next call retries.
pub struct HttpSynthesizer {
    client: reqwest::Client,
    endpoint: String,
    catalog: OnceCell<Vec<VoiceInfo>>,
}

impl HttpSynthesizer {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            catalog: OnceCell::new(),
        }
    }

    fn voices_url(&self) -> String {
        format!("{}/voices", self.endpoint.trim_end_matches('/'))
    }

    async fn fetch_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        let response = self
            .client
            .get(self.voices_url())
            .send()
            .await
            .map_err(|e| SynthesisError::SynthesisFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SynthesisError::SynthesisFailed(format!(
                "voice catalog request returned status {}",
                response.status().as_u16()
            )));
        }

        response
            .json::<Vec<VoiceInfo>>()
            .await
            .map_err(|e| SynthesisError::SynthesisFailed(e.to_string()))
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSynthesizer {
    fn backend(&self) -> SynthesisBackend {
        SynthesisBackend::Http
    }

    async fn voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        let catalog = self
            .catalog
            .get_or_try_init(|| self.fetch_voices())
            .await?;
        Ok(catalog.clone())
    }

    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
    ) -> Result<mpsc::Receiver<Vec<u8>>, SynthesisError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "text": text, "voice": voice }))
            .send()
            .await
            .map_err(|e| SynthesisError::SynthesisFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SynthesisError::SynthesisFailed(format!(
                "synthesis request returned status {}",
                response.status().as_u16()
            )));
        }

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(bytes) if bytes.is_empty() => {}
                    Ok(bytes) => {
                        if tx.send(bytes.to_vec()).await.is_err() {
                            // consumer gone, stop pulling from the service
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("synthesis stream ended with error: {e}");
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_synthesizer_backend_tag() {
        let synth = HttpSynthesizer::new(reqwest::Client::new(), "http://localhost:7700/tts");
        assert_eq!(synth.backend(), SynthesisBackend::Http);
    }

    #[test]
    fn test_http_synthesizer_voices_url() {
        let synth = HttpSynthesizer::new(reqwest::Client::new(), "http://localhost:7700/tts/");
        assert_eq!(synth.voices_url(), "http://localhost:7700/tts/voices");
    }

    #[tokio::test]
    async fn test_voices_served_from_cache() {
        // endpoint is unreachable, so a cache miss would error out
        let synth = HttpSynthesizer::new(reqwest::Client::new(), "http://127.0.0.1:1/tts");
        let cached = vec![VoiceInfo {
            name: "Microsoft Xiaoxiao Online".to_string(),
            short_name: "zh-CN-XiaoxiaoNeural".to_string(),
            locale: "zh-CN".to_string(),
            gender: "Female".to_string(),
        }];
        synth.catalog.set(cached.clone()).unwrap();

        let voices = synth.voices().await.unwrap();
        assert_eq!(voices, cached);
    }
}
