use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use voxbridge_core::SynthesisError;

/// Decodes a block of compressed audio into raw PCM of the fixed output
/// format (16-bit LE, mono).
///
/// Blocks are decoded independently, with no decoder state carried from
/// one block to the next. Depending on the compressed format's framing,
/// a block boundary can fall inside a frame and produce a small artifact
/// at the seam; this mirrors the upstream service's chunking behavior
/// and is accepted rather than hidden behind a stateful decoder.
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    async fn decode(&self, block: &[u8]) -> Result<Vec<u8>, SynthesisError>;
}

/// [`AudioTranscoder`] shelling out to `ffmpeg`.
pub struct FfmpegTranscoder {
    sample_rate: u32,
}

impl FfmpegTranscoder {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn decode(&self, block: &[u8]) -> Result<Vec<u8>, SynthesisError> {
        let mut child = Command::new("ffmpeg")
            .args([
                "-hide_banner",
                "-loglevel",
                "error",
                "-i",
                "pipe:0",
                "-f",
                "s16le",
                "-acodec",
                "pcm_s16le",
                "-ac",
                "1",
                "-ar",
            ])
            .arg(self.sample_rate.to_string())
            .arg("pipe:1")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    SynthesisError::TranscoderUnavailable("ffmpeg not found on PATH".to_string())
                }
                _ => SynthesisError::TranscodeFailed(e.to_string()),
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            SynthesisError::TranscodeFailed("failed to open ffmpeg stdin".to_string())
        })?;
        let mut stdout = child.stdout.take().ok_or_else(|| {
            SynthesisError::TranscodeFailed("failed to open ffmpeg stdout".to_string())
        })?;

        // Write and read concurrently so a large block cannot deadlock on
        // full pipes.
        let input = block.to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        let mut raw = Vec::new();
        stdout
            .read_to_end(&mut raw)
            .await
            .map_err(|e| SynthesisError::TranscodeFailed(e.to_string()))?;

        // A broken-pipe write error just means ffmpeg stopped reading;
        // the exit status below is authoritative.
        let _ = writer.await;

        let status = child
            .wait()
            .await
            .map_err(|e| SynthesisError::TranscodeFailed(e.to_string()))?;
        if !status.success() && raw.is_empty() {
            return Err(SynthesisError::TranscodeFailed(format!(
                "ffmpeg exited with {status}"
            )));
        }

        Ok(raw)
    }
}

/// [`AudioTranscoder`] that returns its input unchanged. Paired with the
/// null synthesis backend so byte accounting stays exact in tests.
pub struct PassthroughTranscoder;

#[async_trait]
impl AudioTranscoder for PassthroughTranscoder {
    async fn decode(&self, block: &[u8]) -> Result<Vec<u8>, SynthesisError> {
        Ok(block.to_vec())
    }
}
