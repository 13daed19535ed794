//! Streaming chat-completion dispatch for finalized utterances.

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use voxbridge_core::{AsrEvent, ChatConfig, ChatError};

/// One parsed line of the server-sent-event response body.
#[derive(Debug, PartialEq)]
enum SseLine {
    Delta(String),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> SseLine {
    let Some(data) = line.strip_prefix("data: ") else {
        return SseLine::Skip;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseLine::Done;
    }
    // Malformed JSON is skipped, the stream keeps going.
    let Ok(value) = serde_json::from_str::<serde_json::Value>(data) else {
        return SseLine::Skip;
    };
    let content = value
        .pointer("/choices/0/delta/content")
        .and_then(|c| c.as_str())
        .unwrap_or("");
    if content.is_empty() {
        SseLine::Skip
    } else {
        SseLine::Delta(content.to_string())
    }
}

/// Splits a streamed response body into parsed SSE lines, carrying an
/// unterminated tail across chunk boundaries.
struct SseLineReader {
    pending: String,
}

impl SseLineReader {
    fn new() -> Self {
        Self {
            pending: String::new(),
        }
    }

    fn push(&mut self, chunk: &str) -> Vec<SseLine> {
        self.pending.push_str(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=pos).collect();
            lines.push(parse_sse_line(line.trim()));
        }
        lines
    }

    /// The body's last line may arrive without a trailing newline.
    fn finish(self) -> SseLine {
        parse_sse_line(self.pending.trim())
    }
}

/// Streams completion deltas for one utterance to the client event
/// channel. Shared across a connection's dispatch tasks; each dispatch
/// runs as its own task so audio ingestion never blocks on the API.
pub struct ChatDispatcher {
    client: reqwest::Client,
    config: ChatConfig,
}

impl ChatDispatcher {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Never propagates an error: every failure mode ends in a single
    /// `ai_response_stream_end` event carrying an error description, and
    /// a closed client channel just stops the forwarding.
    pub async fn dispatch(&self, text: &str, events: &mpsc::Sender<AsrEvent>) {
        let Some(api_key) = self.config.api_key.clone() else {
            warn!("chat api key not configured, skipping completion call");
            let _ = events
                .send(AsrEvent::stream_end_error(
                    ChatError::MissingCredential.to_string(),
                ))
                .await;
            return;
        };

        if let Err(e) = self.stream_completion(&api_key, text, events).await {
            error!(error = %e, "chat completion stream failed");
            let _ = events.send(AsrEvent::stream_end_error(e.to_string())).await;
        }
    }

    async fn stream_completion(
        &self,
        api_key: &str,
        text: &str,
        events: &mpsc::Sender<AsrEvent>,
    ) -> Result<(), ChatError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": text}],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "stream": true,
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status(status.as_u16()));
        }

        if events
            .send(AsrEvent::AiResponseStreamStart {
                user_input: text.to_string(),
            })
            .await
            .is_err()
        {
            return Ok(());
        }

        let mut accumulated = String::new();
        let mut reader = SseLineReader::new();
        let mut stream = response.bytes_stream();
        let mut done = false;

        'body: while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_transport)?;
            for line in reader.push(&String::from_utf8_lossy(&chunk)) {
                match line {
                    SseLine::Done => {
                        done = true;
                        break 'body;
                    }
                    SseLine::Delta(content) => {
                        accumulated.push_str(&content);
                        let event = AsrEvent::AiResponseStream {
                            chunk: content,
                            accumulated: accumulated.clone(),
                        };
                        if events.send(event).await.is_err() {
                            // client gone, normal teardown
                            return Ok(());
                        }
                    }
                    SseLine::Skip => {}
                }
            }
        }

        // a body ending without [DONE] may leave one unterminated line
        if !done {
            if let SseLine::Delta(content) = reader.finish() {
                accumulated.push_str(&content);
                let event = AsrEvent::AiResponseStream {
                    chunk: content,
                    accumulated: accumulated.clone(),
                };
                if events.send(event).await.is_err() {
                    return Ok(());
                }
            }
        }

        info!(chars = accumulated.chars().count(), "chat completion stream finished");
        let _ = events.send(AsrEvent::stream_end_ok(accumulated)).await;
        Ok(())
    }
}

fn map_transport(e: reqwest::Error) -> ChatError {
    if e.is_timeout() {
        ChatError::Timeout
    } else {
        ChatError::Transport(e.to_string())
    }
}
