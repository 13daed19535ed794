//! JSON wire protocol for the recognition and synthesis endpoints.
//!
//! Binary frames carry raw PCM in both directions (16-bit signed
//! little-endian, mono; 16 kHz inbound on `/asr`, 24 kHz outbound on
//! `/tts`); text frames carry the tagged JSON messages below.

use crate::types::VoiceInfo;
use serde::{Deserialize, Serialize};

/// Control messages accepted on the recognition endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AsrControl {
    Start,
    Stop,
}

/// Events emitted on the recognition endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AsrEvent {
    Ready,
    Partial {
        text: String,
    },
    Result {
        text: String,
    },
    Final {
        text: String,
    },
    SentenceComplete {
        text: String,
    },
    AiResponseStreamStart {
        user_input: String,
    },
    AiResponseStream {
        chunk: String,
        accumulated: String,
    },
    AiResponseStreamEnd {
        #[serde(skip_serializing_if = "Option::is_none")]
        full_text: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Error {
        message: String,
    },
}

impl AsrEvent {
    pub fn stream_end_ok(full_text: String) -> Self {
        Self::AiResponseStreamEnd {
            full_text: Some(full_text),
            error: None,
        }
    }

    pub fn stream_end_error(error: impl Into<String>) -> Self {
        Self::AiResponseStreamEnd {
            full_text: None,
            error: Some(error.into()),
        }
    }
}

/// Requests accepted on the synthesis endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TtsRequest {
    Synthesize {
        text: String,
        #[serde(default)]
        voice: Option<String>,
    },
    ListVoices,
    SetVoice {
        voice: String,
    },
}

/// Events emitted on the synthesis endpoint (binary PCM frames are
/// interleaved between `audio_start` and `audio_end`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TtsEvent {
    AudioStart {
        voice: String,
        emotion: String,
        format: String,
        sample_rate: u32,
        channels: u16,
        bits_per_sample: u16,
        streaming: bool,
    },
    AudioEnd {
        voice: String,
        emotion: String,
        total_size: usize,
    },
    VoicesList {
        voices: Vec<VoiceInfo>,
    },
    VoiceSet {
        voice: String,
    },
    Error {
        message: String,
    },
}

/// Fixed output format of the synthesis pipeline.
pub const TTS_SAMPLE_RATE: u32 = 24_000;
pub const TTS_CHANNELS: u16 = 1;
pub const TTS_BITS_PER_SAMPLE: u16 = 16;

impl TtsEvent {
    pub fn audio_start(voice: impl Into<String>, emotion: impl Into<String>) -> Self {
        Self::AudioStart {
            voice: voice.into(),
            emotion: emotion.into(),
            format: "pcm".to_string(),
            sample_rate: TTS_SAMPLE_RATE,
            channels: TTS_CHANNELS,
            bits_per_sample: TTS_BITS_PER_SAMPLE,
            streaming: true,
        }
    }

    pub fn audio_end(
        voice: impl Into<String>,
        emotion: impl Into<String>,
        total_size: usize,
    ) -> Self {
        Self::AudioEnd {
            voice: voice.into(),
            emotion: emotion.into(),
            total_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asr_control_parses_start_and_stop() {
        let start: AsrControl = serde_json::from_str(r#"{"type":"start"}"#).unwrap();
        assert_eq!(start, AsrControl::Start);
        let stop: AsrControl = serde_json::from_str(r#"{"type":"stop"}"#).unwrap();
        assert_eq!(stop, AsrControl::Stop);
    }

    #[test]
    fn test_asr_control_rejects_unknown_type() {
        let result = serde_json::from_str::<AsrControl>(r#"{"type":"pause"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_asr_event_ready_serialization() {
        let json = serde_json::to_string(&AsrEvent::Ready).unwrap();
        assert_eq!(json, r#"{"type":"ready"}"#);
    }

    #[test]
    fn test_asr_event_stream_tags() {
        let json = serde_json::to_string(&AsrEvent::AiResponseStreamStart {
            user_input: "hello".to_string(),
        })
        .unwrap();
        assert!(json.contains(r#""type":"ai_response_stream_start""#));

        let json = serde_json::to_string(&AsrEvent::AiResponseStream {
            chunk: "a".to_string(),
            accumulated: "a".to_string(),
        })
        .unwrap();
        assert!(json.contains(r#""type":"ai_response_stream""#));
    }

    #[test]
    fn test_stream_end_omits_absent_fields() {
        let json = serde_json::to_string(&AsrEvent::stream_end_ok("done".to_string())).unwrap();
        assert!(json.contains("full_text"));
        assert!(!json.contains("error"));

        let json = serde_json::to_string(&AsrEvent::stream_end_error("boom")).unwrap();
        assert!(json.contains("error"));
        assert!(!json.contains("full_text"));
    }

    #[test]
    fn test_tts_request_synthesize_optional_voice() {
        let req: TtsRequest =
            serde_json::from_str(r#"{"type":"synthesize","text":"你好"}"#).unwrap();
        match req {
            TtsRequest::Synthesize { text, voice } => {
                assert_eq!(text, "你好");
                assert!(voice.is_none());
            }
            _ => panic!("expected synthesize"),
        }
    }

    #[test]
    fn test_tts_request_list_voices() {
        let req: TtsRequest = serde_json::from_str(r#"{"type":"list_voices"}"#).unwrap();
        assert_eq!(req, TtsRequest::ListVoices);
    }

    #[test]
    fn test_audio_start_fixed_format() {
        let json =
            serde_json::to_string(&TtsEvent::audio_start("zh-CN-XiaoxiaoNeural", "normal"))
                .unwrap();
        assert!(json.contains(r#""format":"pcm""#));
        assert!(json.contains(r#""sample_rate":24000"#));
        assert!(json.contains(r#""channels":1"#));
        assert!(json.contains(r#""bits_per_sample":16"#));
        assert!(json.contains(r#""streaming":true"#));
    }

    #[test]
    fn test_audio_end_total_size() {
        let json = serde_json::to_string(&TtsEvent::audio_end("v", "happy", 4096)).unwrap();
        assert!(json.contains(r#""total_size":4096"#));
        assert!(json.contains(r#""emotion":"happy""#));
    }
}
