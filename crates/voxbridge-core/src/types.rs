use serde::{Deserialize, Serialize};
use std::time::Instant;

/// A transcription candidate produced by one decoder for one audio chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub text: String,
    /// Decoder confidence in [0, 1]; 0 when the decoder reports none.
    pub confidence: f32,
    pub is_final: bool,
}

impl Hypothesis {
    pub fn final_text(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
            is_final: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A finalized sentence handed to the chat dispatcher.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub text: String,
    pub origin: Instant,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Instant::now(),
        }
    }
}

/// One entry of the synthesis voice catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceInfo {
    pub name: String,
    pub short_name: String,
    pub locale: String,
    pub gender: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hypothesis_final_text() {
        let hyp = Hypothesis::final_text("你好", 0.9);
        assert_eq!(hyp.text, "你好");
        assert_eq!(hyp.confidence, 0.9);
        assert!(hyp.is_final);
    }

    #[test]
    fn test_hypothesis_is_empty_on_whitespace() {
        let hyp = Hypothesis::final_text("   ", 0.5);
        assert!(hyp.is_empty());
        let hyp = Hypothesis::final_text("hi", 0.5);
        assert!(!hyp.is_empty());
    }

    #[test]
    fn test_utterance_carries_text() {
        let utt = Utterance::new("打开文件。");
        assert_eq!(utt.text, "打开文件。");
    }

    #[test]
    fn test_voice_info_roundtrip() {
        let voice = VoiceInfo {
            name: "Microsoft Xiaoxiao Online".to_string(),
            short_name: "zh-CN-XiaoxiaoNeural".to_string(),
            locale: "zh-CN".to_string(),
            gender: "Female".to_string(),
        };
        let json = serde_json::to_string(&voice).unwrap();
        let back: VoiceInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, voice);
    }
}
