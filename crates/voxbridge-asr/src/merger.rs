//! Combines per-language hypotheses from the dual-decoder setup into one.
//!
//! The primary decoder runs the session's main language and the secondary
//! (when configured) a fallback language that tends to pick up loanwords
//! and short technical terms the primary model garbles.

use voxbridge_core::Hypothesis;

/// Lexical cues that bias the merge toward the secondary language even
/// when its confidence is lower.
const MARKER_WORDS: &[&str] = &[
    "curl", "get", "post", "http", "api", "json", "code", "file", "dir", "cd", "ls", "pwd",
];

/// Relative confidence margin below which two hypotheses are treated as
/// comparable rather than one clearly winning.
const CONFIDENCE_RATIO: f32 = 0.7;

/// Merge the most recent final hypotheses from the primary and secondary
/// decoders. Returns `None` when both are empty. Deterministic, no I/O.
pub fn merge(primary: Option<&Hypothesis>, secondary: Option<&Hypothesis>) -> Option<Hypothesis> {
    let p_text = primary.map(|h| h.text.trim()).unwrap_or("");
    let s_text = secondary.map(|h| h.text.trim()).unwrap_or("");
    let p_conf = primary.map(|h| h.confidence).unwrap_or(0.0);
    let s_conf = secondary.map(|h| h.confidence).unwrap_or(0.0);

    match (p_text.is_empty(), s_text.is_empty()) {
        (true, true) => None,
        (false, true) => Some(Hypothesis::final_text(p_text, p_conf)),
        (true, false) => Some(Hypothesis::final_text(s_text, s_conf)),
        (false, false) => {
            if contains_marker_word(s_text) && s_conf > p_conf * CONFIDENCE_RATIO {
                Some(Hypothesis::final_text(s_text, s_conf))
            } else if p_conf > s_conf * CONFIDENCE_RATIO {
                Some(Hypothesis::final_text(p_text, p_conf))
            } else if is_short_alphabetic(s_text) {
                Some(Hypothesis::final_text(
                    format!("{p_text} {s_text}"),
                    p_conf.max(s_conf),
                ))
            } else if s_conf > p_conf {
                Some(Hypothesis::final_text(s_text, s_conf))
            } else {
                Some(Hypothesis::final_text(p_text, p_conf))
            }
        }
    }
}

fn contains_marker_word(text: &str) -> bool {
    let lowered = text.to_lowercase();
    MARKER_WORDS.iter().any(|word| lowered.contains(word))
}

/// At most two whitespace-separated tokens, letters only. Fragments like
/// this are usually a loanword tail of the primary sentence, so they get
/// appended rather than replacing it.
fn is_short_alphabetic(text: &str) -> bool {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.len() <= 2 && tokens.iter().all(|t| t.chars().all(|c| c.is_alphabetic()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hyp(text: &str, confidence: f32) -> Hypothesis {
        Hypothesis::final_text(text, confidence)
    }

    #[test]
    fn test_merge_both_empty_is_none() {
        assert_eq!(merge(None, None), None);
        assert_eq!(merge(Some(&hyp("", 0.0)), Some(&hyp("  ", 0.0))), None);
    }

    #[test]
    fn test_merge_only_primary() {
        let merged = merge(Some(&hyp("你好", 0.9)), Some(&hyp("", 0.0))).unwrap();
        assert_eq!(merged.text, "你好");
        assert_eq!(merged.confidence, 0.9);
    }

    #[test]
    fn test_merge_only_secondary() {
        let merged = merge(None, Some(&hyp("hello", 0.6))).unwrap();
        assert_eq!(merged.text, "hello");
        assert_eq!(merged.confidence, 0.6);
    }

    #[test]
    fn test_merge_short_alphabetic_fragment_concatenates() {
        // "open" is not a marker word and 0.5 does not clear 0.9 * 0.7,
        // so the comparable-confidence branch concatenates.
        let merged = merge(Some(&hyp("打开", 0.5)), Some(&hyp("open", 0.9))).unwrap();
        assert_eq!(merged.text, "打开 open");
        assert_eq!(merged.confidence, 0.9);
    }

    #[test]
    fn test_merge_marker_word_favors_secondary() {
        let merged = merge(Some(&hyp("curl", 0.4)), Some(&hyp("curl", 0.6))).unwrap();
        assert_eq!(merged.text, "curl");
        assert_eq!(merged.confidence, 0.6);
    }

    #[test]
    fn test_merge_marker_word_needs_enough_confidence() {
        // 0.1 <= 0.9 * 0.7: marker rule does not fire, primary clearly wins.
        let merged = merge(Some(&hyp("你好", 0.9)), Some(&hyp("curl", 0.1))).unwrap();
        assert_eq!(merged.text, "你好");
    }

    #[test]
    fn test_merge_confident_primary_wins() {
        let merged = merge(Some(&hyp("今天天气不错", 0.9)), Some(&hyp("the weather is nice today", 0.3)))
            .unwrap();
        assert_eq!(merged.text, "今天天气不错");
    }

    #[test]
    fn test_merge_long_secondary_comparable_confidence_picks_higher() {
        // Five tokens, not a short fragment, and 0.5 does not clear
        // 0.8 * 0.7, so the higher-confidence side is returned whole.
        let merged = merge(Some(&hyp("你好", 0.5)), Some(&hyp("how are you doing today", 0.8)))
            .unwrap();
        assert_eq!(merged.text, "how are you doing today");
    }

    #[test]
    fn test_merge_tie_favors_primary() {
        let merged = merge(Some(&hyp("第一", 0.0)), Some(&hyp("one two three", 0.0))).unwrap();
        assert_eq!(merged.text, "第一");
    }

    #[test]
    fn test_merge_is_deterministic() {
        let p = hyp("打开", 0.5);
        let s = hyp("open", 0.9);
        let a = merge(Some(&p), Some(&s));
        let b = merge(Some(&p), Some(&s));
        assert_eq!(a, b);
    }

    #[test]
    fn test_is_short_alphabetic() {
        assert!(is_short_alphabetic("open"));
        assert!(is_short_alphabetic("open file"));
        assert!(!is_short_alphabetic("one two three"));
        assert!(!is_short_alphabetic("v2"));
    }
}
