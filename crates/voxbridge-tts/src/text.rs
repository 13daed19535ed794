//! Text cleanup before synthesis: strips characters that would be read
//! aloud, removes emoji, and derives an emotion hint from them.

use regex::Regex;
use std::sync::OnceLock;

/// Emotion hint carried on the audio events, derived from emoji in the
/// reply text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emotion {
    Happy,
    Sad,
    Thinking,
    Cunning,
    Normal,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Thinking => "thinking",
            Emotion::Cunning => "cunning",
            Emotion::Normal => "normal",
        }
    }
}

/// Emoji to emotion, checked in table order; the first emoji present in
/// the text decides. A few neutral faces land on `Normal` even though
/// they sit between the expressive ones.
const EMOJI_EMOTIONS: &[(&str, Emotion)] = &[
    ("😀", Emotion::Happy),
    ("😃", Emotion::Happy),
    ("😄", Emotion::Happy),
    ("😁", Emotion::Happy),
    ("😆", Emotion::Happy),
    ("😊", Emotion::Happy),
    ("😍", Emotion::Happy),
    ("🥰", Emotion::Happy),
    ("😘", Emotion::Happy),
    ("😗", Emotion::Happy),
    ("😙", Emotion::Happy),
    ("😚", Emotion::Happy),
    ("🙂", Emotion::Normal),
    ("🤗", Emotion::Happy),
    ("🤩", Emotion::Happy),
    ("😎", Emotion::Happy),
    ("🥳", Emotion::Happy),
    ("😋", Emotion::Happy),
    ("😛", Emotion::Happy),
    ("😜", Emotion::Happy),
    ("🤪", Emotion::Happy),
    ("😝", Emotion::Happy),
    ("🤑", Emotion::Happy),
    ("😢", Emotion::Sad),
    ("😭", Emotion::Sad),
    ("😤", Emotion::Sad),
    ("😠", Emotion::Sad),
    ("😡", Emotion::Sad),
    ("🤬", Emotion::Sad),
    ("😞", Emotion::Sad),
    ("😟", Emotion::Sad),
    ("😕", Emotion::Sad),
    ("🙁", Emotion::Sad),
    ("☹️", Emotion::Sad),
    ("😣", Emotion::Sad),
    ("😖", Emotion::Sad),
    ("😫", Emotion::Sad),
    ("😩", Emotion::Sad),
    ("🥺", Emotion::Sad),
    ("😦", Emotion::Sad),
    ("😧", Emotion::Sad),
    ("😨", Emotion::Sad),
    ("😰", Emotion::Sad),
    ("😥", Emotion::Sad),
    ("😓", Emotion::Sad),
    ("🤕", Emotion::Sad),
    ("🤒", Emotion::Sad),
    ("🤔", Emotion::Thinking),
    ("🧐", Emotion::Thinking),
    ("🤓", Emotion::Thinking),
    ("🤨", Emotion::Thinking),
    ("😐", Emotion::Normal),
    ("😑", Emotion::Normal),
    ("😶", Emotion::Normal),
    ("😏", Emotion::Cunning),
    ("😒", Emotion::Cunning),
    ("🙄", Emotion::Cunning),
    ("😬", Emotion::Cunning),
    ("🤥", Emotion::Cunning),
    ("😈", Emotion::Cunning),
    ("👿", Emotion::Cunning),
    ("💀", Emotion::Cunning),
];

fn special_chars_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[*#@$%^&_+=\[\]{}|\\:";'<>?./`~]"#).unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

// Pictographic blocks only; CJK ranges must stay untouched.
fn emoji_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"[\x{1F600}-\x{1F64F}]",
            r"|[\x{1F300}-\x{1F5FF}]",
            r"|[\x{1F680}-\x{1F6FF}]",
            r"|[\x{1F1E0}-\x{1F1FF}]",
            r"|[\x{2702}-\x{27B0}]",
            r"|[\x{1F900}-\x{1F9FF}]",
            r"|[\x{1FA00}-\x{1FA6F}]",
            r"|[\x{1FA70}-\x{1FAFF}]",
            r"|[\x{2600}-\x{26FF}]",
            r"|[\x{2700}-\x{27BF}]",
            r"|[\x{1F018}-\x{1F270}]",
        ))
        .unwrap()
    })
}

pub fn extract_emotion(text: &str) -> Emotion {
    for (emoji, emotion) in EMOJI_EMOTIONS {
        if text.contains(emoji) {
            return *emotion;
        }
    }
    Emotion::Normal
}

pub fn remove_emojis(text: &str) -> String {
    let stripped = emoji_re().replace_all(text, "");
    whitespace_re().replace_all(&stripped, " ").trim().to_string()
}

/// Drop characters that synthesis would read out loud. Sentence
/// punctuation and parentheses survive.
pub fn clean_text(text: &str) -> String {
    let stripped = special_chars_re().replace_all(text, "");
    whitespace_re().replace_all(&stripped, " ").trim().to_string()
}

/// Full pre-synthesis pass: emotion is taken before the emoji are
/// stripped away.
pub fn process_text(text: &str) -> (String, Emotion) {
    let emotion = extract_emotion(text);
    let without_emojis = remove_emojis(text);
    (clean_text(&without_emojis), emotion)
}
