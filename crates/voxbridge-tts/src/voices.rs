//! Voice catalog helpers.

use tracing::info;
use voxbridge_core::VoiceInfo;

/// Keep only voices whose locale matches the configured prefix.
pub fn filter_by_locale<'a>(catalog: &'a [VoiceInfo], prefix: &str) -> Vec<&'a VoiceInfo> {
    catalog.iter().filter(|v| v.locale.starts_with(prefix)).collect()
}

/// Placeholder entry returned when the catalog cannot be fetched, so
/// `list_voices` still answers with something usable.
pub fn fallback_voice(short_name: &str) -> VoiceInfo {
    VoiceInfo {
        name: "默认音色".to_string(),
        short_name: short_name.to_string(),
        locale: "zh-CN".to_string(),
        gender: "Unknown".to_string(),
    }
}

/// Map a requested voice name onto the catalog: substring match against
/// short name or display name, falling back to the catalog's first entry
/// and finally to the request itself.
pub fn resolve_voice(requested: &str, catalog: &[VoiceInfo]) -> String {
    for voice in catalog {
        if voice.short_name.contains(requested) || voice.name.contains(requested) {
            return voice.short_name.clone();
        }
    }
    if let Some(first) = catalog.first() {
        info!(requested, fallback = %first.short_name, "requested voice not in catalog");
        return first.short_name.clone();
    }
    requested.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<VoiceInfo> {
        vec![
            VoiceInfo {
                name: "Microsoft Xiaoxiao Online (Natural) - Chinese (Mainland)".to_string(),
                short_name: "zh-CN-XiaoxiaoNeural".to_string(),
                locale: "zh-CN".to_string(),
                gender: "Female".to_string(),
            },
            VoiceInfo {
                name: "Microsoft Yunxi Online (Natural) - Chinese (Mainland)".to_string(),
                short_name: "zh-CN-YunxiNeural".to_string(),
                locale: "zh-CN".to_string(),
                gender: "Male".to_string(),
            },
            VoiceInfo {
                name: "Microsoft Aria Online (Natural) - English (United States)".to_string(),
                short_name: "en-US-AriaNeural".to_string(),
                locale: "en-US".to_string(),
                gender: "Female".to_string(),
            },
        ]
    }

    #[test]
    fn test_resolve_exact_short_name() {
        assert_eq!(
            resolve_voice("zh-CN-YunxiNeural", &catalog()),
            "zh-CN-YunxiNeural"
        );
    }

    #[test]
    fn test_resolve_substring_of_name() {
        assert_eq!(resolve_voice("Aria", &catalog()), "en-US-AriaNeural");
    }

    #[test]
    fn test_resolve_unknown_falls_back_to_first() {
        assert_eq!(resolve_voice("nonexistent", &catalog()), "zh-CN-XiaoxiaoNeural");
    }

    #[test]
    fn test_resolve_with_empty_catalog_keeps_request() {
        assert_eq!(resolve_voice("any-voice", &[]), "any-voice");
    }

    #[test]
    fn test_filter_by_locale() {
        let catalog = catalog();
        let zh = filter_by_locale(&catalog, "zh-");
        assert_eq!(zh.len(), 2);
        assert!(zh.iter().all(|v| v.locale.starts_with("zh-")));
    }

    #[test]
    fn test_fallback_voice() {
        let voice = fallback_voice("zh-CN-XiaoxiaoNeural");
        assert_eq!(voice.short_name, "zh-CN-XiaoxiaoNeural");
        assert_eq!(voice.gender, "Unknown");
    }
}
