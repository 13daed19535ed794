use crate::error::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub asr: AsrConfig,

    /// Absent section means no chat back-end: completed utterances are
    /// reported as `sentence_complete` instead of being dispatched.
    #[serde(default)]
    pub chat: Option<ChatConfig>,

    #[serde(default)]
    pub tts: TtsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AsrConfig {
    #[serde(default = "default_engine")]
    pub engine: String,

    #[serde(default = "default_asr_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_primary_language")]
    pub primary_language: String,

    /// When set, a second decoder runs concurrently and finals are merged.
    #[serde(default)]
    pub secondary_language: Option<String>,

    #[serde(default = "default_min_sentence_length")]
    pub min_sentence_length: usize,

    /// Characters that end a sentence, given as one string.
    #[serde(default = "default_sentence_terminators")]
    pub sentence_terminators: String,

    #[serde(default = "default_silence_timeout_ms")]
    pub silence_timeout_ms: u64,

    #[serde(default = "default_silence_check_interval_ms")]
    pub silence_check_interval_ms: u64,
}

impl AsrConfig {
    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms)
    }

    pub fn silence_check_interval(&self) -> Duration {
        Duration::from_millis(self.silence_check_interval_ms)
    }
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            sample_rate: default_asr_sample_rate(),
            primary_language: default_primary_language(),
            secondary_language: None,
            min_sentence_length: default_min_sentence_length(),
            sentence_terminators: default_sentence_terminators(),
            silence_timeout_ms: default_silence_timeout_ms(),
            silence_check_interval_ms: default_silence_check_interval_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_chat_api_url")]
    pub api_url: String,

    /// Usually supplied via `${VOXBRIDGE_CHAT_TOKEN}` interpolation.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_chat_model")]
    pub model: String,

    #[serde(default = "default_chat_temperature")]
    pub temperature: f32,

    #[serde(default = "default_chat_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_chat_timeout_secs")]
    pub timeout_secs: u64,
}

impl ChatConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: default_chat_api_url(),
            api_key: None,
            model: default_chat_model(),
            temperature: default_chat_temperature(),
            max_tokens: default_chat_max_tokens(),
            timeout_secs: default_chat_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TtsConfig {
    #[serde(default = "default_tts_backend")]
    pub backend: String,

    /// Streaming synthesis service endpoint (http backend only).
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Voice catalog entries are filtered to this locale prefix.
    #[serde(default = "default_locale_prefix")]
    pub locale_prefix: String,

    #[serde(default = "default_buffer_threshold")]
    pub buffer_threshold: usize,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            backend: default_tts_backend(),
            endpoint: None,
            default_voice: default_voice(),
            locale_prefix: default_locale_prefix(),
            buffer_threshold: default_buffer_threshold(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8765
}

fn default_engine() -> String {
    "null".to_string()
}

fn default_asr_sample_rate() -> u32 {
    16_000
}

fn default_primary_language() -> String {
    "zh".to_string()
}

fn default_min_sentence_length() -> usize {
    2
}

fn default_sentence_terminators() -> String {
    "。！？.!?".to_string()
}

fn default_silence_timeout_ms() -> u64 {
    2_000
}

fn default_silence_check_interval_ms() -> u64 {
    500
}

fn default_chat_api_url() -> String {
    "https://api.deepseek.com/v1/chat/completions".to_string()
}

fn default_chat_model() -> String {
    "deepseek-chat".to_string()
}

fn default_chat_temperature() -> f32 {
    0.7
}

fn default_chat_max_tokens() -> u32 {
    2_000
}

fn default_chat_timeout_secs() -> u64 {
    60
}

fn default_tts_backend() -> String {
    "http".to_string()
}

fn default_voice() -> String {
    "zh-CN-XiaoxiaoNeural".to_string()
}

fn default_locale_prefix() -> String {
    "zh-".to_string()
}

fn default_buffer_threshold() -> usize {
    8_192
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();
    let mut result = input.to_string();
    let mut errors = Vec::new();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(val) => {
                result = result.replace(&cap[0], &val);
            }
            Err(_) => {
                errors.push(var_name.to_string());
            }
        }
    }

    if let Some(first_missing) = errors.into_iter().next() {
        return Err(ConfigError::EnvVarNotFound(first_missing));
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let interpolated = interpolate_env_vars(&content)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string (for testing).
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.asr.min_sentence_length == 0 {
            return Err(ConfigError::InvalidValue {
                key: "asr.min_sentence_length".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.asr.sentence_terminators.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "asr.sentence_terminators".to_string(),
                message: "must name at least one character".to_string(),
            });
        }
        if self.tts.buffer_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                key: "tts.buffer_threshold".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.tts.backend == "http" && self.tts.endpoint.is_none() {
            tracing::warn!("tts backend 'http' configured without an endpoint");
        }
        Ok(())
    }
}
