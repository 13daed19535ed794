use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("decoder initialization failed: {0}")]
    InitializationFailed(String),

    #[error("decoding failed: {0}")]
    DecodeFailed(String),

    #[error("decoder engine not found: {0}")]
    EngineNotFound(String),
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat credential not configured")]
    MissingCredential,

    #[error("chat API returned status {0}")]
    Status(u16),

    #[error("chat API request timed out")]
    Timeout,

    #[error("chat API transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("synthesis backend not found: {0}")]
    BackendNotFound(String),

    #[error("synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("audio transcoder unavailable: {0}")]
    TranscoderUnavailable(String),

    #[error("audio transcode failed: {0}")]
    TranscodeFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::EngineNotFound("vosk".to_string());
        assert_eq!(err.to_string(), "decoder engine not found: vosk");
    }

    #[test]
    fn test_chat_error_display() {
        assert_eq!(
            ChatError::Status(429).to_string(),
            "chat API returned status 429"
        );
        assert_eq!(
            ChatError::MissingCredential.to_string(),
            "chat credential not configured"
        );
    }

    #[test]
    fn test_synthesis_error_display() {
        let err = SynthesisError::TranscoderUnavailable("ffmpeg not found".to_string());
        assert!(err.to_string().contains("ffmpeg not found"));
    }

    #[test]
    fn test_config_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ConfigError::from(io);
        assert!(err.to_string().contains("failed to read config file"));
    }
}
