//! WebSocket front-end wiring the recognition and synthesis pipelines
//! to client connections.

pub mod asr_ws;
pub mod context;
pub mod tts_ws;

use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub use context::EngineContext;

pub fn router(ctx: Arc<EngineContext>) -> Router {
    Router::new()
        .route("/asr", get(asr_ws::ws_handler))
        .route("/tts", get(tts_ws::ws_handler))
        .with_state(ctx)
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "ok"})) }),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxbridge_core::{AppConfig, TtsConfig};

    #[test]
    fn test_router_builds_with_null_backend() {
        let config = AppConfig {
            tts: TtsConfig {
                backend: "null".to_string(),
                ..TtsConfig::default()
            },
            ..AppConfig::default()
        };
        let ctx = Arc::new(EngineContext::from_config(config).unwrap());
        let _router = router(ctx);
    }
}
