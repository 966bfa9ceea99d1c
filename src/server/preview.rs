use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::render::VoiceSelection;

use super::AppState;
use super::error::ApiError;

pub const DEFAULT_PREVIEW_TEXT: &str = "안녕하세요. 테스트입니다.";

#[derive(Debug, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewRequest {
    pub voice_engine: String,
    pub edge_voice: Option<String>,
    pub text: String,
}

impl Default for PreviewRequest {
    fn default() -> Self {
        Self {
            voice_engine: "gtts".to_string(),
            edge_voice: None,
            text: DEFAULT_PREVIEW_TEXT.to_string(),
        }
    }
}

/// `POST /preview-voice`: synthesize a short text and return it as `audio/mpeg`.
pub async fn preview_voice(
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> Result<Response, ApiError> {
    let voice = VoiceSelection {
        engine: req.voice_engine,
        edge_voice: req.edge_voice,
    };
    let audio = state.pipeline.preview_voice(&voice, &req.text).await?;
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response())
}
