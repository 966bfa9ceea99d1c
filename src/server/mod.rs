//! HTTP surface: `POST /preview-voice` and `POST /generate`.

pub mod error;
pub mod generate;
pub mod preview;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::assets::font::FontBook;
use crate::config::ServiceConfig;
use crate::narration::SynthesizerRegistry;
use crate::render::RenderPipeline;

pub use error::ApiError;

/// Shared, read-only handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub pipeline: Arc<RenderPipeline>,
    pub render_timeout: Duration,
}

impl AppState {
    /// Pipeline with the stock engines and the configured font.
    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        let settings = config.pipeline_settings()?;
        let fonts = Arc::new(FontBook::load(Some(&config.font_path)));
        let registry = SynthesizerRegistry::standard(&config.ffprobe_bin, &config.edge_tts_bin)?;
        Ok(Self {
            pipeline: Arc::new(RenderPipeline::new(settings, fonts, registry)),
            render_timeout: config.render_timeout(),
        })
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/preview-voice", post(preview::preview_voice))
        .route("/generate", post(generate::generate))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let app = router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(addr = %config.bind, "listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
