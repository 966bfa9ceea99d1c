//! Service configuration: command-line flags, each also readable from a `SHORTREEL_*`
//! environment variable.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::assets::color::ColorSpec;
use crate::assets::decode::BackgroundFit;
use crate::compose::frame::ComposeSettings;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ShortsError, ShortsResult};
use crate::render::PipelineSettings;

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_FONT_PATH: &str = "fonts/나눔손글씨 사랑해 아들.ttf";
pub const DEFAULT_FPS: u32 = 24;
pub const DEFAULT_PLATE_PADDING: u32 = 10;
pub const DEFAULT_OVERLAY_MAX: u32 = 600;
pub const DEFAULT_LANGUAGE: &str = "ko";
pub const DEFAULT_EDGE_VOICE: &str = "ko-KR-SunHiNeural";
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;
pub const DEFAULT_MAX_VIDEO_SECS: f64 = 600.0;

#[derive(clap::Args, Clone, Debug, PartialEq)]
pub struct ServiceConfig {
    /// HTTP listen address.
    #[arg(long, env = "SHORTREEL_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Canvas width in pixels (even).
    #[arg(long, env = "SHORTREEL_WIDTH", default_value_t = Canvas::SHORTS.width)]
    pub width: u32,

    /// Canvas height in pixels (even).
    #[arg(long, env = "SHORTREEL_HEIGHT", default_value_t = Canvas::SHORTS.height)]
    pub height: u32,

    /// Output frame rate.
    #[arg(long, env = "SHORTREEL_FPS", default_value_t = DEFAULT_FPS)]
    pub fps: u32,

    /// Custom font file; the system sans-serif face is used when it cannot be loaded.
    #[arg(long, env = "SHORTREEL_FONT_PATH", default_value = DEFAULT_FONT_PATH)]
    pub font_path: PathBuf,

    /// `contain` (scale to fit over a solid fill) or `fill` (stretch to the canvas).
    #[arg(long, env = "SHORTREEL_BACKGROUND_FIT", default_value = "contain")]
    pub background_fit: BackgroundFit,

    /// Solid fill behind a `contain` background.
    #[arg(long, env = "SHORTREEL_FILL_COLOR", default_value = "black")]
    pub fill_color: ColorSpec,

    /// Plate padding per side in pixels.
    #[arg(long, env = "SHORTREEL_PLATE_PADDING", default_value_t = DEFAULT_PLATE_PADDING)]
    pub plate_padding: u32,

    /// Overlay images are shrunk to fit a square of this side.
    #[arg(long, env = "SHORTREEL_OVERLAY_MAX", default_value_t = DEFAULT_OVERLAY_MAX)]
    pub overlay_max: u32,

    /// Language of the Google engine.
    #[arg(long, env = "SHORTREEL_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    pub default_language: String,

    /// Edge voice used when a request names none.
    #[arg(long, env = "SHORTREEL_EDGE_VOICE", default_value = DEFAULT_EDGE_VOICE)]
    pub default_edge_voice: String,

    /// Hard limit for one `/generate` request, in seconds.
    #[arg(long, env = "SHORTREEL_RENDER_TIMEOUT_SECS", default_value_t = DEFAULT_RENDER_TIMEOUT_SECS)]
    pub render_timeout_secs: u64,

    /// Request body limit in bytes.
    #[arg(long, env = "SHORTREEL_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Longest video a request may ask for, in seconds.
    #[arg(long, env = "SHORTREEL_MAX_VIDEO_SECS", default_value_t = DEFAULT_MAX_VIDEO_SECS)]
    pub max_video_secs: f64,

    #[arg(long, env = "SHORTREEL_FFMPEG", default_value = "ffmpeg")]
    pub ffmpeg_bin: String,

    #[arg(long, env = "SHORTREEL_FFPROBE", default_value = "ffprobe")]
    pub ffprobe_bin: String,

    #[arg(long, env = "SHORTREEL_EDGE_TTS", default_value = "edge-tts")]
    pub edge_tts_bin: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            width: Canvas::SHORTS.width,
            height: Canvas::SHORTS.height,
            fps: DEFAULT_FPS,
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            background_fit: BackgroundFit::Contain,
            fill_color: ColorSpec::Solid(crate::foundation::core::Rgba8::BLACK),
            plate_padding: DEFAULT_PLATE_PADDING,
            overlay_max: DEFAULT_OVERLAY_MAX,
            default_language: DEFAULT_LANGUAGE.to_string(),
            default_edge_voice: DEFAULT_EDGE_VOICE.to_string(),
            render_timeout_secs: DEFAULT_RENDER_TIMEOUT_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_video_secs: DEFAULT_MAX_VIDEO_SECS,
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            edge_tts_bin: "edge-tts".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> ShortsResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ShortsError::validation("canvas width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(ShortsError::validation("canvas width/height must be even"));
        }
        if self.fps == 0 {
            return Err(ShortsError::validation("fps must be non-zero"));
        }
        if self.overlay_max == 0 {
            return Err(ShortsError::validation("overlay_max must be non-zero"));
        }
        if !self.max_video_secs.is_finite() || self.max_video_secs <= 0.0 {
            return Err(ShortsError::validation("max video duration must be finite and > 0"));
        }
        if self.fill_color.solid().is_none() {
            return Err(ShortsError::validation("fill color must not be transparent"));
        }
        self.compose_settings().validate()
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn compose_settings(&self) -> ComposeSettings {
        ComposeSettings {
            canvas: self.canvas(),
            plate_padding: self.plate_padding,
        }
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn pipeline_settings(&self) -> ShortsResult<PipelineSettings> {
        self.validate()?;
        Ok(PipelineSettings {
            compose: self.compose_settings(),
            fps: Fps::integer(self.fps)?,
            background_fit: self.background_fit,
            fill_color: self
                .fill_color
                .solid()
                .ok_or_else(|| ShortsError::validation("fill color must not be transparent"))?,
            overlay_max: self.overlay_max,
            max_video_secs: self.max_video_secs,
            language: self.default_language.clone(),
            default_voice: self.default_edge_voice.clone(),
            ffmpeg_bin: self.ffmpeg_bin.clone(),
        })
    }
}
