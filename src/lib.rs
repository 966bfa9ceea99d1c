//! Shortreel renders vertical short-form videos: captioned frames over a background image,
//! optional per-segment overlay images, and a synthesized narration track.
//!
//! - Build a [`RenderRequest`] (from a multipart form, a JSON manifest, or by hand)
//! - Run it through a [`RenderPipeline`] into an MP4 or any [`FrameSink`]
//! - Or serve both operations over HTTP with [`server::router`]
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod layout;

pub mod compose;
pub mod config;
pub mod encode;
pub mod narration;
pub mod render;
pub mod server;
pub mod timeline;

pub use crate::assets::color::ColorSpec;
pub use crate::assets::decode::{BackgroundFit, PreparedImage, prepare_backdrop, prepare_overlay};
pub use crate::assets::font::{FontBook, FontFace, FontOrigin};
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Rgba8};
pub use crate::foundation::error::{ShortsError, ShortsResult};
pub use crate::layout::{PlateRect, TextBox, place};

pub use crate::compose::frame::{ComposeSettings, FrameComposer, FrameLayers, FrameRGBA, TextBlock};
pub use crate::compose::scene::{Scene, SegmentVisual};
pub use crate::config::ServiceConfig;
pub use crate::encode::{FfmpegSink, FfmpegSinkOpts, FrameSink, InMemorySink, SinkConfig};
pub use crate::narration::{
    NarrationResult, Synthesizer, SynthesizerRegistry, VoiceParams, narration_script,
};
pub use crate::render::{
    CancelFlag, GlobalLabels, PipelineSettings, RenderManifest, RenderPipeline, RenderRequest,
    RenderSummary, RenderedVideo, Segment, SegmentTitle, TextStyle, VoiceSelection,
};
pub use crate::timeline::{SegmentWindow, Timeline, TimingPolicy, VisualState};
