//! Render Pipeline: validation, narration, scheduling, composition and encoding for one
//! request, with request-scoped temporary storage.

pub mod pipeline;
pub mod request;
pub mod workdir;

pub use pipeline::{
    OUTPUT_FILE, PipelineSettings, RenderPipeline, RenderSummary, RenderedVideo,
};
pub use request::{
    GlobalLabels, RenderManifest, RenderRequest, RequestForm, Segment, SegmentColumns,
    SegmentTitle, TextStyle, VoiceSelection,
};
pub use workdir::{CancelFlag, WorkDir};
