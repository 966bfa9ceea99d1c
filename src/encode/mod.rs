//! Frame sinks: where the composed frame sequence goes.

pub mod ffmpeg;
pub mod sink;

pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_tool_on_path};
pub use sink::{FrameSink, InMemorySink, SinkConfig};
