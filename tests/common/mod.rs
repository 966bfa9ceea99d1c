#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use shortreel::{
    BackgroundFit, Canvas, ComposeSettings, FontBook, Fps, NarrationResult, PipelineSettings,
    RenderPipeline, Rgba8, ShortsResult, Synthesizer, SynthesizerRegistry, VoiceParams,
};

pub const W: u32 = 64;
pub const H: u32 = 112;

/// Deterministic engine: writes a fixed payload and reports a fixed duration.
pub struct StubSynth {
    pub secs: f64,
    pub calls: AtomicUsize,
}

impl StubSynth {
    pub fn new(secs: f64) -> Arc<Self> {
        Arc::new(Self {
            secs,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Synthesizer for StubSynth {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn synthesize(
        &self,
        text: &str,
        _voice: &VoiceParams,
        out: &Path,
    ) -> ShortsResult<NarrationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::fs::write(out, format!("ID3 stub audio: {text}")).unwrap();
        Ok(NarrationResult {
            audio_path: out.to_path_buf(),
            duration_secs: self.secs,
        })
    }
}

pub fn settings() -> PipelineSettings {
    PipelineSettings {
        compose: ComposeSettings {
            canvas: Canvas {
                width: W,
                height: H,
            },
            plate_padding: 10,
        },
        fps: Fps::integer(24).unwrap(),
        background_fit: BackgroundFit::Contain,
        fill_color: Rgba8::BLACK,
        overlay_max: 32,
        max_video_secs: 60.0,
        language: "ko".to_string(),
        default_voice: "ko-KR-SunHiNeural".to_string(),
        ffmpeg_bin: "ffmpeg".to_string(),
    }
}

pub fn pipeline_with(stub: Arc<StubSynth>) -> RenderPipeline {
    let mut registry = SynthesizerRegistry::new();
    registry.register(&["gtts", "google", "edge"], stub);
    RenderPipeline::new(settings(), Arc::new(FontBook::load(None)), registry)
}

/// Solid-color PNG bytes.
pub fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}
