use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::assets::decode::{BackgroundFit, prepare_backdrop, prepare_overlay};
use crate::assets::font::FontBook;
use crate::compose::frame::{ComposeSettings, FrameComposer, FrameRGBA, image_paint};
use crate::compose::scene::{Scene, SegmentVisual};
use crate::compose::{FrameCache, compose_states};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, Rgba8};
use crate::foundation::error::{ShortsError, ShortsResult};
use crate::narration::{NarrationResult, Synthesizer, SynthesizerRegistry, VoiceParams, narrate};
use crate::render::request::{RenderRequest, VoiceSelection};
use crate::render::workdir::{CancelFlag, WorkDir};
use crate::timeline::{Timeline, TimingPolicy, VisualState, explicit_states};

/// File name of the rendered video, both on disk and as the download name.
pub const OUTPUT_FILE: &str = "shorts.mp4";

/// Per-deployment render parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineSettings {
    pub compose: ComposeSettings,
    pub fps: Fps,
    pub background_fit: BackgroundFit,
    /// Fill behind a `contain` background.
    pub fill_color: Rgba8,
    /// Overlay thumbnails fit inside `overlay_max x overlay_max`.
    pub overlay_max: u32,
    /// Upper bound on the rendered video length.
    pub max_video_secs: f64,
    pub language: String,
    pub default_voice: String,
    pub ffmpeg_bin: String,
}

/// Counters describing one finished render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSummary {
    pub narration_secs: f64,
    pub duration_secs: f64,
    pub frame_count: u64,
    pub distinct_states: usize,
}

/// A complete MP4 plus what went into it.
#[derive(Clone, Debug)]
pub struct RenderedVideo {
    pub bytes: Vec<u8>,
    pub summary: RenderSummary,
}

/// Validates, narrates, schedules, composes and encodes one request at a time.
///
/// Holds no per-request state; one instance serves concurrent requests.
#[derive(Clone, Debug)]
pub struct RenderPipeline {
    settings: PipelineSettings,
    fonts: Arc<FontBook>,
    registry: SynthesizerRegistry,
}

impl RenderPipeline {
    pub fn new(settings: PipelineSettings, fonts: Arc<FontBook>, registry: SynthesizerRegistry) -> Self {
        Self {
            settings,
            fonts,
            registry,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn registry(&self) -> &SynthesizerRegistry {
        &self.registry
    }

    fn voice_params(&self, voice: &VoiceSelection) -> VoiceParams {
        voice.params(&self.settings.language, &self.settings.default_voice)
    }

    /// Decode the background and overlays and turn styles into text blocks.
    pub fn build_scene(&self, req: &RenderRequest) -> ShortsResult<Scene> {
        let backdrop = prepare_backdrop(
            &req.background,
            self.settings.compose.canvas,
            self.settings.background_fit,
            self.settings.fill_color,
        )?;
        let labels = match &req.labels {
            Some(labels) => labels.blocks()?,
            None => Vec::new(),
        };

        let overlay_max = self.settings.overlay_max;
        let segments = req
            .segments
            .par_iter()
            .map(|seg| {
                Ok(SegmentVisual {
                    overlay: seg
                        .overlay
                        .as_deref()
                        .map(|bytes| prepare_overlay(bytes, overlay_max))
                        .transpose()?,
                    caption: seg.style.block(&seg.text)?,
                    title: seg
                        .title
                        .as_ref()
                        .map(|t| t.style.block(&t.text))
                        .transpose()?,
                })
            })
            .collect::<ShortsResult<Vec<_>>>()?;

        Ok(Scene {
            backdrop,
            labels,
            segments,
        })
    }

    /// Compose the frame showing only segment `segment`; no narration involved.
    pub fn compose_segment_frame(
        &self,
        req: &RenderRequest,
        segment: usize,
    ) -> ShortsResult<FrameRGBA> {
        req.validate()?;
        if segment >= req.segments.len() {
            return Err(ShortsError::validation(format!(
                "segment {segment} out of range (request has {})",
                req.segments.len()
            )));
        }
        self.settings.compose.validate()?;
        let scene = self.build_scene(req)?;
        let mut composer = FrameComposer::new(
            self.settings.compose,
            image_paint(&scene.backdrop)?,
            &self.fonts,
        );
        composer.compose(&scene.layers(&VisualState::single(segment)))
    }

    /// Synthesize `text` alone and return the audio bytes.
    pub async fn preview_voice(&self, voice: &VoiceSelection, text: &str) -> ShortsResult<Vec<u8>> {
        let engine = self.registry.resolve(&voice.engine)?;
        let params = self.voice_params(voice);
        let workdir = WorkDir::new()?;
        let narration = narrate(engine.as_ref(), text, &params, workdir.path()).await?;
        let bytes = tokio::fs::read(&narration.audio_path)
            .await
            .map_err(|e| ShortsError::synthesis(format!("failed to read synthesized audio: {e}")))?;
        workdir.close()?;
        Ok(bytes)
    }

    /// Render to MP4 with the system `ffmpeg` and return the file contents.
    #[tracing::instrument(skip_all, fields(segments = req.segments.len(), policy = req.timing.name()))]
    pub async fn render(&self, req: RenderRequest, cancel: CancelFlag) -> ShortsResult<RenderedVideo> {
        self.check_request(&req)?;
        let workdir = WorkDir::new()?;
        let out = workdir.join(OUTPUT_FILE);
        let sink = FfmpegSink::new(FfmpegSinkOpts::new(self.settings.ffmpeg_bin.clone(), &out));

        let (summary, _sink) = self
            .render_with_sink(req, sink, workdir.path(), cancel)
            .await?;

        let bytes = tokio::fs::read(&out)
            .await
            .map_err(|e| ShortsError::render(format!("failed to read rendered video: {e}")))?;
        workdir.close()?;
        Ok(RenderedVideo { bytes, summary })
    }

    /// Run the whole pipeline into `sink`, keeping intermediate files under `dir`.
    ///
    /// The sink is handed back after `end` so callers can inspect what it collected.
    pub async fn render_with_sink<S>(
        &self,
        req: RenderRequest,
        sink: S,
        dir: &Path,
        cancel: CancelFlag,
    ) -> ShortsResult<(RenderSummary, S)>
    where
        S: FrameSink + 'static,
    {
        let started = Instant::now();
        let engine = self.check_request(&req)?;
        let params = self.voice_params(&req.voice);
        let script = req.script();
        tracing::info!(
            segments = req.segments.len(),
            policy = req.timing.name(),
            engine = engine.name(),
            "render started"
        );

        let req = Arc::new(req);
        let scene = {
            let this = self.clone();
            let req = Arc::clone(&req);
            Arc::new(blocking(move || this.build_scene(&req)).await?)
        };

        let fps = self.settings.fps;
        let (narration, mut cache) = match &req.timing {
            TimingPolicy::Explicit(windows) => {
                let windows = windows.clone();
                let states = blocking(move || Ok(explicit_states(&windows, fps)));
                let precompose = async {
                    let states = states.await?;
                    self.compose_task(Arc::clone(&scene), states).await
                };
                let synth = narrate(engine.as_ref(), &script, &params, dir);
                let (narration, cache) = tokio::join!(synth, precompose);
                (narration?, cache?)
            }
            TimingPolicy::Uniform => {
                let narration = narrate(engine.as_ref(), &script, &params, dir).await?;
                (narration, FrameCache::new())
            }
        };
        cancel.check()?;
        if narration.duration_secs > self.settings.max_video_secs {
            return Err(ShortsError::render(format!(
                "narration lasts {:.3}s, longer than the {}s limit",
                narration.duration_secs, self.settings.max_video_secs
            )));
        }

        let timeline = {
            let req = Arc::clone(&req);
            let narration_secs = narration.duration_secs;
            blocking(move || {
                Timeline::schedule(&req.timing, req.segments.len(), narration_secs, fps)
            })
            .await?
        };

        let missing: Vec<VisualState> = timeline
            .states
            .iter()
            .filter(|s| !cache.contains_key(*s))
            .cloned()
            .collect();
        if !missing.is_empty() {
            cache.extend(self.compose_task(Arc::clone(&scene), missing).await?);
        }
        cancel.check()?;

        let summary = RenderSummary {
            narration_secs: narration.duration_secs,
            duration_secs: timeline.duration_secs,
            frame_count: timeline.total_frames,
            distinct_states: timeline.states.len(),
        };
        let sink = self.encode_task(sink, timeline, cache, &narration, cancel).await?;

        tracing::info!(
            narration_secs = summary.narration_secs,
            duration_secs = summary.duration_secs,
            frames = summary.frame_count,
            states = summary.distinct_states,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "render finished"
        );
        Ok((summary, sink))
    }

    /// Everything that can reject a request before any work starts.
    fn check_request(&self, req: &RenderRequest) -> ShortsResult<Arc<dyn Synthesizer>> {
        req.validate()?;
        req.timing.validate_length(self.settings.max_video_secs)?;
        self.settings.compose.validate()?;
        self.registry.resolve(&req.voice.engine)
    }

    async fn compose_task(
        &self,
        scene: Arc<Scene>,
        states: Vec<VisualState>,
    ) -> ShortsResult<FrameCache> {
        let settings = self.settings.compose;
        let fonts = Arc::clone(&self.fonts);
        blocking(move || compose_states(&scene, &states, settings, &fonts)).await
    }

    async fn encode_task<S>(
        &self,
        mut sink: S,
        timeline: Timeline,
        cache: FrameCache,
        narration: &NarrationResult,
        cancel: CancelFlag,
    ) -> ShortsResult<S>
    where
        S: FrameSink + 'static,
    {
        let cfg = SinkConfig {
            canvas: self.settings.compose.canvas,
            fps: timeline.fps,
            audio: Some(narration.audio_path.clone()),
        };
        blocking(move || {
            sink.begin(cfg)?;
            for (idx, state) in timeline.frames() {
                cancel.check()?;
                let frame = cache.get(state).ok_or_else(|| {
                    ShortsError::render(format!("no composed frame for state {:?}", state.active()))
                })?;
                sink.push_frame(idx, frame)?;
            }
            sink.end()?;
            Ok(sink)
        })
        .await
    }
}

/// Run CPU-bound or blocking work off the async executor.
async fn blocking<T, F>(f: F) -> ShortsResult<T>
where
    F: FnOnce() -> ShortsResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ShortsError::render(format!("worker task failed: {e}")))?
}
