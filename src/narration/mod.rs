//! Narration Orchestrator: one script per request, one synthesized audio file, one duration.
//!
//! Engines implement [`Synthesizer`] and are looked up by key in a [`SynthesizerRegistry`].
//! Segment timing is never aligned to speech timing; the scheduler only reconciles total
//! durations.

pub mod edge;
pub mod google;
pub mod probe;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{ShortsError, ShortsResult};

pub use edge::EdgeTts;
pub use google::GoogleTts;

/// Separator placed between segment texts in the narration script.
pub const SCRIPT_SEPARATOR: &str = ". ";

/// File name of the synthesized narration inside a work directory.
pub const NARRATION_FILE: &str = "narration.mp3";

/// Voice parameters forwarded to whichever engine is selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceParams {
    /// Language code for single-language engines, e.g. `ko`.
    pub language: String,
    /// Voice identifier for engines that take one, e.g. `ko-KR-SunHiNeural`.
    pub voice: String,
}

/// Synthesized narration on disk.
#[derive(Clone, Debug, PartialEq)]
pub struct NarrationResult {
    pub audio_path: PathBuf,
    pub duration_secs: f64,
}

/// A speech synthesis backend: text in, audio file plus duration out.
#[async_trait::async_trait]
pub trait Synthesizer: Send + Sync {
    /// Stable engine name used in logs.
    fn name(&self) -> &'static str;

    /// Write `text` as audio to `out` and report its duration.
    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceParams,
        out: &Path,
    ) -> ShortsResult<NarrationResult>;
}

/// Engines addressable by selector key.
#[derive(Clone, Default)]
pub struct SynthesizerRegistry {
    engines: BTreeMap<String, Arc<dyn Synthesizer>>,
}

impl std::fmt::Debug for SynthesizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesizerRegistry")
            .field("keys", &self.engines.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SynthesizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two stock engines: `gtts`/`google` and `edge`.
    pub fn standard(ffprobe_bin: &str, edge_tts_bin: &str) -> ShortsResult<Self> {
        let google: Arc<dyn Synthesizer> = Arc::new(GoogleTts::new(ffprobe_bin)?);
        let edge: Arc<dyn Synthesizer> = Arc::new(EdgeTts::new(edge_tts_bin, ffprobe_bin));
        let mut reg = Self::new();
        reg.register(&["gtts", "google"], google);
        reg.register(&["edge"], edge);
        Ok(reg)
    }

    /// Register `engine` under every key in `keys`, replacing earlier entries.
    pub fn register(&mut self, keys: &[&str], engine: Arc<dyn Synthesizer>) {
        for key in keys {
            self.engines.insert(normalize_key(key), Arc::clone(&engine));
        }
    }

    /// Look up an engine; unknown keys are a validation error.
    pub fn resolve(&self, key: &str) -> ShortsResult<Arc<dyn Synthesizer>> {
        self.engines
            .get(&normalize_key(key))
            .cloned()
            .ok_or_else(|| ShortsError::validation(format!("unsupported voice engine '{key}'")))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

/// Join segment texts, in order, into one narration script.
pub fn narration_script<S: AsRef<str>>(texts: &[S]) -> String {
    texts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(SCRIPT_SEPARATOR)
}

/// Synthesize `script` into `dir` with `engine`.
///
/// Empty scripts and unusable durations are synthesis errors.
#[tracing::instrument(skip_all, fields(engine = engine.name(), chars = script.chars().count()))]
pub async fn narrate(
    engine: &dyn Synthesizer,
    script: &str,
    voice: &VoiceParams,
    dir: &Path,
) -> ShortsResult<NarrationResult> {
    if script.trim().is_empty() {
        return Err(ShortsError::synthesis("narration script is empty"));
    }

    let out = dir.join(NARRATION_FILE);
    let started = std::time::Instant::now();
    let result = engine.synthesize(script, voice, &out).await?;

    if !result.duration_secs.is_finite() || result.duration_secs <= 0.0 {
        return Err(ShortsError::synthesis(format!(
            "{} produced audio with unusable duration {}",
            engine.name(),
            result.duration_secs
        )));
    }
    tracing::info!(
        duration_secs = result.duration_secs,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "narration synthesized"
    );
    Ok(result)
}

#[cfg(test)]
#[path = "../../tests/unit/narration/registry.rs"]
mod tests;
