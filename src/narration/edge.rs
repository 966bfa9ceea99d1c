use std::path::Path;

use crate::foundation::error::{ShortsError, ShortsResult};

use super::{NarrationResult, Synthesizer, VoiceParams, probe};

/// Microsoft Edge neural voices through the `edge-tts` command line tool.
#[derive(Clone, Debug)]
pub struct EdgeTts {
    bin: String,
    ffprobe_bin: String,
}

impl EdgeTts {
    pub fn new(bin: impl Into<String>, ffprobe_bin: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            ffprobe_bin: ffprobe_bin.into(),
        }
    }
}

#[async_trait::async_trait]
impl Synthesizer for EdgeTts {
    fn name(&self) -> &'static str {
        "edge"
    }

    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceParams,
        out: &Path,
    ) -> ShortsResult<NarrationResult> {
        if text.trim().is_empty() {
            return Err(ShortsError::synthesis("cannot synthesize empty text"));
        }
        if voice.voice.trim().is_empty() {
            return Err(ShortsError::synthesis("edge voice id is empty"));
        }

        tracing::debug!(voice = %voice.voice, "running edge-tts");
        let output = tokio::process::Command::new(&self.bin)
            .arg("--voice")
            .arg(&voice.voice)
            .arg("--text")
            .arg(text)
            .arg("--write-media")
            .arg(out)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ShortsError::synthesis(format!("failed to run {}: {e}", self.bin)))?;

        if !output.status.success() {
            return Err(ShortsError::synthesis(format!(
                "{} exited with {}: {}",
                self.bin,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let duration_secs = probe::audio_duration_secs(&self.ffprobe_bin, out).await?;
        Ok(NarrationResult {
            audio_path: out.to_path_buf(),
            duration_secs,
        })
    }
}
