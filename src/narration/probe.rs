use std::path::Path;

use crate::foundation::error::{ShortsError, ShortsResult};

#[derive(serde::Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Container duration of an audio file in seconds, read with `ffprobe`.
pub async fn audio_duration_secs(ffprobe_bin: &str, path: &Path) -> ShortsResult<f64> {
    let output = tokio::process::Command::new(ffprobe_bin)
        .arg("-v")
        .arg("error")
        .arg("-show_entries")
        .arg("format=duration")
        .arg("-of")
        .arg("json")
        .arg(path)
        .output()
        .await
        .map_err(|e| ShortsError::synthesis(format!("failed to run {ffprobe_bin}: {e}")))?;

    if !output.status.success() {
        return Err(ShortsError::synthesis(format!(
            "{ffprobe_bin} failed on {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    parse_probe_json(&output.stdout)
}

/// Parse `ffprobe -show_entries format=duration -of json` output.
pub fn parse_probe_json(stdout: &[u8]) -> ShortsResult<f64> {
    let parsed: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ShortsError::synthesis(format!("unreadable ffprobe output: {e}")))?;
    let raw = parsed
        .format
        .duration
        .ok_or_else(|| ShortsError::synthesis("ffprobe reported no duration"))?;
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ShortsError::synthesis(format!("ffprobe duration '{raw}' is not a number")))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ShortsError::synthesis(format!(
            "audio duration must be > 0, got {secs}"
        )));
    }
    Ok(secs)
}
