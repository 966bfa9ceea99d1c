use std::path::Path;
use std::time::Duration;

use crate::foundation::error::{ShortsError, ShortsResult};

use super::{NarrationResult, Synthesizer, VoiceParams, probe};

/// Public Google Translate speech endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Longest text the endpoint accepts per request, in characters.
pub const MAX_CHUNK_CHARS: usize = 100;

const BREAK_CHARS: &[char] = &['.', ',', '!', '?', ';', ':', '。', '、', '，', '！', '？'];

/// Google Translate text-to-speech; language fixed per request, no voice choice.
#[derive(Clone, Debug)]
pub struct GoogleTts {
    client: reqwest::Client,
    endpoint: String,
    ffprobe_bin: String,
}

impl GoogleTts {
    pub fn new(ffprobe_bin: impl Into<String>) -> ShortsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0")
            .build()
            .map_err(|e| ShortsError::synthesis(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            ffprobe_bin: ffprobe_bin.into(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> ShortsResult<Vec<u8>> {
        let total_s = total.to_string();
        let idx_s = idx.to_string();
        let len_s = chunk.chars().count().to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", chunk),
                ("total", total_s.as_str()),
                ("idx", idx_s.as_str()),
                ("textlen", len_s.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ShortsError::synthesis(format!("google tts request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ShortsError::synthesis(format!(
                "google tts returned {status} for chunk {idx}/{total}"
            )));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ShortsError::synthesis(format!("google tts body read failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl Synthesizer for GoogleTts {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceParams,
        out: &Path,
    ) -> ShortsResult<NarrationResult> {
        let chunks = split_chunks(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(ShortsError::synthesis("cannot synthesize empty text"));
        }

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(
                self.fetch_chunk(chunk, &voice.language, idx, chunks.len())
                    .await?,
            );
        }
        tracing::debug!(chunks = chunks.len(), bytes = audio.len(), "google tts done");

        tokio::fs::write(out, &audio)
            .await
            .map_err(|e| ShortsError::synthesis(format!("failed to write {}: {e}", out.display())))?;

        let duration_secs = probe::audio_duration_secs(&self.ffprobe_bin, out).await?;
        Ok(NarrationResult {
            audio_path: out.to_path_buf(),
            duration_secs,
        })
    }
}

/// Split `text` into trimmed chunks of at most `max_chars` characters.
///
/// Breaks prefer whitespace and punctuation; a run without break points is cut hard.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for token in break_tokens(text) {
        let token_len = token.chars().count();
        if current_len + token_len > max_chars {
            flush(&mut chunks, &mut current);
            current_len = 0;
        }
        if token_len > max_chars {
            let chars: Vec<char> = token.chars().collect();
            for piece in chars.chunks(max_chars) {
                let mut piece: String = piece.iter().collect();
                flush(&mut chunks, &mut piece);
            }
            continue;
        }
        current.push_str(token);
        current_len += token_len;
    }
    flush(&mut chunks, &mut current);
    chunks
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
}

/// Pieces of `text` that each end right after a break character (or at the end of text).
fn break_tokens(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() || BREAK_CHARS.contains(&ch) {
            let end = i + ch.len_utf8();
            out.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/narration/google.rs"]
mod tests;
