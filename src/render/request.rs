//! Request model and the parallel-column form decoding in front of it.
//!
//! Everything here runs before any synthesis or file I/O, so every shape problem surfaces as a
//! validation error with no work done.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::assets::color::ColorSpec;
use crate::compose::frame::TextBlock;
use crate::foundation::error::{ShortsError, ShortsResult};
use crate::narration::{VoiceParams, narration_script};
use crate::timeline::{SegmentWindow, TimingPolicy};

/// Style of one text block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    /// Normalized vertical position, `0` top to `10` bottom.
    pub position: i32,
    pub font_size: u32,
    pub font_color: ColorSpec,
    /// Plate fill behind the text; `transparent` draws none.
    pub bg_color: ColorSpec,
    pub bold: bool,
}

impl TextStyle {
    pub const CAPTION: TextStyle = TextStyle {
        position: 8,
        font_size: 48,
        font_color: ColorSpec::WHITE,
        bg_color: ColorSpec::Transparent,
        bold: false,
    };

    pub const TITLE: TextStyle = TextStyle {
        position: 1,
        font_size: 40,
        font_color: ColorSpec::WHITE,
        bg_color: ColorSpec::Transparent,
        bold: false,
    };

    fn title() -> Self {
        Self::TITLE
    }

    pub fn validate(&self, what: &str) -> ShortsResult<()> {
        if self.font_size == 0 {
            return Err(ShortsError::validation(format!("{what}: font size must be > 0")));
        }
        if self.font_color.solid().is_none() {
            return Err(ShortsError::validation(format!(
                "{what}: font color must not be transparent"
            )));
        }
        Ok(())
    }

    /// Text block drawing `text` in this style.
    pub fn block(&self, text: &str) -> ShortsResult<TextBlock> {
        let color = self.font_color.solid().ok_or_else(|| {
            ShortsError::validation("font color must not be transparent")
        })?;
        Ok(TextBlock {
            text: text.to_string(),
            size_px: self.font_size,
            color,
            plate: self.bg_color,
            bold: self.bold,
            position: self.position,
            line_offset_px: 0,
        })
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::CAPTION
    }
}

/// Per-segment title drawn above everything else in the segment's frames.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SegmentTitle {
    pub text: String,
    #[serde(default = "TextStyle::title")]
    pub style: TextStyle,
}

/// One narrated, captioned unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub style: TextStyle,
    pub title: Option<SegmentTitle>,
    /// Encoded overlay image bytes.
    pub overlay: Option<Vec<u8>>,
}

/// `#title`, `작성자: author` and `조회수: views` lines shown on every frame.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GlobalLabels {
    pub title: String,
    pub author: String,
    pub views: String,
    pub size: u32,
    pub color: ColorSpec,
    pub position: i32,
}

impl Default for GlobalLabels {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            views: String::new(),
            size: 40,
            color: ColorSpec::WHITE,
            position: 1,
        }
    }
}

impl GlobalLabels {
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// Non-empty label lines in display order.
    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.title.trim().is_empty() {
            out.push(format!("#{}", self.title.trim()));
        }
        if !self.author.trim().is_empty() {
            out.push(format!("작성자: {}", self.author.trim()));
        }
        if !self.views.trim().is_empty() {
            out.push(format!("조회수: {}", self.views.trim()));
        }
        out
    }

    /// Vertical distance between consecutive lines.
    pub fn line_step_px(&self) -> i32 {
        (f64::from(self.size) * 1.5).round() as i32
    }

    pub fn validate(&self) -> ShortsResult<()> {
        TextStyle {
            position: self.position,
            font_size: self.size,
            font_color: self.color,
            bg_color: ColorSpec::Transparent,
            bold: false,
        }
        .validate("labels")
    }

    /// One block per line; the first is placed at `position`, the rest step down from it.
    pub fn blocks(&self) -> ShortsResult<Vec<TextBlock>> {
        let style = TextStyle {
            position: self.position,
            font_size: self.size,
            font_color: self.color,
            bg_color: ColorSpec::Transparent,
            bold: false,
        };
        let step = self.line_step_px();
        self.lines()
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let mut block = style.block(line)?;
                block.line_offset_px = step * i as i32;
                Ok(block)
            })
            .collect()
    }
}

/// Which engine speaks the narration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VoiceSelection {
    pub engine: String,
    pub edge_voice: Option<String>,
}

impl Default for VoiceSelection {
    fn default() -> Self {
        Self {
            engine: "gtts".to_string(),
            edge_voice: None,
        }
    }
}

impl VoiceSelection {
    /// Voice parameters with service defaults filled in.
    pub fn params(&self, language: &str, default_voice: &str) -> VoiceParams {
        let voice = self
            .edge_voice
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(default_voice);
        VoiceParams {
            language: language.to_string(),
            voice: voice.to_string(),
        }
    }
}

/// Everything one render needs, already shape-checked by its constructor.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRequest {
    pub segments: Vec<Segment>,
    pub timing: TimingPolicy,
    pub labels: Option<GlobalLabels>,
    /// Encoded background image bytes.
    pub background: Vec<u8>,
    pub voice: VoiceSelection,
}

impl RenderRequest {
    pub fn validate(&self) -> ShortsResult<()> {
        if self.segments.is_empty() {
            return Err(ShortsError::validation("at least one text is required"));
        }
        if self.background.is_empty() {
            return Err(ShortsError::validation("background image is required"));
        }
        for (i, seg) in self.segments.iter().enumerate() {
            seg.style.validate(&format!("segment {i}"))?;
            if let Some(title) = &seg.title {
                title.style.validate(&format!("segment {i} title"))?;
            }
        }
        if let Some(labels) = &self.labels {
            labels.validate()?;
        }
        self.timing.validate(self.segments.len())
    }

    /// Narration script: segment texts in order joined by a sentence separator.
    pub fn script(&self) -> String {
        let texts: Vec<&str> = self.segments.iter().map(|s| s.text.as_str()).collect();
        narration_script(&texts)
    }
}

/// Per-segment parallel columns as submitted by the form.
#[derive(Clone, Debug, Default)]
pub struct SegmentColumns {
    pub texts: Vec<String>,
    pub starts: Vec<String>,
    pub durations: Vec<String>,
    pub positions: Vec<String>,
    pub font_sizes: Vec<String>,
    pub font_colors: Vec<String>,
    pub bg_colors: Vec<String>,
    pub bolds: Vec<String>,
    pub titles: Vec<String>,
    pub title_positions: Vec<String>,
    pub title_colors: Vec<String>,
    pub title_bg_colors: Vec<String>,
    pub title_sizes: Vec<String>,
    pub title_bolds: Vec<String>,
}

impl SegmentColumns {
    /// Append a value to the column named `field`; returns `false` for unknown names.
    pub fn push(&mut self, field: &str, value: String) -> bool {
        let column = match field {
            "texts" => &mut self.texts,
            "starts" => &mut self.starts,
            "durations" => &mut self.durations,
            "positions" => &mut self.positions,
            "fontSizes" => &mut self.font_sizes,
            "fontColors" => &mut self.font_colors,
            "bgColors" => &mut self.bg_colors,
            "bolds" => &mut self.bolds,
            "titles" => &mut self.titles,
            "titlePositions" => &mut self.title_positions,
            "titleColors" => &mut self.title_colors,
            "titleBgColors" => &mut self.title_bg_colors,
            "titleSizes" => &mut self.title_sizes,
            "titleBolds" => &mut self.title_bolds,
            _ => return false,
        };
        column.push(value);
        true
    }

    fn named(&self) -> [(&'static str, &Vec<String>); 13] {
        [
            ("starts", &self.starts),
            ("durations", &self.durations),
            ("positions", &self.positions),
            ("fontSizes", &self.font_sizes),
            ("fontColors", &self.font_colors),
            ("bgColors", &self.bg_colors),
            ("bolds", &self.bolds),
            ("titles", &self.titles),
            ("titlePositions", &self.title_positions),
            ("titleColors", &self.title_colors),
            ("titleBgColors", &self.title_bg_colors),
            ("titleSizes", &self.title_sizes),
            ("titleBolds", &self.title_bolds),
        ]
    }

    /// Check every supplied column has one entry per text. Empty columns mean defaults.
    pub fn check_lengths(&self) -> ShortsResult<usize> {
        let n = self.texts.len();
        if n == 0 {
            return Err(ShortsError::validation("at least one text is required"));
        }
        for (name, column) in self.named() {
            if !column.is_empty() && column.len() != n {
                return Err(ShortsError::validation(format!(
                    "{name} has {} entries but there are {n} texts",
                    column.len()
                )));
            }
        }
        if self.starts.is_empty() != self.durations.is_empty() {
            return Err(ShortsError::validation(
                "starts and durations must be supplied together",
            ));
        }
        Ok(n)
    }

    /// Decode the columns into segments and a timing policy.
    ///
    /// `overlays[i]` belongs to segment `i`; an empty entry is a placeholder for "no image".
    pub fn into_segments(
        self,
        overlays: Vec<Vec<u8>>,
    ) -> ShortsResult<(Vec<Segment>, TimingPolicy)> {
        let n = self.check_lengths()?;
        if overlays.iter().skip(n).any(|b| !b.is_empty()) {
            return Err(ShortsError::validation(format!(
                "{} images for {n} texts",
                overlays.len()
            )));
        }

        let timing = if self.starts.is_empty() {
            TimingPolicy::Uniform
        } else {
            let windows = (0..n)
                .map(|i| {
                    Ok(SegmentWindow {
                        start: parse_num(&self.starts[i], "starts", i)?,
                        duration: parse_num(&self.durations[i], "durations", i)?,
                    })
                })
                .collect::<ShortsResult<Vec<_>>>()?;
            TimingPolicy::Explicit(windows)
        };

        let mut overlays = overlays.into_iter();
        let mut segments = Vec::with_capacity(n);
        for i in 0..n {
            let style = TextStyle {
                position: pick(&self.positions, i, "positions", TextStyle::CAPTION.position)?,
                font_size: pick(&self.font_sizes, i, "fontSizes", TextStyle::CAPTION.font_size)?,
                font_color: pick_color(&self.font_colors, i, "fontColors", ColorSpec::WHITE)?,
                bg_color: pick_color(&self.bg_colors, i, "bgColors", ColorSpec::Transparent)?,
                bold: pick_bool(&self.bolds, i, "bolds")?,
            };

            let title = match self.titles.get(i).map(|t| t.trim()) {
                Some(text) if !text.is_empty() => Some(SegmentTitle {
                    text: text.to_string(),
                    style: TextStyle {
                        position: pick(
                            &self.title_positions,
                            i,
                            "titlePositions",
                            TextStyle::TITLE.position,
                        )?,
                        font_size: pick(
                            &self.title_sizes,
                            i,
                            "titleSizes",
                            TextStyle::TITLE.font_size,
                        )?,
                        font_color: pick_color(
                            &self.title_colors,
                            i,
                            "titleColors",
                            ColorSpec::WHITE,
                        )?,
                        bg_color: pick_color(
                            &self.title_bg_colors,
                            i,
                            "titleBgColors",
                            ColorSpec::Transparent,
                        )?,
                        bold: pick_bool(&self.title_bolds, i, "titleBolds")?,
                    },
                }),
                _ => None,
            };

            segments.push(Segment {
                text: self.texts[i].clone(),
                style,
                title,
                overlay: overlays.next().filter(|b| !b.is_empty()),
            });
        }
        Ok((segments, timing))
    }
}

fn parse_num<T: std::str::FromStr>(raw: &str, column: &str, i: usize) -> ShortsResult<T> {
    raw.trim().parse().map_err(|_| {
        ShortsError::validation(format!("{column}[{i}]: '{}' is not a valid number", raw.trim()))
    })
}

fn pick<T: std::str::FromStr>(
    column: &[String],
    i: usize,
    name: &str,
    default: T,
) -> ShortsResult<T> {
    match column.get(i) {
        Some(raw) => parse_num(raw, name, i),
        None => Ok(default),
    }
}

fn pick_color(
    column: &[String],
    i: usize,
    name: &str,
    default: ColorSpec,
) -> ShortsResult<ColorSpec> {
    match column.get(i) {
        Some(raw) => ColorSpec::parse(raw)
            .map_err(|e| ShortsError::validation(format!("{name}[{i}]: {e}"))),
        None => Ok(default),
    }
}

fn pick_bool(column: &[String], i: usize, name: &str) -> ShortsResult<bool> {
    match column.get(i) {
        Some(raw) => parse_bool(raw)
            .ok_or_else(|| ShortsError::validation(format!("{name}[{i}]: '{raw}' is not a boolean"))),
        None => Ok(false),
    }
}

/// Form-style boolean: `true/false`, `1/0`, `yes/no`, `on/off`; blank is false.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Text fields of a `/generate` form, collected before decoding.
#[derive(Clone, Debug, Default)]
pub struct RequestForm {
    columns: SegmentColumns,
    scalars: HashMap<String, String>,
}

impl RequestForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one text field. A trailing `[]` on the name is ignored.
    pub fn push_field(&mut self, name: &str, value: String) {
        let name = name.strip_suffix("[]").unwrap_or(name);
        if !self.columns.push(name, value.clone()) {
            self.scalars.insert(name.to_string(), value);
        }
    }

    fn scalar(&self, name: &str) -> Option<&str> {
        self.scalars
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    fn labels(&self) -> ShortsResult<Option<GlobalLabels>> {
        let defaults = GlobalLabels::default();
        let labels = GlobalLabels {
            title: self.scalar("title").unwrap_or_default().to_string(),
            author: self.scalar("author").unwrap_or_default().to_string(),
            views: self.scalar("views").unwrap_or_default().to_string(),
            size: match self.scalar("titleSize") {
                Some(raw) => parse_num(raw, "titleSize", 0)?,
                None => defaults.size,
            },
            color: match self.scalar("titleColor") {
                Some(raw) => ColorSpec::parse(raw)?,
                None => defaults.color,
            },
            position: match self.scalar("titlePosition") {
                Some(raw) => parse_num(raw, "titlePosition", 0)?,
                None => defaults.position,
            },
        };
        Ok((!labels.is_empty()).then_some(labels))
    }

    /// Decode and validate into a request. `overlays` are the `images` parts in order,
    /// empty ones included.
    pub fn into_request(
        self,
        background: Option<Vec<u8>>,
        overlays: Vec<Vec<u8>>,
    ) -> ShortsResult<RenderRequest> {
        let labels = self.labels()?;
        let voice = VoiceSelection {
            engine: self.scalar("voiceEngine").unwrap_or("gtts").to_string(),
            edge_voice: self.scalar("edgeVoice").map(str::to_string),
        };
        let (segments, timing) = self.columns.into_segments(overlays)?;
        let background = background
            .filter(|b| !b.is_empty())
            .ok_or_else(|| ShortsError::validation("background image is required"))?;

        let req = RenderRequest {
            segments,
            timing,
            labels,
            background,
            voice,
        };
        req.validate()?;
        Ok(req)
    }
}

/// JSON render description used by the command line.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderManifest {
    pub segments: Vec<ManifestSegment>,
    pub labels: Option<GlobalLabels>,
    pub voice_engine: Option<String>,
    pub edge_voice: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSegment {
    pub text: String,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default)]
    pub title: Option<SegmentTitle>,
    /// Overlay image path, relative to the manifest's directory.
    #[serde(default)]
    pub image: Option<PathBuf>,
}

impl RenderManifest {
    pub fn from_json(json: &str) -> ShortsResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ShortsError::validation(format!("invalid render manifest: {e}")))
    }

    /// Load overlay files relative to `base_dir` and build a validated request.
    pub fn into_request(self, background: Vec<u8>, base_dir: &Path) -> ShortsResult<RenderRequest> {
        let timed = self
            .segments
            .iter()
            .filter(|s| s.start.is_some() || s.duration.is_some())
            .count();
        let timing = if timed == 0 {
            TimingPolicy::Uniform
        } else {
            let windows = self
                .segments
                .iter()
                .enumerate()
                .map(|(i, s)| match (s.start, s.duration) {
                    (Some(start), Some(duration)) => Ok(SegmentWindow { start, duration }),
                    _ => Err(ShortsError::validation(format!(
                        "segment {i}: start and duration must be given for every segment or none"
                    ))),
                })
                .collect::<ShortsResult<Vec<_>>>()?;
            TimingPolicy::Explicit(windows)
        };

        let mut segments = Vec::with_capacity(self.segments.len());
        for seg in self.segments {
            let overlay = match &seg.image {
                Some(rel) => {
                    let path = base_dir.join(rel);
                    Some(std::fs::read(&path).map_err(|e| {
                        ShortsError::validation(format!(
                            "cannot read overlay '{}': {e}",
                            path.display()
                        ))
                    })?)
                }
                None => None,
            };
            segments.push(Segment {
                text: seg.text,
                style: seg.style,
                title: seg.title.filter(|t| !t.text.trim().is_empty()),
                overlay,
            });
        }

        let req = RenderRequest {
            segments,
            timing,
            labels: self.labels.filter(|l| !l.is_empty()),
            background,
            voice: VoiceSelection {
                engine: self.voice_engine.unwrap_or_else(|| "gtts".to_string()),
                edge_voice: self.edge_voice,
            },
        };
        req.validate()?;
        Ok(req)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/request.rs"]
mod tests;
