use std::sync::Arc;

use image::{RgbaImage, imageops::FilterType};

use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{ShortsError, ShortsResult};
use crate::foundation::math::{mul_div255_u16, premultiply_rgba8_in_place};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    fn from_straight(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let mut rgba8_premul = img.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        }
    }
}

/// How the background image is mapped onto the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundFit {
    /// Aspect-preserving scale-to-fit, centered over a solid fill. Never clips.
    #[default]
    Contain,
    /// Stretch to exactly the canvas size.
    Fill,
}

impl std::str::FromStr for BackgroundFit {
    type Err = ShortsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contain" => Ok(Self::Contain),
            "fill" => Ok(Self::Fill),
            other => Err(ShortsError::validation(format!(
                "background fit must be 'contain' or 'fill', got '{other}'"
            ))),
        }
    }
}

/// Decode any supported raster format into straight RGBA8.
pub fn decode_rgba(bytes: &[u8], what: &str) -> ShortsResult<RgbaImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ShortsError::composition(format!("failed to decode {what}: {e}")))?;
    Ok(img.to_rgba8())
}

/// Largest size with the source aspect ratio that fits inside `max_w x max_h`.
pub fn fit_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (0, 0);
    }
    let scale = f64::min(
        f64::from(max_w) / f64::from(src_w),
        f64::from(max_h) / f64::from(src_h),
    );
    let w = (f64::from(src_w) * scale).round().clamp(1.0, f64::from(max_w.max(1)));
    let h = (f64::from(src_h) * scale).round().clamp(1.0, f64::from(max_h.max(1)));
    (w as u32, h as u32)
}

/// Like [`fit_dimensions`] but never enlarges: images that already fit keep their size.
pub fn thumbnail_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w <= max_w && src_h <= max_h {
        return (src_w, src_h);
    }
    fit_dimensions(src_w, src_h, max_w, max_h)
}

/// Build the opaque, canvas-sized base layer every frame starts from.
pub fn prepare_backdrop(
    bytes: &[u8],
    canvas: Canvas,
    fit: BackgroundFit,
    fill: Rgba8,
) -> ShortsResult<PreparedImage> {
    let src = decode_rgba(bytes, "background image")?;
    let fill = image::Rgba([fill.r, fill.g, fill.b, 255]);
    let mut base = RgbaImage::from_pixel(canvas.width, canvas.height, fill);

    match fit {
        BackgroundFit::Fill => {
            let scaled =
                image::imageops::resize(&src, canvas.width, canvas.height, FilterType::Triangle);
            flatten_onto(&mut base, &scaled, 0, 0);
        }
        BackgroundFit::Contain => {
            let (w, h) = fit_dimensions(src.width(), src.height(), canvas.width, canvas.height);
            let scaled = if (w, h) == src.dimensions() {
                src
            } else {
                image::imageops::resize(&src, w, h, FilterType::Triangle)
            };
            let x = (i64::from(canvas.width) - i64::from(w)) / 2;
            let y = (i64::from(canvas.height) - i64::from(h)) / 2;
            flatten_onto(&mut base, &scaled, x, y);
        }
    }

    Ok(PreparedImage::from_straight(base))
}

/// Source-over `src` (straight alpha) onto the opaque `base` at `(x, y)`; `base` stays opaque.
fn flatten_onto(base: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    for (sx, sy, px) in src.enumerate_pixels() {
        let (Ok(dx), Ok(dy)) = (
            u32::try_from(x + i64::from(sx)),
            u32::try_from(y + i64::from(sy)),
        ) else {
            continue;
        };
        if dx >= base.width() || dy >= base.height() {
            continue;
        }
        let a = u16::from(px[3]);
        let dst = base.get_pixel_mut(dx, dy);
        for c in 0..3 {
            let v = mul_div255_u16(u16::from(px[c]), a)
                + mul_div255_u16(u16::from(dst[c]), 255 - a);
            dst[c] = v.min(255) as u8;
        }
        dst[3] = 255;
    }
}

/// Decode an overlay and shrink it to fit a `max_side x max_side` box.
pub fn prepare_overlay(bytes: &[u8], max_side: u32) -> ShortsResult<PreparedImage> {
    let src = decode_rgba(bytes, "overlay image")?;
    let (w, h) = thumbnail_dimensions(src.width(), src.height(), max_side, max_side);
    let img = if (w, h) == src.dimensions() {
        src
    } else {
        image::imageops::resize(&src, w, h, FilterType::Triangle)
    };
    Ok(PreparedImage::from_straight(img))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
