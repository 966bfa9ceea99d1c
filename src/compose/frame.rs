use crate::assets::color::ColorSpec;
use crate::assets::decode::PreparedImage;
use crate::assets::font::FontBook;
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{ShortsError, ShortsResult};
use crate::foundation::math::floor_div;
use crate::layout::place;
use crate::layout::text::{MeasuredText, TextLayoutEngine};

/// A composed frame as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha. Composed frames are opaque, so both readings
    /// agree.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

/// Settings shared by every frame of one render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComposeSettings {
    pub canvas: Canvas,
    /// Plate padding in pixels on each side of a text box.
    pub plate_padding: u32,
}

impl ComposeSettings {
    pub fn validate(&self) -> ShortsResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ShortsError::validation("canvas width/height must be non-zero"));
        }
        if u16::try_from(self.canvas.width).is_err() || u16::try_from(self.canvas.height).is_err()
        {
            return Err(ShortsError::validation("canvas width/height must fit in u16"));
        }
        Ok(())
    }
}

/// One text block, placed through the layout engine.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextBlock {
    pub text: String,
    pub size_px: u32,
    pub color: Rgba8,
    /// Plate fill; the transparent sentinel draws no plate.
    pub plate: ColorSpec,
    pub bold: bool,
    /// Normalized vertical position (`0..=10`, not clamped).
    pub position: i32,
    /// Extra downward shift after placement, used for stacked label lines.
    pub line_offset_px: i32,
}

/// Everything drawn on top of the backdrop for one frame, in z-order groups.
#[derive(Clone, Debug, Default)]
pub struct FrameLayers<'a> {
    /// Text drawn directly over the backdrop (global labels).
    pub under: Vec<&'a TextBlock>,
    /// Centered overlay images.
    pub overlays: Vec<&'a PreparedImage>,
    /// Text drawn over the overlays (captions, then titles).
    pub over: Vec<&'a TextBlock>,
}

/// Rasterizes frames on the CPU with `vello_cpu`.
pub struct FrameComposer {
    settings: ComposeSettings,
    backdrop: vello_cpu::Image,
    text: TextLayoutEngine,
}

impl FrameComposer {
    /// `backdrop` must come from [`image_paint`] of a canvas-sized opaque image.
    pub fn new(settings: ComposeSettings, backdrop: vello_cpu::Image, fonts: &FontBook) -> Self {
        Self {
            settings,
            backdrop,
            text: TextLayoutEngine::new(fonts),
        }
    }

    /// Compose one fully opaque frame.
    pub fn compose(&mut self, layers: &FrameLayers<'_>) -> ShortsResult<FrameRGBA> {
        let canvas = self.settings.canvas;
        let (w, h) = canvas_u16(canvas)?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(self.backdrop.clone());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(canvas.width),
            f64::from(canvas.height),
        ));

        for block in &layers.under {
            self.draw_text_block(&mut ctx, block)?;
        }

        for overlay in &layers.overlays {
            let paint = image_paint(overlay)?;
            let x = floor_div(i64::from(canvas.width) - i64::from(overlay.width), 2);
            let y = floor_div(i64::from(canvas.height) - i64::from(overlay.height), 2);
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((x as f64, y as f64)));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(overlay.width),
                f64::from(overlay.height),
            ));
        }

        for block in &layers.over {
            self.draw_text_block(&mut ctx, block)?;
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        let mut data = pixmap.data_as_u8_slice().to_vec();
        force_opaque(&mut data);
        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        })
    }

    fn draw_text_block(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        block: &TextBlock,
    ) -> ShortsResult<()> {
        let Some(font) = self.text.font().cloned() else {
            return Ok(());
        };
        let Some(measured) =
            self.text
                .measure(&block.text, block.size_px as f32, block.color, block.bold)?
        else {
            return Ok(());
        };

        let placed = place(
            measured.width,
            measured.height,
            self.settings.canvas,
            block.position,
        )
        .shifted_down(block.line_offset_px);

        if let Some(fill) = block.plate.solid() {
            let r = placed.plate(self.settings.plate_padding);
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                fill.r, fill.g, fill.b, fill.a,
            ));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                f64::from(r.x0),
                f64::from(r.y0),
                f64::from(r.x1),
                f64::from(r.y1),
            ));
        }

        draw_glyphs(ctx, &measured, &font, placed.x, placed.y);
        if measured.bold_offset_px > 0 {
            draw_glyphs(
                ctx,
                &measured,
                &font,
                placed.x + measured.bold_offset_px as i32,
                placed.y,
            );
        }
        Ok(())
    }
}

fn draw_glyphs(
    ctx: &mut vello_cpu::RenderContext,
    measured: &MeasuredText,
    font: &vello_cpu::peniko::FontData,
    x: i32,
    y: i32,
) {
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((
        f64::from(x),
        f64::from(y),
    )));
    for line in measured.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };

            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));

            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

fn canvas_u16(canvas: Canvas) -> ShortsResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| ShortsError::composition("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| ShortsError::composition("canvas height exceeds u16"))?;
    Ok((w, h))
}

/// Wrap a prepared image as a `vello_cpu` image paint.
pub fn image_paint(img: &PreparedImage) -> ShortsResult<vello_cpu::Image> {
    let w: u16 = img
        .width
        .try_into()
        .map_err(|_| ShortsError::composition("image width exceeds u16"))?;
    let h: u16 = img
        .height
        .try_into()
        .map_err(|_| ShortsError::composition("image height exceeds u16"))?;
    if img.rgba8_premul.len() != img.width as usize * img.height as usize * 4 {
        return Err(ShortsError::composition(
            "prepared image byte length mismatch",
        ));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(img.width as usize * img.height as usize);
    for px in img.rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn force_opaque(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        px[3] = 255;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/frame.rs"]
mod tests;
