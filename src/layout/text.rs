use crate::assets::font::FontBook;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{ShortsError, ShortsResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Shaped text with its measured pixel extents.
pub(crate) struct MeasuredText {
    pub(crate) layout: parley::Layout<TextBrushRgba8>,
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Horizontal offset of the second glyph pass for faux bold, `0` when regular.
    pub(crate) bold_offset_px: u32,
}

/// Faux-bold stroke offset for a given font size.
pub(crate) fn bold_offset_px(size_px: f32) -> u32 {
    ((size_px / 24.0).round() as u32).max(1)
}

/// Stateful helper for shaping text with the single resolved face of a [`FontBook`].
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: Option<String>,
    font: Option<vello_cpu::peniko::FontData>,
}

impl TextLayoutEngine {
    /// Register the book's face with fresh Parley contexts.
    ///
    /// A face that Parley cannot register leaves the engine without a font, exactly like an
    /// empty book.
    pub(crate) fn new(book: &FontBook) -> Self {
        let mut font_ctx = parley::FontContext::default();
        let mut family_name = None;
        let mut font = None;

        if let Some(face) = book.face() {
            let families = font_ctx.collection.register_fonts(
                parley::fontique::Blob::from(face.bytes.as_ref().clone()),
                None,
            );
            family_name = families
                .first()
                .and_then(|(id, _)| font_ctx.collection.family_name(*id))
                .map(str::to_string);
            if family_name.is_some() {
                font = Some(vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone()),
                    face.index,
                ));
            } else {
                tracing::warn!("font face could not be registered for layout");
            }
        }

        Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
        }
    }

    /// Font handed to the rasterizer; `None` when text cannot be drawn.
    pub(crate) fn font(&self) -> Option<&vello_cpu::peniko::FontData> {
        self.font.as_ref()
    }

    /// Shape `text` and measure it.
    ///
    /// Returns `Ok(None)` when there is nothing to draw: empty text or no usable font.
    pub(crate) fn measure(
        &mut self,
        text: &str,
        size_px: f32,
        color: Rgba8,
        bold: bool,
    ) -> ShortsResult<Option<MeasuredText>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ShortsError::composition(
                "text size_px must be finite and > 0",
            ));
        }
        if text.is_empty() {
            return Ok(None);
        }
        let Some(family_name) = self.family_name.clone() else {
            return Ok(None);
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8::from(
            color,
        )));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        let bold_offset_px = if bold { bold_offset_px(size_px) } else { 0 };
        let width = layout.width().ceil().max(0.0) as u32 + bold_offset_px;
        let height = layout.height().ceil().max(0.0) as u32;

        Ok(Some(MeasuredText {
            layout,
            width,
            height,
            bold_offset_px,
        }))
    }
}
