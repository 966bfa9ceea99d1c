//! Text block placement inside the canvas.
//!
//! Placement is pure integer math over measured text extents; measurement itself lives in
//! [`text`] and uses the real glyph metrics of the resolved font.

pub(crate) mod text;

use crate::foundation::core::Canvas;
use crate::foundation::math::floor_div;

/// Number of steps in the normalized vertical position scale (`0` = top, `10` = bottom).
pub const POSITION_STEPS: i64 = 10;

/// Placed text box in canvas pixels. The origin may be negative for oversized text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Axis-aligned rectangle with exclusive right/bottom edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlateRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PlateRect {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.x0 <= x && x < self.x1 && self.y0 <= y && y < self.y1
    }
}

impl TextBox {
    /// Background plate: the text box grown by `padding` on every side.
    pub fn plate(&self, padding: u32) -> PlateRect {
        let p = padding as i32;
        PlateRect {
            x0: self.x - p,
            y0: self.y - p,
            x1: self.x + self.width as i32 + p,
            y1: self.y + self.height as i32 + p,
        }
    }

    /// Same box moved down by `dy` pixels.
    pub fn shifted_down(self, dy: i32) -> Self {
        Self {
            y: self.y + dy,
            ..self
        }
    }
}

/// Place a `text_width x text_height` block: centered horizontally, and vertically at
/// `floor((H - h) * position / 10)`.
///
/// `position` is not clamped; values outside `0..=10` extrapolate past the canvas edges.
pub fn place(text_width: u32, text_height: u32, canvas: Canvas, position: i32) -> TextBox {
    let free_w = i64::from(canvas.width) - i64::from(text_width);
    let free_h = i64::from(canvas.height) - i64::from(text_height);
    TextBox {
        x: floor_div(free_w, 2) as i32,
        y: floor_div(free_h * i64::from(position), POSITION_STEPS) as i32,
        width: text_width,
        height: text_height,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/place.rs"]
mod tests;
