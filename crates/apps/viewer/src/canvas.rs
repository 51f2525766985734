//! Drawing surface used by the frame composer.

use foundation::math::{Vec2, Viewport};

pub type Rgba = [f32; 4];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextStyle {
    pub size_px: f64,
    pub color: Rgba,
    pub anchor: TextAnchor,
    /// Outline drawn behind the glyphs: color and width.
    pub halo: Option<(Rgba, f64)>,
    pub bold: bool,
}

impl TextStyle {
    pub fn new(size_px: f64, color: Rgba) -> Self {
        Self {
            size_px,
            color,
            anchor: TextAnchor::Start,
            halo: None,
            bold: false,
        }
    }

    pub fn anchored(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_halo(mut self, color: Rgba, width_px: f64) -> Self {
        self.halo = Some((color, width_px));
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

pub trait Canvas {
    type Output;

    fn begin(&mut self, viewport: Viewport, background: Rgba);

    /// Filled polygon with holes (even-odd), rings open.
    fn polygon(&mut self, rings: &[Vec<Vec2>], fill: Rgba, stroke: Rgba, stroke_width: f64);

    fn rect(&mut self, min: Vec2, size: Vec2, fill: Rgba);

    /// Square dots of side `size_px` centered on each point.
    fn points(&mut self, points: &[Vec2], color: Rgba, size_px: f64);

    fn text(&mut self, at: Vec2, text: &str, style: &TextStyle);

    fn finish(self) -> Self::Output;
}
