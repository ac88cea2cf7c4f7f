use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};

use crate::assets::FontKind;

/// Which point of the rendered text sits on the label's position.
/// Vertically all anchors use the middle between ascender and descender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    LeftMiddle,
    RightMiddle,
    CentreMiddle,
}

#[derive(Debug, Clone)]
pub struct TextLabel {
    pub text: String,
    pub position: (i32, i32),
    pub font: FontKind,
    pub size: f32,
    pub colour: Rgba<u8>,
    pub anchor: Anchor,
}

impl TextLabel {
    pub fn new(
        text: impl Into<String>,
        position: (i32, i32),
        font: FontKind,
        size: f32,
        colour: Rgba<u8>,
        anchor: Anchor,
    ) -> Self {
        Self { text: text.into(), position, font, size, colour, anchor }
    }

    pub fn draw(&self, canvas: &mut RgbaImage, font: &Font<'_>) {
        let scale = Scale::uniform(self.size);
        let v_metrics = font.v_metrics(scale);
        let width = text_width(font, scale, &self.text);

        let (x, y) = self.position;
        let left = match self.anchor {
            Anchor::LeftMiddle => x as f32,
            Anchor::RightMiddle => x as f32 - width,
            Anchor::CentreMiddle => x as f32 - width / 2.0,
        };
        let baseline = y as f32 + (v_metrics.ascent + v_metrics.descent) / 2.0;

        for glyph in font.layout(&self.text, scale, point(left, baseline)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px >= canvas.width() as i32 || py >= canvas.height() as i32 {
                    return;
                }
                blend(canvas.get_pixel_mut(px as u32, py as u32), self.colour, coverage);
            });
        }
    }
}

/// Advance width of `text`, kerning included.
pub fn text_width(font: &Font<'_>, scale: Scale, text: &str) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Source-over compositing of `colour` at `coverage` onto `dst`.
fn blend(dst: &mut Rgba<u8>, colour: Rgba<u8>, coverage: f32) {
    let src_a = coverage.clamp(0.0, 1.0) * f32::from(colour.0[3]) / 255.0;
    if src_a <= 0.0 {
        return;
    }
    let dst_a = f32::from(dst.0[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    for c in 0..3 {
        let src = f32::from(colour.0[c]);
        let below = f32::from(dst.0[c]);
        dst.0[c] = ((src * src_a + below * dst_a * (1.0 - src_a)) / out_a).round() as u8;
    }
    dst.0[3] = (out_a * 255.0).round() as u8;
}
