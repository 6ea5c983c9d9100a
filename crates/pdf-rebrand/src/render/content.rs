//! Overlay content stream builder

use super::fmt_num;
use crate::geometry::{ImagePlacement, Rect};

/// Accumulates PDF content stream operators as text
#[derive(Debug, Default)]
pub(crate) struct ContentBuilder {
    ops: String,
}

impl ContentBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Concatenate a matrix onto the CTM for everything that follows
    pub(crate) fn transform(&mut self, m: [f32; 6]) {
        self.ops.push_str(&format!("{} cm\n", matrix(&m)));
    }

    /// Fill a PDF-space rectangle with an RGB color
    pub(crate) fn fill_rect(&mut self, rect: &Rect, color: [f32; 3]) {
        self.ops.push_str(&format!(
            "q {} rg {} {} {} {} re f Q\n",
            rgb(color),
            fmt_num(rect.x),
            fmt_num(rect.y),
            fmt_num(rect.width),
            fmt_num(rect.height)
        ));
    }

    /// Paint an image XObject
    pub(crate) fn draw_image(&mut self, name: &str, placement: &ImagePlacement) {
        self.ops.push_str(&format!(
            "q {} cm /{} Do Q\n",
            matrix(&placement.matrix()),
            name
        ));
    }

    /// Show a hex-encoded glyph run with the given text matrix
    pub(crate) fn draw_text(
        &mut self,
        font: &str,
        size: f32,
        color: [f32; 3],
        text_matrix: [f32; 6],
        hex: &str,
    ) {
        self.ops.push_str(&format!(
            "BT /{} {} Tf {} rg {} Tm {} Tj ET\n",
            font,
            fmt_num(size),
            rgb(color),
            matrix(&text_matrix),
            hex
        ));
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.ops.into_bytes()
    }
}

fn rgb(color: [f32; 3]) -> String {
    color.iter().map(|&c| fmt_num(c)).collect::<Vec<_>>().join(" ")
}

fn matrix(m: &[f32; 6]) -> String {
    m.iter().map(|&v| fmt_num(v)).collect::<Vec<_>>().join(" ")
}
