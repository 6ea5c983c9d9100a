//! Mask band calculation
//!
//! Mask settings are authored in display space. The bottom band always
//! spans the page width at the bottom edge; the optional left strip turns
//! the mask into an L-shape.

use super::Rect;
use crate::diagnostics::{MaskEdge, Warning};
use crate::options::MaskSettings;
use crate::types::DisplaySize;

/// Display-space mask rectangles for one page
#[derive(Debug, Clone, PartialEq)]
pub struct MaskRects {
    /// Band along the bottom edge
    pub bottom: Rect,
    /// Strip along the left edge (L-shape only)
    pub left: Option<Rect>,
    /// Clamping that was applied to the settings
    pub warnings: Vec<Warning>,
}

impl MaskRects {
    /// Rectangles in draw order
    pub fn iter(&self) -> impl Iterator<Item = &Rect> {
        std::iter::once(&self.bottom).chain(self.left.iter())
    }

    pub fn scaled(&self, ratio: f32) -> Self {
        Self {
            bottom: self.bottom.scaled(ratio),
            left: self.left.map(|r| r.scaled(ratio)),
            warnings: self.warnings.clone(),
        }
    }
}

/// Compute the mask rectangles for a page.
///
/// `bottom_height` is clamped to the display height and `left_width` to the
/// display width; each clamp is reported as [`Warning::MaskOutOfBounds`].
/// With an L-shape the bottom band starts right of the strip, and the
/// strip runs the full page height so the corner stays covered.
pub fn compute_mask_rects(display: DisplaySize, settings: &MaskSettings) -> MaskRects {
    let mut warnings = Vec::new();

    let bottom_height = clamp_extent(
        settings.bottom_height,
        display.height,
        MaskEdge::Bottom,
        &mut warnings,
    );

    let left_width = if settings.enable_l_shape {
        clamp_extent(settings.left_width, display.width, MaskEdge::Left, &mut warnings)
    } else {
        0.0
    };

    let bottom_y = display.height - bottom_height;

    if left_width > 0.0 {
        MaskRects {
            bottom: Rect::new(
                left_width,
                bottom_y,
                display.width - left_width,
                bottom_height,
            ),
            left: Some(Rect::new(0.0, 0.0, left_width, display.height)),
            warnings,
        }
    } else {
        MaskRects {
            bottom: Rect::new(0.0, bottom_y, display.width, bottom_height),
            left: None,
            warnings,
        }
    }
}

fn clamp_extent(requested: f32, limit: f32, edge: MaskEdge, warnings: &mut Vec<Warning>) -> f32 {
    let limit = limit.max(0.0);
    let clamped = if requested.is_nan() {
        0.0
    } else {
        requested.clamp(0.0, limit)
    };

    if clamped != requested {
        log::warn!(
            "{:?} mask extent {} is outside the page, clamped to {}",
            edge,
            requested,
            clamped
        );
        warnings.push(Warning::MaskOutOfBounds {
            edge,
            requested,
            clamped,
        });
    }
    clamped
}
