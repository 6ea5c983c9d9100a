//! Display space to PDF space mapping
//!
//! A page stores its content unrotated and declares a `/Rotate` attribute
//! that the viewer applies at render time. Everything the user positions is
//! expressed in display space (top-left origin, y down, at the page's natural
//! size); everything written to the content stream must be in the raw,
//! unrotated PDF frame (bottom-left origin, y up).
//!
//! [`transform_rect`] and [`transform_text_anchor`] spell the four cases out
//! as explicit branches so the edge anchoring of each rotation can be read
//! directly. [`DisplayToPdf`] is the same mapping as one affine matrix; it is
//! used to build the `cm`/`Tm` operands for rotated draws and the branches
//! are tested against it.
//!
//! Edge anchoring, with `W`/`H` the raw width and height:
//!
//! | rotation | display bottom | display left | run direction |
//! |----------|----------------|--------------|---------------|
//! | 0        | raw bottom     | raw left     | 0°            |
//! | 90       | raw left       | raw top      | -90°          |
//! | 180      | raw top        | raw right    | 180°          |
//! | 270      | raw right      | raw bottom   | 90°           |

use super::{Point, Rect};
use crate::types::{PageSize, Rotation};

// =============================================================================
// Explicit Branches
// =============================================================================

/// Map a display-space rectangle to the PDF-space rectangle it covers.
///
/// # Arguments
/// * `rect` - Rectangle in display space at the page's natural size
/// * `rotation` - The page's declared rotation
/// * `raw_width` - Unrotated page width
/// * `raw_height` - Unrotated page height
pub fn transform_rect(rect: &Rect, rotation: Rotation, raw_width: f32, raw_height: f32) -> Rect {
    match rotation {
        // Flip y only.
        Rotation::Deg0 => Rect::new(
            rect.x,
            raw_height - rect.y - rect.height,
            rect.width,
            rect.height,
        ),
        // Display bottom is the raw left edge, display left is the raw top.
        // Display heights become raw widths.
        Rotation::Deg90 => Rect::new(
            raw_width - rect.y - rect.height,
            raw_height - rect.x - rect.width,
            rect.height,
            rect.width,
        ),
        // Display bottom is the raw top edge, display left is the raw right.
        Rotation::Deg180 => Rect::new(
            raw_width - rect.x - rect.width,
            rect.y,
            rect.width,
            rect.height,
        ),
        // Display bottom is the raw right edge, display left is the raw bottom.
        Rotation::Deg270 => Rect::new(rect.y, rect.x, rect.height, rect.width),
    }
}

/// A text anchor in PDF space plus the angle to draw the glyph run at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextAnchor {
    pub x: f32,
    pub y: f32,
    /// Counter-clockwise rotation of the glyph run in PDF space
    pub rotation_degrees: i32,
}

/// Map the start of a text baseline to PDF space.
///
/// `display_x` is the left end of the glyph run and `baseline_y` the
/// baseline, both in display space. The returned angle makes the run read
/// left to right and upright in the viewer.
pub fn transform_text_anchor(
    display_x: f32,
    baseline_y: f32,
    rotation: Rotation,
    raw_width: f32,
    raw_height: f32,
) -> TextAnchor {
    let (x, y, rotation_degrees) = match rotation {
        Rotation::Deg0 => (display_x, raw_height - baseline_y, 0),
        Rotation::Deg90 => (raw_width - baseline_y, raw_height - display_x, -90),
        Rotation::Deg180 => (raw_width - display_x, baseline_y, 180),
        // Display x runs up the raw page here, so the run turns +90.
        Rotation::Deg270 => (baseline_y, display_x, 90),
    };
    TextAnchor {
        x,
        y,
        rotation_degrees,
    }
}

// =============================================================================
// Image Placement
// =============================================================================

/// Operands for drawing an image XObject into a display-space rectangle.
///
/// `width`/`height` are the intrinsic (un-swapped) draw dimensions; the
/// rotation is applied around `(x, y)`, which is the PDF-space position of
/// the image's own bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation_degrees: i32,
}

impl ImagePlacement {
    /// The `cm` matrix mapping the image unit square onto the page
    pub fn matrix(&self) -> [f32; 6] {
        let (cos, sin) = quarter_turn(self.rotation_degrees);
        [
            self.width * cos,
            self.width * sin,
            -self.height * sin,
            self.height * cos,
            self.x,
            self.y,
        ]
    }
}

/// Compute where and how to draw an image block.
///
/// The backend expects the image's intrinsic size plus a rotation, so on a
/// quarter-turned page the PDF-space width and height are swapped back
/// before the rotated draw is emitted.
pub fn image_placement(
    rect: &Rect,
    rotation: Rotation,
    raw_width: f32,
    raw_height: f32,
) -> ImagePlacement {
    let pdf = transform_rect(rect, rotation, raw_width, raw_height);
    let (width, height) = if rotation.swaps_axes() {
        (pdf.height, pdf.width)
    } else {
        (pdf.width, pdf.height)
    };
    // The image's bottom-left corner as seen in the viewer.
    let origin = DisplayToPdf::new(rotation, PageSize::new(raw_width, raw_height))
        .apply(Point::new(rect.x, rect.bottom()));
    let anchor = transform_text_anchor(rect.x, rect.bottom(), rotation, raw_width, raw_height);

    ImagePlacement {
        x: origin.x,
        y: origin.y,
        width,
        height,
        rotation_degrees: anchor.rotation_degrees,
    }
}

/// Exact cosine and sine for the quarter turns used on page
fn quarter_turn(degrees: i32) -> (f32, f32) {
    match degrees.rem_euclid(360) {
        90 => (0.0, 1.0),
        180 => (-1.0, 0.0),
        270 => (0.0, -1.0),
        _ => (1.0, 0.0),
    }
}

// =============================================================================
// Affine Primitive
// =============================================================================

/// The display-to-PDF mapping as an affine matrix.
///
/// Maps `(x, y)` to `(a·x + c·y + e, b·x + d·y + f)`, the same layout as a
/// PDF `cm` operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayToPdf {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl DisplayToPdf {
    pub fn new(rotation: Rotation, raw: PageSize) -> Self {
        let (w, h) = (raw.raw_width, raw.raw_height);
        let (a, b, c, d, e, f) = match rotation {
            Rotation::Deg0 => (1.0, 0.0, 0.0, -1.0, 0.0, h),
            Rotation::Deg90 => (0.0, -1.0, -1.0, 0.0, w, h),
            Rotation::Deg180 => (-1.0, 0.0, 0.0, 1.0, w, 0.0),
            Rotation::Deg270 => (0.0, 1.0, 1.0, 0.0, 0.0, 0.0),
        };
        Self { a, b, c, d, e, f }
    }

    pub fn apply(&self, p: Point) -> Point {
        let v = self.apply_vector(p);
        Point::new(v.x + self.e, v.y + self.f)
    }

    /// Apply the linear part only
    pub fn apply_vector(&self, v: Point) -> Point {
        Point::new(self.a * v.x + self.c * v.y, self.b * v.x + self.d * v.y)
    }

    /// Bounding rectangle of the mapped corners
    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        let p0 = self.apply(Point::new(rect.x, rect.y));
        let p1 = self.apply(Point::new(rect.right(), rect.bottom()));
        let x = p0.x.min(p1.x);
        let y = p0.y.min(p1.y);
        Rect::new(x, y, (p1.x - p0.x).abs(), (p1.y - p0.y).abs())
    }

    /// Counter-clockwise angle of the display x axis in PDF space
    pub fn run_angle(&self) -> i32 {
        let dir = self.apply_vector(Point::new(1.0, 0.0));
        match (dir.x.round() as i32, dir.y.round() as i32) {
            (0, 1) => 90,
            (-1, 0) => 180,
            (0, -1) => -90,
            _ => 0,
        }
    }

    /// `Tm` operand drawing an upright glyph run starting at `anchor`
    pub fn text_matrix(&self, anchor: &TextAnchor) -> [f32; 6] {
        // Run direction and the display "up" direction, in PDF space.
        let run = self.apply_vector(Point::new(1.0, 0.0));
        let up = self.apply_vector(Point::new(0.0, -1.0));
        [run.x, run.y, up.x, up.y, anchor.x, anchor.y]
    }
}
