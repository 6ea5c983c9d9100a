//! Shared constants for masking and compositing
//!
//! This module centralizes magic numbers used by the layout generator,
//! the compositor and the PDF backend.

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

/// Upper bound when walking inherited page attributes up the page tree
pub const MAX_PAGE_TREE_DEPTH: usize = 64;

// =============================================================================
// Mask Defaults
// =============================================================================

/// Height of the bottom band for a page entering the workflow
pub const DEFAULT_MASK_BOTTOM_HEIGHT: f32 = 100.0;

/// Width of the left band for a page entering the workflow
pub const DEFAULT_MASK_LEFT_WIDTH: f32 = 0.0;

// =============================================================================
// Initial Layout
// =============================================================================

/// Inset between the top of the bottom band and the first text row
pub const LAYOUT_INSET_TOP: f32 = 8.0;

/// Inset between the last row and the page bottom
pub const LAYOUT_INSET_BOTTOM: f32 = 8.0;

/// Inset on the left and right of the bottom band
pub const LAYOUT_INSET_X: f32 = 12.0;

/// Image slot side as a fraction of the usable height
pub const IMAGE_SLOT_FACTOR: f32 = 0.9;

/// Gap between an image slot and the text columns
pub const IMAGE_TEXT_GAP: f32 = 10.0;

/// Gap between the left and right text columns
pub const COLUMN_GAP: f32 = 16.0;

/// Gap between the landlord and tenant cells of a fee row
pub const FEE_CELL_GAP: f32 = 4.0;

/// Row height as a multiple of the row's font size
pub const LINE_HEIGHT_FACTOR: f32 = 1.35;

/// Mask height at which the base font sizes apply
pub const REFERENCE_MASK_HEIGHT: f32 = 100.0;

/// Company name font size at the reference mask height (points)
pub const LARGE_FONT_BASE: f32 = 16.0;

/// Detail row font size at the reference mask height (points)
pub const SMALL_FONT_BASE: f32 = 10.0;

/// Smallest company name font size regardless of mask height
pub const LARGE_FONT_MIN: f32 = 11.0;

/// Smallest detail row font size regardless of mask height
pub const SMALL_FONT_MIN: f32 = 8.0;

// =============================================================================
// Drawing
// =============================================================================

/// Distance from the block bottom to the text baseline (display units)
pub const DEFAULT_DESCENDER_OFFSET: f32 = 3.0;

/// Resource name for the regular font on output pages
pub const REGULAR_FONT_RESOURCE: &str = "RbF1";

/// Resource name for the bold font on output pages
pub const BOLD_FONT_RESOURCE: &str = "RbF2";

/// Prefix for image XObject resource names on output pages
pub const IMAGE_RESOURCE_PREFIX: &str = "RbIm";

/// Tolerance used when checking that rectangles stay inside a page
pub const GEOMETRY_EPSILON: f32 = 0.01;
