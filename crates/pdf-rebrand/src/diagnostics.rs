use crate::geometry::Rect;
use crate::layout::BlockId;
use crate::profile::{ImageField, TextField};
use crate::types::{PageSize, Rotation};
use std::fmt;

/// Which mask extent a clamp applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MaskEdge {
    Bottom,
    Left,
}

/// Recoverable conditions collected while composing
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Warning {
    /// A mask extent exceeded the page (or was negative) and was clamped
    MaskOutOfBounds {
        edge: MaskEdge,
        requested: f32,
        clamped: f32,
    },
    /// An image block's source could not be fetched; the block was skipped
    ImageMissing {
        block: BlockId,
        field: ImageField,
        key: String,
    },
    /// Characters with no glyph in the embedded font were drawn as .notdef
    GlyphMissing {
        block: BlockId,
        field: TextField,
        chars: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MaskOutOfBounds {
                edge,
                requested,
                clamped,
            } => write!(
                f,
                "{:?} mask extent {} exceeds the page, clamped to {}",
                edge, requested, clamped
            ),
            Warning::ImageMissing { block, field, key } => {
                write!(f, "{:?} image {} is missing, block {} skipped", field, key, block)
            }
            Warning::GlyphMissing {
                block,
                field,
                chars,
            } => write!(
                f,
                "{:?} block {} uses characters missing from the font: {}",
                field, block, chars
            ),
        }
    }
}

/// What the compositor did with one output page
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageLog {
    /// Index of the page in the output document
    pub page_index: usize,
    /// Index of the source document it came from
    pub source_index: usize,
    /// 1-based page number within the source document
    pub page_number: u32,
    pub raw_size: PageSize,
    pub rotation: Rotation,
    /// Natural display width over the width the blocks were authored at
    pub scale_ratio: f32,
    /// Mask rectangles in display space at natural size
    pub mask_rects_display: Vec<Rect>,
    /// The same rectangles as drawn, in PDF space
    pub mask_rects_pdf: Vec<Rect>,
    pub text_blocks_drawn: usize,
    pub image_blocks_drawn: usize,
    /// Blocks with no content to draw
    pub blocks_skipped: usize,
    pub warnings: Vec<Warning>,
}

impl PageLog {
    pub fn blocks_drawn(&self) -> usize {
        self.text_blocks_drawn + self.image_blocks_drawn
    }
}

/// Output of a composition: the merged PDF plus the per-page log
#[derive(Debug, Clone)]
pub struct CompositionResult {
    pub bytes: Vec<u8>,
    pub pages: Vec<PageLog>,
}

impl CompositionResult {
    /// Every recoverable condition, in page order
    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.pages.iter().flat_map(|page| page.warnings.iter())
    }
}
