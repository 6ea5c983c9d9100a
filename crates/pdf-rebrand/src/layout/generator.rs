//! Initial block layout
//!
//! The generator fills the bottom mask band with one block per identity
//! field: optional square image slots at either end, and two text columns
//! between them. It runs once per page, when the page's natural size is
//! first known; later edits go through the [`BlockStore`](super::BlockStore).

use super::{Block, BlockId, FontWeight, ImageBlock, TextAlign, TextBlock};
use crate::constants::*;
use crate::geometry::{MaskRects, Rect};
use crate::profile::{ImageField, ResolvedProfile, TextField};
use crate::types::DisplaySize;

/// One line of a text column
enum Row {
    Single {
        field: TextField,
        font_size: f32,
        font_weight: FontWeight,
    },
    /// Landlord/tenant pair sharing one line in two half-width cells
    Pair {
        left: TextField,
        right: TextField,
        font_size: f32,
    },
}

impl Row {
    fn font_size(&self) -> f32 {
        match self {
            Row::Single { font_size, .. } | Row::Pair { font_size, .. } => *font_size,
        }
    }
}

/// Sequential ids for a single generator call
#[derive(Default)]
struct IdSequence(u32);

impl IdSequence {
    fn next(&mut self) -> BlockId {
        self.0 += 1;
        BlockId(self.0)
    }
}

/// Generate the initial, non-overlapping blocks for a page's mask band.
///
/// Every block lies inside `mask.bottom`. The output depends only on the
/// inputs; ids run from 1 in emission order.
///
/// # Arguments
/// * `display` - The page's natural display size
/// * `mask` - Mask rectangles computed for that size
/// * `profile` - Identity values; presence of the logo, QR and fee values
///   decides which blocks exist
pub fn generate_initial_blocks(
    display: DisplaySize,
    mask: &MaskRects,
    profile: &ResolvedProfile,
) -> Vec<Block> {
    let mut ids = IdSequence::default();
    let mut blocks = Vec::new();

    let band = clip_to_page(&mask.bottom, display);
    let usable = band.inset(LAYOUT_INSET_TOP, LAYOUT_INSET_X, LAYOUT_INSET_BOTTOM, LAYOUT_INSET_X);
    if usable.area() <= 0.0 {
        return blocks;
    }

    let (large, small) = font_sizes(band.height);

    // Image slots
    let has_logo = profile.logo.is_some();
    let has_qr = profile.line_qr.is_some();
    let slot_count = has_logo as u8 + has_qr as u8;
    let side = if slot_count == 0 {
        0.0
    } else {
        usable
            .height
            .min(usable.height * IMAGE_SLOT_FACTOR)
            .min(usable.width / slot_count as f32)
    };
    let slot_y = usable.y + (usable.height - side) / 2.0;

    let mut text_left = usable.x;
    let mut text_right = usable.right();

    if has_logo && side > 0.0 {
        blocks.push(Block::Image(ImageBlock {
            id: ids.next(),
            field: ImageField::Logo,
            rect: Rect::new(usable.x, slot_y, side, side),
        }));
        text_left += side + IMAGE_TEXT_GAP;
    }
    if has_qr && side > 0.0 {
        blocks.push(Block::Image(ImageBlock {
            id: ids.next(),
            field: ImageField::LineQr,
            rect: Rect::new(usable.right() - side, slot_y, side, side),
        }));
        text_right -= side + IMAGE_TEXT_GAP;
    }

    // Text columns
    let column_width = (text_right - text_left - COLUMN_GAP) / 2.0;
    if column_width <= 0.0 {
        return blocks;
    }

    let mut left_rows = vec![
        Row::Single {
            field: TextField::CompanyName,
            font_size: large,
            font_weight: FontWeight::Bold,
        },
        Row::Single {
            field: TextField::LicenseNumber,
            font_size: small,
            font_weight: FontWeight::Normal,
        },
    ];
    // One check gates each landlord/tenant pair.
    if profile.fee_ratio_landlord.is_some() {
        left_rows.push(Row::Pair {
            left: TextField::FeeRatioLandlord,
            right: TextField::FeeRatioTenant,
            font_size: small,
        });
    }
    if profile.fee_distribution_landlord.is_some() {
        left_rows.push(Row::Pair {
            left: TextField::FeeDistributionLandlord,
            right: TextField::FeeDistributionTenant,
            font_size: small,
        });
    }

    let right_rows: Vec<Row> = [TextField::Address, TextField::Phone, TextField::Email]
        .into_iter()
        .map(|field| Row::Single {
            field,
            font_size: small,
            font_weight: FontWeight::Normal,
        })
        .collect();

    let column = Rect::new(text_left, usable.y, column_width, usable.height);
    place_column(&left_rows, &column, &mut ids, &mut blocks);

    let column = Rect::new(
        text_left + column_width + COLUMN_GAP,
        usable.y,
        column_width,
        usable.height,
    );
    place_column(&right_rows, &column, &mut ids, &mut blocks);

    blocks
}

/// Company name and detail font sizes for a band height
pub(crate) fn font_sizes(band_height: f32) -> (f32, f32) {
    let ratio = band_height / REFERENCE_MASK_HEIGHT;
    (
        (LARGE_FONT_BASE * ratio).max(LARGE_FONT_MIN),
        (SMALL_FONT_BASE * ratio).max(SMALL_FONT_MIN),
    )
}

/// Stack rows top-down, compressing them when they overflow the column
fn place_column(rows: &[Row], column: &Rect, ids: &mut IdSequence, blocks: &mut Vec<Block>) {
    let natural: f32 = rows.iter().map(|r| r.font_size() * LINE_HEIGHT_FACTOR).sum();
    if natural <= 0.0 {
        return;
    }
    let fit = (column.height / natural).min(1.0);

    let mut y = column.y;
    for row in rows {
        let height = row.font_size() * LINE_HEIGHT_FACTOR * fit;
        match *row {
            Row::Single {
                field,
                font_size,
                font_weight,
            } => {
                blocks.push(text_block(
                    ids.next(),
                    field,
                    Rect::new(column.x, y, column.width, height),
                    font_size,
                    font_weight,
                ));
            }
            Row::Pair {
                left,
                right,
                font_size,
            } => {
                let cell_width = ((column.width - FEE_CELL_GAP) / 2.0).max(0.0);
                blocks.push(text_block(
                    ids.next(),
                    left,
                    Rect::new(column.x, y, cell_width, height),
                    font_size,
                    FontWeight::Normal,
                ));
                blocks.push(text_block(
                    ids.next(),
                    right,
                    Rect::new(column.right() - cell_width, y, cell_width, height),
                    font_size,
                    FontWeight::Normal,
                ));
            }
        }
        y += height;
    }
}

fn text_block(
    id: BlockId,
    field: TextField,
    rect: Rect,
    font_size: f32,
    font_weight: FontWeight,
) -> Block {
    Block::Text(TextBlock {
        id,
        field,
        rect,
        font_size,
        font_weight,
        text_align: TextAlign::Left,
    })
}

fn clip_to_page(rect: &Rect, display: DisplaySize) -> Rect {
    let x = rect.x.clamp(0.0, display.width);
    let y = rect.y.clamp(0.0, display.height);
    let right = rect.right().clamp(x, display.width);
    let bottom = rect.bottom().clamp(y, display.height);
    Rect::new(x, y, right - x, bottom - y)
}
