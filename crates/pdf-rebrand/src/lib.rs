pub mod compose;
mod constants;
mod diagnostics;
pub mod geometry;
pub mod layout;
mod options;
mod profile;
mod render;
mod types;

pub use compose::{
    PreparedPage, compose, compose_sync, fill_profile_images, inspect_pages, load_fonts, load_image,
    load_images, load_pdf_bytes, prepare_page, prepare_page_with_mask, save_pdf_bytes,
};
pub use diagnostics::*;
pub use geometry::{
    DisplayToPdf, ImagePlacement, MaskRects, Point, Rect, TextAnchor, compute_mask_rects,
    image_placement, transform_rect, transform_text_anchor,
};
pub use layout::{
    Block, BlockId, BlockStore, FontWeight, ImageBlock, TextAlign, TextBlock,
    generate_initial_blocks, validate_blocks,
};
pub use options::*;
pub use profile::*;
pub use render::PageGeometry;
pub use types::*;
