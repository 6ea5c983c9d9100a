//! Geometry for masking and compositing
//!
//! This module handles all the coordinate work between the editing view and
//! the PDF content stream:
//! - Rectangle and point value types
//! - Display space to PDF space mapping for each page rotation
//! - Mask band calculation (bottom band, optional left strip)

mod mask;
mod rotation;
mod types;

pub use mask::*;
pub use rotation::*;
pub use types::*;
