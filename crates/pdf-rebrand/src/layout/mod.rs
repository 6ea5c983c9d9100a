//! Block layout for the masked area
//!
//! - Block types (text and image placeholders in display space)
//! - The per-page block store the editing surface mutates
//! - The initial layout generated when a page enters the workflow

mod blocks;
mod generator;
mod store;

pub use blocks::*;
pub use generator::*;
pub use store::*;
