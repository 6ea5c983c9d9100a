//! Block data types
//!
//! Every position is in display space, anchored top-left with y growing
//! downward, in the same frame as the page's mask settings.

use crate::geometry::Rect;
use crate::profile::{ImageField, TextField};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque block identifier, unique within a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A text placeholder filled from a profile field
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextBlock {
    pub id: BlockId,
    pub field: TextField,
    pub rect: Rect,
    pub font_size: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub font_weight: FontWeight,
    #[cfg_attr(feature = "serde", serde(default))]
    pub text_align: TextAlign,
}

/// An image placeholder filled from a profile image
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageBlock {
    pub id: BlockId,
    pub field: ImageField,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Block {
    Text(TextBlock),
    Image(ImageBlock),
}

impl Block {
    pub fn id(&self) -> BlockId {
        match self {
            Block::Text(b) => b.id,
            Block::Image(b) => b.id,
        }
    }

    pub fn rect(&self) -> &Rect {
        match self {
            Block::Text(b) => &b.rect,
            Block::Image(b) => &b.rect,
        }
    }

    pub fn rect_mut(&mut self) -> &mut Rect {
        match self {
            Block::Text(b) => &mut b.rect,
            Block::Image(b) => &mut b.rect,
        }
    }

    pub(crate) fn set_id(&mut self, id: BlockId) {
        match self {
            Block::Text(b) => b.id = id,
            Block::Image(b) => b.id = id,
        }
    }

    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Block::Text(b) => Some(b),
            Block::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageBlock> {
        match self {
            Block::Image(b) => Some(b),
            Block::Text(_) => None,
        }
    }
}
