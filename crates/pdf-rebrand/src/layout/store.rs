use super::{Block, BlockId};
use crate::geometry::Rect;
use crate::types::*;
use std::collections::BTreeMap;

/// Per-page block arena keyed by [`BlockId`].
///
/// Ids are never reused within a store; iteration follows id order, which
/// is also draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockStore {
    blocks: BTreeMap<BlockId, Block>,
    next_id: u32,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing blocks, keeping their ids.
    ///
    /// A later block with a duplicate id replaces the earlier one.
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut store = Self::new();
        for block in blocks {
            store.next_id = store.next_id.max(block.id().0);
            store.blocks.insert(block.id(), block);
        }
        store
    }

    /// Insert a block under a fresh id and return that id
    pub fn insert(&mut self, mut block: Block) -> BlockId {
        self.next_id += 1;
        let id = BlockId(self.next_id);
        block.set_id(id);
        self.blocks.insert(id, block);
        id
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(&id)
    }

    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        self.blocks.remove(&id)
    }

    /// Move a block's top-left corner
    pub fn move_to(&mut self, id: BlockId, x: f32, y: f32) -> Result<()> {
        let rect = self.rect_mut(id)?;
        rect.x = x;
        rect.y = y;
        Ok(())
    }

    /// Change a block's size, keeping its top-left corner
    pub fn resize(&mut self, id: BlockId, width: f32, height: f32) -> Result<()> {
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            return Err(RebrandError::InvalidBlock {
                id: id.0,
                reason: format!("size {}x{} is not a valid extent", width, height),
            });
        }
        let rect = self.rect_mut(id)?;
        rect.width = width;
        rect.height = height;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Check every block has a finite rect with non-negative extent lying
    /// inside the display bounds
    pub fn validate(&self, display: DisplaySize) -> Result<()> {
        validate_blocks(self.iter(), display)
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks.into_values().collect()
    }

    fn rect_mut(&mut self, id: BlockId) -> Result<&mut Rect> {
        self.blocks
            .get_mut(&id)
            .map(Block::rect_mut)
            .ok_or_else(|| RebrandError::InvalidBlock {
                id: id.0,
                reason: "no such block".to_string(),
            })
    }
}

/// Check blocks against the display rectangle they were authored in.
///
/// Fails with [`RebrandError::InvalidBlock`] on the first block whose rect
/// is not finite, has negative extent or leaves the page, or whose font
/// size is not positive.
pub fn validate_blocks<'a>(
    blocks: impl IntoIterator<Item = &'a Block>,
    display: DisplaySize,
) -> Result<()> {
    let page = Rect::from_size(display);
    for block in blocks {
        let rect = block.rect();
        let reason = if !rect.is_finite() {
            Some("rect is not finite".to_string())
        } else if rect.width < 0.0 || rect.height < 0.0 {
            Some("rect has negative extent".to_string())
        } else if !page.contains(rect) {
            Some(format!(
                "rect {:?} lies outside the {}x{} page",
                rect, display.width, display.height
            ))
        } else if let Some(text) = block.as_text() {
            (!text.font_size.is_finite() || text.font_size <= 0.0)
                .then(|| format!("font size {} is not positive", text.font_size))
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(RebrandError::InvalidBlock {
                id: block.id().0,
                reason,
            });
        }
    }
    Ok(())
}
