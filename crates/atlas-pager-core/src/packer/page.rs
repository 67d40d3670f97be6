use super::Packer;
use super::node::{NodeId, NodeState, PackTree};
use crate::config::PackerConfig;
use crate::model::{Frame, Page, Rect};

/// One fixed-size page owning a pack tree rooted at `{0, 0, width, height}`.
#[derive(Debug, Clone)]
pub struct AtlasPage<K = String> {
    width: u32,
    height: u32,
    pad: (u32, u32),
    tree: PackTree<K>,
}

impl<K: Clone> AtlasPage<K> {
    pub fn new(width: u32, height: u32, pad: (u32, u32)) -> Self {
        Self {
            width,
            height,
            pad,
            tree: PackTree::new(Rect::new(0, 0, width, height)),
        }
    }

    /// Page sized and padded per `cfg`.
    pub fn from_config(cfg: &PackerConfig) -> Self {
        Self::new(cfg.page_width, cfg.page_height, cfg.padding())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn padding(&self) -> (u32, u32) {
        self.pad
    }

    pub fn tree(&self) -> &PackTree<K> {
        &self.tree
    }

    /// Tries to place `key` (unpadded `w x h`); false means "try another page".
    pub fn try_place(&mut self, key: &K, w: u32, h: u32) -> bool {
        self.place(key, w, h).is_some()
    }

    /// Same as [`AtlasPage::try_place`] but returns the occupied node.
    pub fn place(&mut self, key: &K, w: u32, h: u32) -> Option<NodeId> {
        self.tree.insert(key, w, h, self.pad)
    }

    /// Whether [`AtlasPage::try_place`] would succeed, without changing the page.
    pub fn can_place(&self, w: u32, h: u32) -> bool {
        self.tree.fits(w, h, self.pad)
    }

    /// Placed frames in depth-first tree order.
    pub fn frames(&self) -> impl Iterator<Item = &Frame<K>> {
        self.tree.frames()
    }

    /// Logical record of this page with id `id`.
    pub fn to_page(&self, id: usize) -> Page<K> {
        Page {
            id,
            width: self.width,
            height: self.height,
            frames: self.frames().cloned().collect(),
        }
    }
}

impl<K: Clone> Packer<K> for AtlasPage<K> {
    fn can_pack(&self, rect: &Rect) -> bool {
        self.can_place(rect.w, rect.h)
    }

    fn pack(&mut self, key: K, rect: &Rect) -> Option<Frame<K>> {
        let id = self.place(&key, rect.w, rect.h)?;
        match &self.tree.node(id).state {
            NodeState::Occupied(frame) => Some(frame.clone()),
            _ => None,
        }
    }
}
