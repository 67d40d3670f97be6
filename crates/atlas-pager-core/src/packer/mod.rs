use crate::model::{Frame, Rect};

pub mod node;
pub mod page;

pub use node::{NodeId, NodeState, PackNode, PackTree};
pub use page::AtlasPage;

/// A packer places rectangles into a page.
///
/// Implementations must ensure no overlaps and respect the configured padding.
/// `pack` may return `None` if the rectangle cannot be placed on the current page.
pub trait Packer<K> {
    fn can_pack(&self, rect: &Rect) -> bool;
    fn pack(&mut self, key: K, rect: &Rect) -> Option<Frame<K>>;
}
