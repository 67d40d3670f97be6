//! Core library for paging textures into fixed-size square atlases.
//!
//! - Algorithm: a binary space-partition tree per page; each item takes the first
//!   empty region (depth-first) that fits it, splitting off the axis with more slack
//! - Pipeline: `layout_pages` is pure layout; `pack_images` also composites RGBA pages
//! - Data model is serde-serializable; XML/JSON manifests are provided in `export`.
//!
//! Quick example:
//! ```ignore
//! use atlas_pager_core::{LayoutItem, PackerConfig, layout_pages};
//! # fn main() -> atlas_pager_core::Result<()> {
//! let cfg = PackerConfig::builder().with_page_size(128).with_padding(0, 0).build();
//! let items = vec![LayoutItem::new("a", 64, 64), LayoutItem::new("b", 64, 64)];
//! let pages = layout_pages(items, &cfg)?;
//! assert_eq!(pages.len(), 1);
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `atlas_pager_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{PackerConfig, PackerConfigBuilder, SortOrder};
    pub use crate::error::AtlasPagerError;
    pub use crate::model::{Atlas, Frame, Meta, PackStats, Page, Rect, SplitAxis, SplitPlan};
    pub use crate::packer::{AtlasPage, NodeState, PackTree, Packer};
    pub use crate::pipeline::{LayoutItem, LayoutKey};
    pub use crate::{
        InputImage, OutputPage, PackOutput, layout_pages, pack_images, pack_layout,
        pack_layout_items,
    };
}
