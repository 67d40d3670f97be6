use crate::compositing::blit_rgba;
use crate::config::{PackerConfig, SortOrder};
use crate::error::{AtlasPagerError, Result};
use crate::model::{Atlas, Frame, Meta, Page};
use crate::packer::AtlasPage;
use crate::packer::node::padded_size;
use image::{DynamicImage, RgbaImage};
use std::cmp::Reverse;
use std::fmt;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use crate::{model::Rect, packer::Packer};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// In-memory image to pack (key + decoded image).
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

/// Output RGBA page and its logical page record.
pub struct OutputPage {
    pub page: Page,
    pub rgba: RgbaImage,
}

/// Output of a packing run: atlas metadata and RGBA pages.
pub struct PackOutput {
    pub atlas: Atlas,
    pub pages: Vec<OutputPage>,
}

impl PackOutput {
    /// Computes packing statistics for this output.
    /// This is a convenience method that delegates to `atlas.stats()`.
    pub fn stats(&self) -> crate::model::PackStats {
        self.atlas.stats()
    }
}

/// One item to lay out: an opaque key and its unpadded size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutItem<K = String> {
    pub key: K,
    pub w: u32,
    pub h: u32,
}

impl<K> LayoutItem<K> {
    pub fn new(key: K, w: u32, h: u32) -> Self {
        Self { key, w, h }
    }
}

/// Bounds on item keys accepted by [`layout_pages`].
///
/// With the `parallel` feature pages are searched from several threads, so keys must
/// also be `Sync`.
#[cfg(feature = "parallel")]
pub trait LayoutKey: Clone + ToString + Sync {}
#[cfg(feature = "parallel")]
impl<T: Clone + ToString + Sync> LayoutKey for T {}

/// Bounds on item keys accepted by [`layout_pages`].
///
/// With the `parallel` feature pages are searched from several threads, so keys must
/// also be `Sync`.
#[cfg(not(feature = "parallel"))]
pub trait LayoutKey: Clone + ToString {}
#[cfg(not(feature = "parallel"))]
impl<T: Clone + ToString> LayoutKey for T {}

/// Lays `items` out across as many pages as needed.
///
/// Items are first ordered by `cfg.sort_order` (stable; `AreaDesc` by default, so
/// equal areas keep their input order). With `SortOrder::None` the caller's order is
/// used as-is and should already be largest-first for dense pages.
///
/// Each item goes to the first existing page, in creation order, that can hold it;
/// otherwise a new page is opened. Nothing is moved once placed.
///
/// Fails before placing anything if an item is zero-sized or too large for an empty
/// page once padded.
#[instrument(skip_all, fields(items = items.len()))]
pub fn layout_pages<K>(items: Vec<LayoutItem<K>>, cfg: &PackerConfig) -> Result<Vec<AtlasPage<K>>>
where
    K: LayoutKey,
{
    cfg.validate()?;
    for item in &items {
        check_item(item, cfg)?;
    }

    let mut items = items;
    sort_items(&mut items, cfg.sort_order);

    let mut pages: Vec<AtlasPage<K>> = Vec::new();
    for item in &items {
        if place_on_existing(&mut pages, item, cfg) {
            continue;
        }
        let mut page = AtlasPage::from_config(cfg);
        if !page.try_place(&item.key, item.w, item.h) {
            return Err(oversized(item, cfg));
        }
        debug!(page = pages.len(), key = %item.key.to_string(), "opened page");
        pages.push(page);
    }
    debug!(pages = pages.len(), "layout finished");
    Ok(pages)
}

fn place_on_existing<K>(pages: &mut [AtlasPage<K>], item: &LayoutItem<K>, cfg: &PackerConfig) -> bool
where
    K: LayoutKey,
{
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            let rect = Rect::new(0, 0, item.w, item.h);
            return match pages.par_iter().position_first(|p| p.can_pack(&rect)) {
                Some(idx) => pages[idx].try_place(&item.key, item.w, item.h),
                None => false,
            };
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = cfg;

    pages
        .iter_mut()
        .any(|p| p.try_place(&item.key, item.w, item.h))
}

fn check_item<K: ToString>(item: &LayoutItem<K>, cfg: &PackerConfig) -> Result<()> {
    if item.w == 0 || item.h == 0 {
        return Err(AtlasPagerError::DegenerateItem {
            key: item.key.to_string(),
            width: item.w,
            height: item.h,
        });
    }
    match padded_size(item.w, item.h, cfg.padding()) {
        Some((pw, ph)) if pw <= cfg.page_width && ph <= cfg.page_height => Ok(()),
        _ => Err(oversized(item, cfg)),
    }
}

fn oversized<K: ToString>(item: &LayoutItem<K>, cfg: &PackerConfig) -> AtlasPagerError {
    let (width, height) =
        padded_size(item.w, item.h, cfg.padding()).unwrap_or((u32::MAX, u32::MAX));
    AtlasPagerError::OversizedItem {
        key: item.key.to_string(),
        width,
        height,
        page_width: cfg.page_width,
        page_height: cfg.page_height,
    }
}

fn sort_items<K>(items: &mut [LayoutItem<K>], order: SortOrder) {
    match order {
        SortOrder::None => {}
        SortOrder::AreaDesc => items.sort_by_key(|it| Reverse(it.w as u64 * it.h as u64)),
        SortOrder::MaxSideDesc => items.sort_by_key(|it| Reverse(it.w.max(it.h))),
        SortOrder::HeightDesc => items.sort_by_key(|it| Reverse(it.h)),
        SortOrder::WidthDesc => items.sort_by_key(|it| Reverse(it.w)),
    }
}

// ---------------- Layout-only API ----------------

/// Packs sizes into pages without compositing pixel data.
/// Inputs are (key, width, height). Returns an Atlas with pages and frames; no RGBA pages.
pub fn pack_layout<K: Into<String>>(
    inputs: Vec<(K, u32, u32)>,
    cfg: PackerConfig,
) -> Result<Atlas<String>> {
    let items = inputs
        .into_iter()
        .map(|(k, w, h)| LayoutItem::new(k, w, h))
        .collect();
    pack_layout_items(items, cfg)
}

/// Packs layout-only items into pages and returns their records.
#[instrument(skip_all)]
pub fn pack_layout_items<K: Into<String>>(
    items: Vec<LayoutItem<K>>,
    cfg: PackerConfig,
) -> Result<Atlas<String>> {
    cfg.validate()?;

    if items.is_empty() {
        return Err(AtlasPagerError::Empty);
    }
    let items: Vec<LayoutItem<String>> = items
        .into_iter()
        .map(|it| LayoutItem::new(it.key.into(), it.w, it.h))
        .collect();
    let pages = layout_pages(items, &cfg)?;
    Ok(Atlas {
        pages: pages
            .iter()
            .enumerate()
            .map(|(id, p)| p.to_page(id))
            .collect(),
        meta: build_meta(&cfg),
    })
}

// ---------------- Compositing API ----------------

/// Key used while laying out decoded images: the input index plus its name.
#[derive(Debug, Clone)]
struct SourceRef {
    index: usize,
    key: String,
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

#[instrument(skip_all)]
/// Packs `inputs` into pages using configuration `cfg` and returns metadata and RGBA pages.
///
/// Every page canvas is exactly `page_width x page_height`; each image is copied to
/// its region origin offset by the padding.
pub fn pack_images(inputs: Vec<InputImage>, cfg: PackerConfig) -> Result<PackOutput> {
    cfg.validate()?;

    if inputs.is_empty() {
        return Err(AtlasPagerError::Empty);
    }

    let items: Vec<LayoutItem<SourceRef>> = inputs
        .iter()
        .enumerate()
        .map(|(index, inp)| {
            let key = SourceRef {
                index,
                key: inp.key.clone(),
            };
            LayoutItem::new(key, inp.image.width(), inp.image.height())
        })
        .collect();
    let layout = layout_pages(items, &cfg)?;

    let mut pages: Vec<OutputPage> = Vec::with_capacity(layout.len());
    let mut atlas_pages: Vec<Page> = Vec::with_capacity(layout.len());
    for (id, atlas_page) in layout.iter().enumerate() {
        let mut canvas = RgbaImage::new(atlas_page.width(), atlas_page.height());
        let mut frames: Vec<Frame> = Vec::new();
        for f in atlas_page.frames() {
            let src = inputs[f.key.index].image.to_rgba8();
            blit_rgba(&src, &mut canvas, f.frame.x, f.frame.y, cfg.outlines);
            frames.push(Frame {
                key: f.key.key.clone(),
                frame: f.frame,
            });
        }
        debug!(page = id, frames = frames.len(), "composited page");
        let page = Page {
            id,
            width: atlas_page.width(),
            height: atlas_page.height(),
            frames,
        };
        pages.push(OutputPage {
            page: page.clone(),
            rgba: canvas,
        });
        atlas_pages.push(page);
    }

    let atlas = Atlas {
        pages: atlas_pages,
        meta: build_meta(&cfg),
    };
    Ok(PackOutput { atlas, pages })
}

fn build_meta(cfg: &PackerConfig) -> Meta {
    Meta {
        schema_version: "1".into(),
        app: "atlas-pager".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        format: "RGBA8888".into(),
        page_size: (cfg.page_width, cfg.page_height),
        padding: cfg.padding(),
        sort_order: cfg.sort_order.as_str().into(),
    }
}
