use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Axis along which a region is divided.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SplitAxis {
    /// Cut across the x axis: left and right children.
    X,
    /// Cut across the y axis: top and bottom children.
    Y,
}

/// Where a region is divided. `offset` is the size of the first child along `axis`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SplitPlan {
    pub axis: SplitAxis,
    pub offset: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    /// Inclusive right edge coordinate (`x + w - 1`).
    pub fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
    /// Inclusive bottom edge coordinate (`y + h - 1`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
    /// Returns true if `r` is fully inside `self` (inclusive edges).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        let a_x2 = self.x as u64 + self.w as u64;
        let a_y2 = self.y as u64 + self.h as u64;
        let b_x2 = r.x as u64 + r.w as u64;
        let b_y2 = r.y as u64 + r.h as u64;
        !((self.x as u64) >= b_x2
            || (r.x as u64) >= a_x2
            || (self.y as u64) >= b_y2
            || (r.y as u64) >= a_y2)
    }

    pub fn can_fit(&self, w: u32, h: u32) -> bool {
        w <= self.w && h <= self.h
    }

    /// Picks how to divide this region so that a `w x h` item fits the first child.
    ///
    /// The axis with more leftover space is cut, so the first child matches the item
    /// exactly along that axis. Equal leftovers cut on Y. Returns `None` when the item
    /// does not fit at all.
    pub fn choose_split(&self, w: u32, h: u32) -> Option<SplitPlan> {
        if !self.can_fit(w, h) {
            return None;
        }
        let leftover_w = self.w - w;
        let leftover_h = self.h - h;
        if leftover_w > leftover_h {
            Some(SplitPlan {
                axis: SplitAxis::X,
                offset: w,
            })
        } else {
            Some(SplitPlan {
                axis: SplitAxis::Y,
                offset: h,
            })
        }
    }

    /// Divides this region into two rectangles that exactly cover it.
    pub fn apply_split(&self, plan: SplitPlan) -> (Rect, Rect) {
        match plan.axis {
            SplitAxis::X => (
                Rect::new(self.x, self.y, plan.offset, self.h),
                Rect::new(self.x + plan.offset, self.y, self.w - plan.offset, self.h),
            ),
            SplitAxis::Y => (
                Rect::new(self.x, self.y, self.w, plan.offset),
                Rect::new(self.x, self.y + plan.offset, self.w, self.h - plan.offset),
            ),
        }
    }
}

/// A placed frame within a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Frame<K = String> {
    /// User-specified key (e.g., filename or asset path).
    pub key: K,
    /// Content rectangle within the page: top-left already offset by padding,
    /// unpadded width/height.
    pub frame: Rect,
}

/// A single atlas page (logical record).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<K = String> {
    pub id: usize,
    pub width: u32,
    pub height: u32,
    pub frames: Vec<Frame<K>>,
}

/// Atlas-level metadata (common fields used by exporters).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    /// Schema version for JSON metadata; current: "1".
    pub schema_version: String,
    pub app: String,
    pub version: String,
    pub format: String,
    pub page_size: (u32, u32),
    pub padding: (u32, u32),
    pub sort_order: String,
}

/// Atlas of pages and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atlas<K = String> {
    pub pages: Vec<Page<K>>,
    pub meta: Meta,
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    /// Total number of pages in the atlas.
    pub num_pages: usize,
    /// Total number of frames (textures) packed.
    pub num_frames: usize,
    /// Total area of all pages (sum of width * height for each page).
    pub total_page_area: u64,
    /// Total area used by all frames, padding excluded.
    pub used_frame_area: u64,
    /// Occupancy ratio: used_frame_area / total_page_area (0.0 to 1.0).
    pub occupancy: f64,
}

impl<K> Atlas<K> {
    /// Computes packing statistics for this atlas.
    pub fn stats(&self) -> PackStats {
        let num_pages = self.pages.len();
        let mut num_frames = 0;
        let mut total_page_area = 0u64;
        let mut used_frame_area = 0u64;

        for page in &self.pages {
            total_page_area += (page.width as u64) * (page.height as u64);
            for frame in &page.frames {
                num_frames += 1;
                used_frame_area += frame.frame.area();
            }
        }

        let occupancy = if total_page_area > 0 {
            used_frame_area as f64 / total_page_area as f64
        } else {
            0.0
        };

        PackStats {
            num_pages,
            num_frames,
            total_page_area,
            used_frame_area,
            occupancy,
        }
    }
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Pages: {}, Frames: {}, Occupancy: {:.2}%, Total Area: {} px², Used Area: {} px²",
            self.num_pages,
            self.num_frames,
            self.occupancy * 100.0,
            self.total_page_area,
            self.used_frame_area,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.total_page_area.saturating_sub(self.used_frame_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.total_page_area > 0 {
            (self.wasted_area() as f64 / self.total_page_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
