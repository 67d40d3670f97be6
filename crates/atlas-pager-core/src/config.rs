use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Orders applied to items before layout.
///
/// Larger items should claim fresh, unfragmented space first, so `AreaDesc` is the
/// default. `None` keeps the caller's order untouched; a poorly ordered input packs
/// less densely but never produces overlapping output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    AreaDesc,
    MaxSideDesc,
    HeightDesc,
    WidthDesc,
    None,
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "area_desc" => Ok(Self::AreaDesc),
            "max_side_desc" => Ok(Self::MaxSideDesc),
            "height_desc" => Ok(Self::HeightDesc),
            "width_desc" => Ok(Self::WidthDesc),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AreaDesc => "area_desc",
            Self::MaxSideDesc => "max_side_desc",
            Self::HeightDesc => "height_desc",
            Self::WidthDesc => "width_desc",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Page width in pixels.
    pub page_width: u32,
    /// Page height in pixels. Pages are square, so this must equal `page_width`.
    pub page_height: u32,
    /// Pixels added on the left and right of every item.
    pub pad_x: u32,
    /// Pixels added above and below every item.
    pub pad_y: u32,

    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,
    /// Draw red outlines around composited items (debug).
    #[serde(default)]
    pub outlines: bool,
    /// Probe existing pages in parallel when feature "parallel" is on.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            page_width: 1024,
            page_height: 1024,
            pad_x: 4,
            pad_y: 4,
            sort_order: default_sort_order(),
            outlines: false,
            parallel: default_parallel(),
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Dimensions are zero
    /// - The page is not square
    /// - Padding alone would fill a page
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasPagerError;

        if self.page_width == 0 || self.page_height == 0 {
            return Err(AtlasPagerError::InvalidDimensions {
                width: self.page_width,
                height: self.page_height,
            });
        }

        if self.page_width != self.page_height {
            return Err(AtlasPagerError::InvalidConfig(format!(
                "pages must be square, got {}x{}",
                self.page_width, self.page_height
            )));
        }

        // A 1x1 item must still fit once padded.
        let min_w = self.pad_x.saturating_mul(2).saturating_add(1);
        let min_h = self.pad_y.saturating_mul(2).saturating_add(1);
        if min_w > self.page_width || min_h > self.page_height {
            return Err(AtlasPagerError::InvalidConfig(format!(
                "padding ({}, {}) * 2 leaves no usable space on a {}x{} page",
                self.pad_x, self.pad_y, self.page_width, self.page_height
            )));
        }

        Ok(())
    }

    /// Padding as `(pad_x, pad_y)`.
    pub fn padding(&self) -> (u32, u32) {
        (self.pad_x, self.pad_y)
    }
}

fn default_sort_order() -> SortOrder {
    SortOrder::AreaDesc
}
fn default_parallel() -> bool {
    false
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    /// Sets both page dimensions to `size`.
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.cfg.page_width = size;
        self.cfg.page_height = size;
        self
    }
    pub fn with_padding(mut self, pad_x: u32, pad_y: u32) -> Self {
        self.cfg.pad_x = pad_x;
        self.cfg.pad_y = pad_y;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn outlines(mut self, v: bool) -> Self {
        self.cfg.outlines = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}
