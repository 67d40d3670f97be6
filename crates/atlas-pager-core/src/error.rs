use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasPagerError {
    #[error("Invalid page dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error(
        "Item '{key}' ({width}x{height} padded) can never fit a {page_width}x{page_height} page"
    )]
    OversizedItem {
        key: String,
        width: u32,
        height: u32,
        page_width: u32,
        page_height: u32,
    },
    #[error("Item '{key}' has a degenerate size {width}x{height}")]
    DegenerateItem { key: String, width: u32, height: u32 },
    #[error("Nothing to pack")]
    Empty,
}

pub type Result<T> = std::result::Result<T, AtlasPagerError>;
