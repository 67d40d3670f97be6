use atlas_pager_core::config::PackerConfig;
use atlas_pager_core::error::AtlasPagerError;
use atlas_pager_core::{InputImage, LayoutItem, layout_pages, pack_images, pack_layout};

/// Test zero-sized page dimensions
#[test]
fn test_zero_width() {
    let cfg = PackerConfig {
        page_width: 0,
        page_height: 1024,
        ..Default::default()
    };

    let result = cfg.validate();
    match result {
        Err(AtlasPagerError::InvalidDimensions { width, height }) => {
            assert_eq!(width, 0);
            assert_eq!(height, 1024);
        }
        _ => panic!("Expected InvalidDimensions error"),
    }
}

#[test]
fn test_both_dimensions_zero() {
    let cfg = PackerConfig {
        page_width: 0,
        page_height: 0,
        ..Default::default()
    };

    assert!(cfg.validate().is_err());
}

#[test]
fn test_non_square_page_rejected() {
    let cfg = PackerConfig {
        page_width: 512,
        page_height: 256,
        ..Default::default()
    };

    match cfg.validate() {
        Err(AtlasPagerError::InvalidConfig(msg)) => assert!(msg.contains("square")),
        _ => panic!("Expected InvalidConfig error"),
    }
}

#[test]
fn test_padding_leaves_no_space() {
    let cfg = PackerConfig {
        page_width: 100,
        page_height: 100,
        pad_x: 50, // 50 * 2 = 100, nothing left for content
        pad_y: 0,
        ..Default::default()
    };

    match cfg.validate() {
        Err(AtlasPagerError::InvalidConfig(msg)) => assert!(msg.contains("padding")),
        _ => panic!("Expected InvalidConfig error"),
    }
}

#[test]
fn test_default_config_is_valid() {
    let cfg = PackerConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!((cfg.page_width, cfg.page_height), (1024, 1024));
    assert_eq!(cfg.padding(), (4, 4));
}

/// Test empty input
#[test]
fn test_empty_input_pack_images() {
    let inputs: Vec<InputImage> = vec![];

    match pack_images(inputs, PackerConfig::default()) {
        Err(AtlasPagerError::Empty) => {}
        _ => panic!("Expected Empty error"),
    }
}

#[test]
fn test_empty_input_pack_layout() {
    let inputs: Vec<(&str, u32, u32)> = vec![];

    match pack_layout(inputs, PackerConfig::default()) {
        Err(AtlasPagerError::Empty) => {}
        _ => panic!("Expected Empty error"),
    }
}

#[test]
fn test_empty_layout_pages_is_empty() {
    let items: Vec<LayoutItem<String>> = vec![];
    let pages = layout_pages(items, &PackerConfig::default()).expect("layout");
    assert!(pages.is_empty());
}

#[test]
fn test_zero_width_item_rejected() {
    let cfg = PackerConfig::builder().with_padding(0, 0).build();
    let items = vec![LayoutItem::new("ok", 8, 8), LayoutItem::new("flat", 0, 16)];

    match layout_pages(items, &cfg) {
        Err(AtlasPagerError::DegenerateItem { key, width, height }) => {
            assert_eq!(key, "flat");
            assert_eq!((width, height), (0, 16));
        }
        _ => panic!("Expected DegenerateItem error"),
    }
}

#[test]
fn test_oversized_on_one_axis() {
    let cfg = PackerConfig::builder()
        .with_page_size(256)
        .with_padding(0, 0)
        .build();

    let result = pack_layout(vec![("ok", 16, 16), ("tall", 10, 257)], cfg);
    match result {
        Err(AtlasPagerError::OversizedItem { key, height, .. }) => {
            assert_eq!(key, "tall");
            assert_eq!(height, 257);
        }
        _ => panic!("Expected OversizedItem error"),
    }
}

#[test]
fn test_padding_overflow_is_oversized() {
    let cfg = PackerConfig::builder()
        .with_page_size(256)
        .with_padding(1, 1)
        .build();

    let result = layout_pages(vec![LayoutItem::new("huge", u32::MAX, 1)], &cfg);
    assert!(matches!(
        result,
        Err(AtlasPagerError::OversizedItem { .. })
    ));
}

#[test]
fn test_exact_page_with_padding_fits() {
    let cfg = PackerConfig::builder()
        .with_page_size(64)
        .with_padding(4, 4)
        .build();

    let atlas = pack_layout(vec![("snug", 56, 56)], cfg).expect("pack");
    assert_eq!(atlas.pages.len(), 1);
    assert_eq!(atlas.pages[0].frames[0].frame.x, 4);
    assert_eq!(atlas.pages[0].frames[0].frame.y, 4);
}

#[test]
fn test_error_message_names_item() {
    let cfg = PackerConfig::builder()
        .with_page_size(32)
        .with_padding(0, 0)
        .build();

    let err = pack_layout(vec![("hero.png", 64, 8)], cfg).unwrap_err();
    assert!(err.to_string().contains("hero.png"));
}
