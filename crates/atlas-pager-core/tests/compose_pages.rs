use atlas_pager_core::prelude::*;
use image::{DynamicImage, Rgba, RgbaImage};

fn solid(w: u32, h: u32, color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(color)))
}

#[test]
fn pixels_land_at_padded_origin() {
    let cfg = PackerConfig::builder()
        .with_page_size(64)
        .with_padding(2, 3)
        .build();
    let inputs = vec![
        InputImage {
            key: "red".into(),
            image: solid(20, 10, [255, 0, 0, 255]),
        },
        InputImage {
            key: "blue".into(),
            image: solid(8, 8, [0, 0, 255, 255]),
        },
    ];

    let out = pack_images(inputs, cfg).expect("pack");
    assert_eq!(out.pages.len(), 1);
    let page = &out.pages[0];
    assert_eq!(page.rgba.dimensions(), (64, 64));

    for f in &page.page.frames {
        let expected = if f.key == "red" {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        };
        let r = f.frame;
        assert_eq!(*page.rgba.get_pixel(r.x, r.y), expected);
        assert_eq!(*page.rgba.get_pixel(r.right(), r.bottom()), expected);
        // padding around the content stays transparent
        assert_eq!(page.rgba.get_pixel(r.x - 1, r.y)[3], 0);
        assert_eq!(page.rgba.get_pixel(r.x, r.y - 1)[3], 0);
        assert_eq!(page.rgba.get_pixel(r.right() + 1, r.y)[3], 0);
        assert_eq!(page.rgba.get_pixel(r.x, r.bottom() + 1)[3], 0);
    }
}

#[test]
fn canvas_is_full_page_size() {
    let cfg = PackerConfig::builder()
        .with_page_size(256)
        .with_padding(1, 1)
        .build();
    let inputs = vec![InputImage {
        key: "tiny".into(),
        image: solid(4, 4, [9, 9, 9, 255]),
    }];

    let out = pack_images(inputs, cfg).expect("pack");
    assert_eq!(out.pages[0].rgba.dimensions(), (256, 256));
    assert_eq!(out.atlas.pages[0].width, 256);
    assert_eq!(out.atlas.pages[0].frames[0].frame, Rect::new(1, 1, 4, 4));
}

#[test]
fn outlines_draw_red_border() {
    let cfg = PackerConfig::builder()
        .with_page_size(32)
        .with_padding(1, 1)
        .outlines(true)
        .build();
    let inputs = vec![InputImage {
        key: "green".into(),
        image: solid(6, 6, [0, 255, 0, 255]),
    }];

    let out = pack_images(inputs, cfg).expect("pack");
    let rgba = &out.pages[0].rgba;
    let r = out.atlas.pages[0].frames[0].frame;
    assert_eq!(*rgba.get_pixel(r.x, r.y), Rgba([255, 0, 0, 255]));
    assert_eq!(*rgba.get_pixel(r.right(), r.bottom()), Rgba([255, 0, 0, 255]));
    assert_eq!(*rgba.get_pixel(r.x + 2, r.y + 2), Rgba([0, 255, 0, 255]));
}

#[test]
fn overflow_goes_to_second_page_image() {
    let cfg = PackerConfig::builder()
        .with_page_size(16)
        .with_padding(0, 0)
        .build();
    let inputs = vec![
        InputImage {
            key: "first".into(),
            image: solid(16, 16, [1, 2, 3, 255]),
        },
        InputImage {
            key: "second".into(),
            image: solid(16, 16, [4, 5, 6, 255]),
        },
    ];

    let out = pack_images(inputs, cfg).expect("pack");
    assert_eq!(out.pages.len(), 2);
    assert_eq!(out.pages[0].page.frames[0].key, "first");
    assert_eq!(*out.pages[1].rgba.get_pixel(0, 0), Rgba([4, 5, 6, 255]));
    assert_eq!(out.pages[1].page.id, 1);
}
