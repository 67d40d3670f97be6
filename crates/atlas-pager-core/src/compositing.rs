use image::{Rgba, RgbaImage};

/// Blit all of `src` into `canvas` with its top-left at (dx, dy), then optionally
/// draw a red 1px outline around the copied area for debugging.
///
/// Pixels falling outside the canvas are skipped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32, outlines: bool) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();

    for yy in 0..sh {
        for xx in 0..sw {
            if dx + xx < cw && dy + yy < ch {
                canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(xx, yy));
            }
        }
    }

    if outlines {
        draw_outline(canvas, dx, dy, sw, sh, Rgba([255, 0, 0, 255]));
    }
}

fn draw_outline(canvas: &mut RgbaImage, dx: u32, dy: u32, w: u32, h: u32, color: Rgba<u8>) {
    if w == 0 || h == 0 {
        return;
    }
    let (cw, ch) = canvas.dimensions();
    let right = dx + w - 1;
    let bottom = dy + h - 1;
    for xx in dx..=right {
        if xx < cw && dy < ch {
            canvas.put_pixel(xx, dy, color);
        }
        if xx < cw && bottom < ch {
            canvas.put_pixel(xx, bottom, color);
        }
    }
    for yy in dy..=bottom {
        if dx < cw && yy < ch {
            canvas.put_pixel(dx, yy, color);
        }
        if right < cw && yy < ch {
            canvas.put_pixel(right, yy, color);
        }
    }
}
