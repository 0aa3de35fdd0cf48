use image::{Rgba, RgbaImage};

use crate::model::Rect;

/// Copy `src` into `canvas` with its top-left at (dx, dy), overwriting the
/// destination pixels. Parts falling outside the canvas are clipped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: i64, dy: i64) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..sh {
        let ty = dy + yy as i64;
        if ty < 0 || ty >= ch as i64 {
            continue;
        }
        for xx in 0..sw {
            let tx = dx + xx as i64;
            if tx < 0 || tx >= cw as i64 {
                continue;
            }
            canvas.put_pixel(tx as u32, ty as u32, *src.get_pixel(xx, yy));
        }
    }
}

/// Cut `region` out of `src`. The result is always `region.w x region.h`;
/// pixels outside `src` come back transparent.
pub fn crop_rgba(src: &RgbaImage, region: Rect) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    let mut out = RgbaImage::from_pixel(region.w, region.h, Rgba([0, 0, 0, 0]));
    for yy in 0..region.h {
        let iy = region.y as u64 + yy as u64;
        if iy >= sh as u64 {
            break;
        }
        for xx in 0..region.w {
            let ix = region.x as u64 + xx as u64;
            if ix >= sw as u64 {
                break;
            }
            out.put_pixel(xx, yy, *src.get_pixel(ix as u32, iy as u32));
        }
    }
    out
}

/// Rotate 90° counter-clockwise; width and height swap.
pub fn rotate_ccw(src: &RgbaImage) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    let mut out = RgbaImage::new(sh, sw);
    for y in 0..sh {
        for x in 0..sw {
            out.put_pixel(y, sw - 1 - x, *src.get_pixel(x, y));
        }
    }
    out
}
