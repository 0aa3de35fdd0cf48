use image::{RgbaImage, imageops};

use crate::model::Rect;

/// A pixel counts as content when any channel differs from transparent black.
fn is_content(px: &image::Rgba<u8>) -> bool {
    px.0 != [0, 0, 0, 0]
}

/// Computes the bounding box of all content pixels.
///
/// Returns `None` when the image is entirely transparent black.
pub fn content_bounds(rgba: &RgbaImage) -> Option<Rect> {
    let (w, h) = rgba.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    let column_has_content = |x: u32, y0: u32, y1: u32| (y0..=y1).any(|y| is_content(rgba.get_pixel(x, y)));
    let row_has_content = |y: u32, x0: u32, x1: u32| (x0..=x1).any(|x| is_content(rgba.get_pixel(x, y)));

    // left
    let mut x1 = 0;
    while x1 < w && !column_has_content(x1, 0, h - 1) {
        x1 += 1;
    }
    if x1 >= w {
        return None;
    }
    // right
    let mut x2 = w - 1;
    while x2 > x1 && !column_has_content(x2, 0, h - 1) {
        x2 -= 1;
    }
    // top
    let mut y1 = 0;
    while y1 < h && !row_has_content(y1, x1, x2) {
        y1 += 1;
    }
    // bottom
    let mut y2 = h - 1;
    while y2 > y1 && !row_has_content(y2, x1, x2) {
        y2 -= 1;
    }
    Some(Rect::new(x1, y1, x2 - x1 + 1, y2 - y1 + 1))
}

/// Strips transparent borders.
///
/// A blank frame is returned untouched with the full-extent box
/// `(0, 0, width, height)`.
pub fn trim_transparent(rgba: &RgbaImage) -> (RgbaImage, Rect) {
    let (w, h) = rgba.dimensions();
    match content_bounds(rgba) {
        Some(b) if b.w == w && b.h == h => (rgba.clone(), b),
        Some(b) => (imageops::crop_imm(rgba, b.x, b.y, b.w, b.h).to_image(), b),
        None => (rgba.clone(), Rect::new(0, 0, w, h)),
    }
}
