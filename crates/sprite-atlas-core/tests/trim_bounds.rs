use image::{Rgba, RgbaImage};
use sprite_atlas_core::Rect;
use sprite_atlas_core::trim::{content_bounds, trim_transparent};

fn canvas(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0]))
}

#[test]
fn trims_to_content_box() {
    let mut img = canvas(10, 8);
    img.put_pixel(3, 2, Rgba([255, 0, 0, 255]));
    img.put_pixel(6, 5, Rgba([0, 255, 0, 128]));

    let (trimmed, rect) = trim_transparent(&img);
    assert_eq!(rect, Rect::new(3, 2, 4, 4));
    assert_eq!(trimmed.dimensions(), (4, 4));
    assert_eq!(*trimmed.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    assert_eq!(*trimmed.get_pixel(3, 3), Rgba([0, 255, 0, 128]));
}

#[test]
fn blank_frame_keeps_full_extent() {
    let img = canvas(7, 3);
    assert_eq!(content_bounds(&img), None);
    let (trimmed, rect) = trim_transparent(&img);
    assert_eq!(rect, Rect::new(0, 0, 7, 3));
    assert_eq!(trimmed, img);
}

#[test]
fn zero_alpha_with_color_is_content() {
    let mut img = canvas(5, 5);
    img.put_pixel(4, 4, Rgba([10, 0, 0, 0]));
    assert_eq!(content_bounds(&img), Some(Rect::new(4, 4, 1, 1)));
}

#[test]
fn full_frame_is_untouched() {
    let img = RgbaImage::from_pixel(4, 6, Rgba([1, 2, 3, 4]));
    let (trimmed, rect) = trim_transparent(&img);
    assert_eq!(rect, Rect::new(0, 0, 4, 6));
    assert_eq!(trimmed, img);
}

#[test]
fn single_column_content() {
    let mut img = canvas(9, 9);
    for y in 1..8 {
        img.put_pixel(4, y, Rgba([0, 0, 255, 255]));
    }
    let (trimmed, rect) = trim_transparent(&img);
    assert_eq!(rect, Rect::new(4, 1, 1, 7));
    assert_eq!(trimmed.dimensions(), (1, 7));
}
