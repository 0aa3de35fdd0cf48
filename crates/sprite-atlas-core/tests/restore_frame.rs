use image::{Rgba, RgbaImage};
use sprite_atlas_core::compositing::{crop_rgba, rotate_ccw};
use sprite_atlas_core::extract::size_marker_name;
use sprite_atlas_core::{PlacementRecord, Rect, restore_frame, sanitize_file_name};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Untrimmed `w x h` region at `(x, y)`; tests override the frame fields.
fn region(x: u32, y: u32, w: u32, h: u32) -> PlacementRecord {
    PlacementRecord {
        name: "f".into(),
        x,
        y,
        width: w,
        height: h,
        frame_width: w,
        frame_height: h,
        frame_x: 0,
        frame_y: 0,
        rotated: false,
    }
}

#[test]
fn repads_trimmed_region() {
    let mut atlas = RgbaImage::from_pixel(16, 16, CLEAR);
    for y in 4..6 {
        for x in 2..5 {
            atlas.put_pixel(x, y, RED);
        }
    }
    let frame = restore_frame(&atlas, &PlacementRecord {
        frame_width: 10,
        frame_height: 8,
        frame_x: -6,
        frame_y: -1,
        ..region(2, 4, 3, 2)
    });
    assert_eq!(frame.dimensions(), (10, 8));
    assert_eq!(*frame.get_pixel(6, 1), RED);
    assert_eq!(*frame.get_pixel(8, 2), RED);
    assert_eq!(*frame.get_pixel(5, 1), CLEAR);
    assert_eq!(*frame.get_pixel(9, 3), CLEAR);
}

#[test]
fn positive_offsets_paste_at_origin() {
    let atlas = RgbaImage::from_pixel(4, 4, BLUE);
    let frame = restore_frame(&atlas, &PlacementRecord {
        frame_width: 4,
        frame_height: 4,
        frame_x: 3,
        frame_y: 5,
        ..region(0, 0, 2, 2)
    });
    assert_eq!(*frame.get_pixel(0, 0), BLUE);
    assert_eq!(*frame.get_pixel(1, 1), BLUE);
    assert_eq!(*frame.get_pixel(2, 2), CLEAR);
}

#[test]
fn region_past_atlas_edge_is_transparent() {
    let atlas = RgbaImage::from_pixel(4, 4, BLUE);
    let crop = crop_rgba(&atlas, Rect::new(2, 2, 4, 4));
    assert_eq!(crop.dimensions(), (4, 4));
    assert_eq!(*crop.get_pixel(1, 1), BLUE);
    assert_eq!(*crop.get_pixel(2, 2), CLEAR);

    let frame = restore_frame(&atlas, &region(3, 3, 5, 5));
    assert_eq!(frame.dimensions(), (5, 5));
    assert_eq!(*frame.get_pixel(0, 0), BLUE);
    assert_eq!(*frame.get_pixel(1, 0), CLEAR);
}

#[test]
fn oversized_region_is_clipped_to_frame() {
    let atlas = RgbaImage::from_pixel(8, 8, RED);
    let frame = restore_frame(&atlas, &PlacementRecord {
        frame_width: 4,
        frame_height: 4,
        frame_x: -2,
        frame_y: -2,
        ..region(0, 0, 8, 8)
    });
    assert_eq!(frame.dimensions(), (4, 4));
    assert_eq!(*frame.get_pixel(1, 1), CLEAR);
    assert_eq!(*frame.get_pixel(2, 2), RED);
    assert_eq!(*frame.get_pixel(3, 3), RED);
}

#[test]
fn rotated_region_turns_counter_clockwise() {
    // 3x1 strip: red, clear, blue
    let mut atlas = RgbaImage::from_pixel(3, 1, CLEAR);
    atlas.put_pixel(0, 0, RED);
    atlas.put_pixel(2, 0, BLUE);
    let rotated = rotate_ccw(&atlas);
    assert_eq!(rotated.dimensions(), (1, 3));
    // Right end goes to the top.
    assert_eq!(*rotated.get_pixel(0, 0), BLUE);
    assert_eq!(*rotated.get_pixel(0, 2), RED);

    let r = PlacementRecord {
        frame_width: 1,
        frame_height: 3,
        rotated: true,
        ..region(0, 0, 3, 1)
    };
    let frame = restore_frame(&atlas, &r);
    assert_eq!(frame, rotated);
}

#[test]
fn zero_sized_frame() {
    let atlas = RgbaImage::from_pixel(4, 4, RED);
    let frame = restore_frame(&atlas, &region(0, 0, 0, 0));
    assert_eq!(frame.dimensions(), (0, 0));
}

#[test]
fn file_names_are_sanitized() {
    assert_eq!(sanitize_file_name("a<b>c:d\"e/f\\g|h?i*j"), "a_b_c_d_e_f_g_h_i_j");
    assert_eq!(sanitize_file_name("walk 01.v2"), "walk 01.v2");
}

#[test]
fn marker_name() {
    assert_eq!(size_marker_name(512, 256), "512x256.txt");
}
