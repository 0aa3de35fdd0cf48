use image::{Rgba, RgbaImage};
use sprite_atlas_core::dedup::{DuplicateDetector, Occurrence, content_hash};

#[test]
fn identical_frames_share_first_index() {
    let a = RgbaImage::from_pixel(3, 3, Rgba([9, 9, 9, 255]));
    let b = RgbaImage::from_pixel(3, 3, Rgba([1, 1, 1, 255]));
    let c = a.clone();

    let mut det = DuplicateDetector::new();
    assert_eq!(det.observe(&a), Occurrence::First { unique: 0 });
    assert_eq!(det.observe(&b), Occurrence::First { unique: 1 });
    assert_eq!(det.observe(&c), Occurrence::Repeat { unique: 0 });
    assert_eq!(det.unique_count(), 2);
}

#[test]
fn same_bytes_different_shape_are_distinct() {
    // 2x3 and 3x2 carry the same raw byte sequence.
    let a = RgbaImage::from_pixel(2, 3, Rgba([5, 5, 5, 255]));
    let b = RgbaImage::from_pixel(3, 2, Rgba([5, 5, 5, 255]));
    assert_eq!(a.as_raw(), b.as_raw());
    assert_ne!(content_hash(&a), content_hash(&b));

    let mut det = DuplicateDetector::new();
    det.observe(&a);
    assert_eq!(det.observe(&b), Occurrence::First { unique: 1 });
}

#[test]
fn colliding_hash_does_not_merge() {
    let a = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
    let b = RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255]));
    let a2 = a.clone();

    let mut det = DuplicateDetector::new();
    assert_eq!(det.observe_hashed(42, &a), Occurrence::First { unique: 0 });
    assert_eq!(det.observe_hashed(42, &b), Occurrence::First { unique: 1 });
    assert_eq!(det.observe_hashed(42, &a2).unique_index(), 0);
}

#[test]
fn transparent_frames_of_different_size_are_distinct() {
    let a = RgbaImage::new(4, 4);
    let b = RgbaImage::new(8, 2);
    let mut det = DuplicateDetector::new();
    det.observe(&a);
    assert!(matches!(det.observe(&b), Occurrence::First { .. }));
}
