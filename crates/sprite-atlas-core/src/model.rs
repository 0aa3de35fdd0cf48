use std::path::PathBuf;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn x1(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn y1(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    /// Grows the rectangle by `margin` on its right and bottom sides.
    pub fn with_margin(&self, margin: u32) -> Rect {
        Rect::new(self.x, self.y, self.w + margin, self.h + margin)
    }
    /// True when the two half-open regions share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x1() && other.x < self.x1() && self.y < other.y1() && other.y < self.y1()
    }
}

/// A decoded source frame after trimming.
///
/// `trim` is the bounding box of the content inside the raw canvas, so the
/// trimmed pixels sit at `(trim.x, trim.y)` of a `raw_size` canvas.
#[derive(Debug, Clone)]
pub struct Frame {
    /// File name without extension.
    pub name: String,
    pub source: Option<PathBuf>,
    pub raw_size: (u32, u32),
    pub pixels: RgbaImage,
    pub trim: Rect,
    /// Content hash of the untrimmed pixels.
    pub hash: u64,
}

impl Frame {
    pub fn trimmed_size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// One `SubTexture` entry: where a frame lives in the atlas and how to rebuild
/// its original canvas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRecord {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Non-positive for records produced by the packer.
    pub frame_x: i32,
    pub frame_y: i32,
    pub rotated: bool,
}

impl PlacementRecord {
    /// Atlas region holding the frame pixels.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Where the cropped region goes inside the `frame_width x frame_height` canvas.
    pub fn paste_offset(&self) -> (u32, u32) {
        (
            self.frame_x.min(0).unsigned_abs(),
            self.frame_y.min(0).unsigned_abs(),
        )
    }

    /// Every field except the name matches.
    pub fn same_geometry(&self, other: &PlacementRecord) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
            && self.frame_width == other.frame_width
            && self.frame_height == other.frame_height
            && self.frame_x == other.frame_x
            && self.frame_y == other.frame_y
            && self.rotated == other.rotated
    }

    /// Copy of this record's geometry under another name.
    pub fn aliased(&self, name: impl Into<String>) -> PlacementRecord {
        PlacementRecord {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// A packed atlas: canvas size, sorted records and the placed (unique) rects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atlas {
    /// Source folder name; doubles as `imagePath` and output base name.
    pub name: String,
    /// Side length of the square canvas.
    pub size: u32,
    /// Sorted ascending by name (ordinal).
    pub records: Vec<PlacementRecord>,
    /// Rectangles of the unique frames, in placement order.
    pub placements: Vec<Rect>,
}

/// Statistics about a packed atlas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    pub canvas_size: u32,
    pub total_frames: usize,
    pub unique_frames: usize,
    pub duplicate_frames: usize,
    pub canvas_area: u64,
    pub used_area: u64,
    /// used_area / canvas_area (0.0 to 1.0).
    pub occupancy: f64,
}

impl Atlas {
    pub fn stats(&self) -> PackStats {
        let canvas_area = self.size as u64 * self.size as u64;
        let used_area: u64 = self.placements.iter().map(Rect::area).sum();
        let occupancy = if canvas_area > 0 {
            used_area as f64 / canvas_area as f64
        } else {
            0.0
        };
        PackStats {
            canvas_size: self.size,
            total_frames: self.records.len(),
            unique_frames: self.placements.len(),
            duplicate_frames: self.records.len().saturating_sub(self.placements.len()),
            canvas_area,
            used_area,
            occupancy,
        }
    }
}

impl PackStats {
    pub fn summary(&self) -> String {
        format!(
            "Canvas: {0}x{0}, Frames: {1} ({2} unique, {3} duplicate), Occupancy: {4:.2}%",
            self.canvas_size,
            self.total_frames,
            self.unique_frames,
            self.duplicate_frames,
            self.occupancy * 100.0,
        )
    }
}
