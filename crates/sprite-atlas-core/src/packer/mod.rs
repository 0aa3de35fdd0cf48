use crate::model::Rect;

pub mod shelf;

/// A packer places rectangles into a fixed-size canvas.
///
/// Implementations must ensure no overlaps and keep the configured gap.
/// `pack` returns `None` once the canvas is out of space.
pub trait Packer {
    fn pack(&mut self, w: u32, h: u32) -> Option<Rect>;
}
