use tracing::debug;

use super::Packer;
use crate::config::PackConfig;
use crate::error::{AtlasError, Result};
use crate::model::Rect;

/// Row-wise cursor over a square canvas of side `size`.
///
/// Frames go left to right; a frame that would cross the right edge (gap
/// included) starts a new row below the tallest frame of the current one.
pub struct ShelfCursor {
    size: u32,
    gap: u32,
    x: u32,
    y: u32,
    row_h: u32,
}

impl ShelfCursor {
    pub fn new(size: u32, gap: u32) -> Self {
        Self {
            size,
            gap,
            x: 0,
            y: 0,
            row_h: 0,
        }
    }
}

impl Packer for ShelfCursor {
    fn pack(&mut self, w: u32, h: u32) -> Option<Rect> {
        let size = self.size as u64;
        let gap = self.gap as u64;
        if self.x as u64 + w as u64 + gap > size {
            self.x = 0;
            self.y = self.y.checked_add(self.row_h)?.checked_add(self.gap)?;
            self.row_h = 0;
        }
        if self.y as u64 + h as u64 + gap > size {
            return None;
        }
        let rect = Rect::new(self.x, self.y, w, h);
        self.x = self.x.saturating_add(w).saturating_add(self.gap);
        self.row_h = self.row_h.max(h);
        Some(rect)
    }
}

/// Outcome of one placement pass at a fixed canvas size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every frame was placed; rects are in input order.
    Fit(Vec<Rect>),
    /// The canvas ran out of rows after `placed` frames.
    Overflow { placed: usize },
}

/// Runs one independent pass over `sizes` on a `size x size` canvas.
pub fn place_all(sizes: &[(u32, u32)], size: u32, gap: u32) -> PassOutcome {
    let mut cursor = ShelfCursor::new(size, gap);
    let mut rects = Vec::with_capacity(sizes.len());
    for &(w, h) in sizes {
        match cursor.pack(w, h) {
            Some(r) => rects.push(r),
            None => {
                return PassOutcome::Overflow {
                    placed: rects.len(),
                };
            }
        }
    }
    PassOutcome::Fit(rects)
}

fn ceil_sqrt(v: u64) -> u64 {
    let r = v.isqrt();
    if r * r < v { r + 1 } else { r }
}

/// First canvas side to try: covers the total gapped area and the largest
/// single frame dimension.
pub fn initial_canvas_size(sizes: &[(u32, u32)], gap: u32) -> u32 {
    let gap = gap as u64;
    let area: u64 = sizes
        .iter()
        .map(|&(w, h)| (w as u64 + gap) * (h as u64 + gap))
        .sum();
    let largest = sizes.iter().map(|&(w, h)| w.max(h)).max().unwrap_or(0);
    let side = ceil_sqrt(area).max(largest as u64).max(1);
    u32::try_from(side).unwrap_or(u32::MAX)
}

/// Next canvas side after an overflow: `ceil(size * (100 + percent) / 100)`,
/// and never less than `size + 1`.
pub fn grow_canvas_size(size: u32, percent: u32) -> u32 {
    let grown = (size as u64 * (100 + percent as u64)).div_ceil(100);
    let next = grown.max(size as u64 + 1);
    u32::try_from(next).unwrap_or(u32::MAX)
}

/// Final placement of one folder's unique frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfLayout {
    pub size: u32,
    /// One rect per input size, same order.
    pub rects: Vec<Rect>,
    /// Number of placement passes run, the successful one included.
    pub attempts: u32,
}

/// Grow-and-retry shelf packer.
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    gap: u32,
    growth_percent: u32,
    max_attempts: u32,
    max_canvas_size: u32,
}

impl ShelfPacker {
    pub fn new(cfg: &PackConfig) -> Self {
        Self {
            gap: cfg.gap,
            growth_percent: cfg.growth_percent.max(1),
            max_attempts: cfg.max_attempts,
            max_canvas_size: cfg.max_canvas_size,
        }
    }

    /// Places `sizes` (in the given order) on the smallest square canvas the
    /// growth schedule reaches.
    ///
    /// Each pass starts over from the first frame; nothing from an overflowed
    /// pass is kept.
    pub fn pack(&self, sizes: &[(u32, u32)]) -> Result<ShelfLayout> {
        if sizes.is_empty() {
            return Err(AtlasError::Empty);
        }
        let mut size = initial_canvas_size(sizes, self.gap);
        let mut attempts = 0u32;
        loop {
            if size > self.max_canvas_size || attempts >= self.max_attempts {
                return Err(AtlasError::PackingFailure {
                    frames: sizes.len(),
                    attempts,
                    size,
                });
            }
            attempts += 1;
            match place_all(sizes, size, self.gap) {
                PassOutcome::Fit(rects) => {
                    return Ok(ShelfLayout {
                        size,
                        rects,
                        attempts,
                    });
                }
                PassOutcome::Overflow { placed } => {
                    let next = grow_canvas_size(size, self.growth_percent);
                    // Try the cap itself once before giving up.
                    let next = if size < self.max_canvas_size {
                        next.min(self.max_canvas_size)
                    } else {
                        next
                    };
                    debug!(size, next, placed, total = sizes.len(), "canvas overflow, growing");
                    size = next;
                }
            }
        }
    }
}
