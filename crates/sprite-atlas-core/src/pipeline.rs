use std::path::PathBuf;

use image::{DynamicImage, RgbaImage};
use tracing::{debug, instrument};

use crate::compositing::blit_rgba;
use crate::config::PackConfig;
use crate::dedup::{DuplicateDetector, Occurrence, content_hash};
use crate::error::{AtlasError, Result};
use crate::model::{Atlas, Frame, PlacementRecord};
use crate::packer::shelf::{ShelfLayout, ShelfPacker};
use crate::trim::trim_transparent;

/// In-memory frame to pack (record name + decoded image).
pub struct InputImage {
    /// Record name, usually the file name without extension.
    pub name: String,
    /// File the image was decoded from, if any.
    pub source: Option<PathBuf>,
    pub image: DynamicImage,
}

/// Output of a packing run: atlas metadata and the composed RGBA canvas.
pub struct PackOutput {
    pub atlas: Atlas,
    pub rgba: RgbaImage,
    /// Placement passes needed, the successful one included.
    pub attempts: u32,
}

impl PackOutput {
    pub fn stats(&self) -> crate::model::PackStats {
        self.atlas.stats()
    }
}

/// Scratch state for one folder, threaded through the packing stages and
/// dropped once the atlas is built.
pub struct PackContext {
    pub name: String,
    /// Canonical frames, trimmed, in first-seen order.
    pub unique: Vec<Frame>,
    /// One `(record name, index into unique)` pair per input, in input order.
    pub entries: Vec<(String, usize)>,
}

impl PackContext {
    /// Decodes to RGBA, drops repeated content and trims the canonical frames.
    pub fn collect(name: &str, inputs: Vec<InputImage>) -> Self {
        let raws: Vec<(String, Option<PathBuf>, RgbaImage)> = inputs
            .into_iter()
            .map(|inp| (inp.name, inp.source, inp.image.to_rgba8()))
            .collect();

        let mut detector = DuplicateDetector::new();
        let mut unique = Vec::new();
        let mut entries = Vec::with_capacity(raws.len());
        for (key, source, rgba) in &raws {
            let hash = content_hash(rgba);
            match detector.observe_hashed(hash, rgba) {
                Occurrence::First { unique: idx } => {
                    let (pixels, trim) = trim_transparent(rgba);
                    unique.push(Frame {
                        name: key.clone(),
                        source: source.clone(),
                        raw_size: rgba.dimensions(),
                        pixels,
                        trim,
                        hash,
                    });
                    entries.push((key.clone(), idx));
                }
                Occurrence::Repeat { unique: idx } => {
                    let canonical = &unique[idx];
                    debug!(
                        frame = %key,
                        source = ?source,
                        canonical = %canonical.name,
                        canonical_source = ?canonical.source,
                        hash = canonical.hash,
                        "duplicate frame"
                    );
                    entries.push((key.clone(), idx));
                }
            }
        }
        Self {
            name: name.to_string(),
            unique,
            entries,
        }
    }

    pub fn duplicate_count(&self) -> usize {
        self.entries.len() - self.unique.len()
    }

    /// Runs the grow-and-retry shelf packer over the canonical frames.
    pub fn place(&self, packer: &ShelfPacker) -> Result<ShelfLayout> {
        let sizes: Vec<(u32, u32)> = self.unique.iter().map(Frame::trimmed_size).collect();
        packer.pack(&sizes)
    }

    /// Composes the canvas and builds one record per input, sorted by name.
    pub fn compose(&self, layout: &ShelfLayout) -> (Atlas, RgbaImage) {
        let mut canvas = RgbaImage::new(layout.size, layout.size);
        let mut canonical = Vec::with_capacity(self.unique.len());
        for (frame, rect) in self.unique.iter().zip(&layout.rects) {
            blit_rgba(&frame.pixels, &mut canvas, rect.x as i64, rect.y as i64);
            canonical.push(PlacementRecord {
                name: frame.name.clone(),
                x: rect.x,
                y: rect.y,
                width: rect.w,
                height: rect.h,
                frame_width: frame.raw_size.0,
                frame_height: frame.raw_size.1,
                frame_x: -(frame.trim.x as i32),
                frame_y: -(frame.trim.y as i32),
                rotated: false,
            });
        }
        let mut records: Vec<PlacementRecord> = self
            .entries
            .iter()
            .map(|(name, idx)| canonical[*idx].aliased(name.as_str()))
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        let atlas = Atlas {
            name: self.name.clone(),
            size: layout.size,
            records,
            placements: layout.rects.clone(),
        };
        (atlas, canvas)
    }
}

#[instrument(skip_all, fields(atlas = %name, frames = inputs.len()))]
/// Packs `inputs` into one square atlas named `name`.
///
/// Notes:
/// - Inputs are taken in the given order; callers sort by file name for deterministic output.
/// - Pixel-identical inputs are packed once and share their geometry in the records.
/// - Nothing is produced unless a placement pass fits every unique frame.
pub fn pack_images(name: &str, inputs: Vec<InputImage>, cfg: &PackConfig) -> Result<PackOutput> {
    cfg.validate()?;

    if inputs.is_empty() {
        return Err(AtlasError::Empty);
    }

    let ctx = PackContext::collect(name, inputs);
    let layout = ctx.place(&ShelfPacker::new(cfg))?;
    let (atlas, rgba) = ctx.compose(&layout);
    debug!(
        size = layout.size,
        attempts = layout.attempts,
        unique = ctx.unique.len(),
        duplicates = ctx.duplicate_count(),
        "atlas packed"
    );
    Ok(PackOutput {
        atlas,
        rgba,
        attempts: layout.attempts,
    })
}
