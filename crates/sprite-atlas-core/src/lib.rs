//! Core library for packing sprite frames into atlases and extracting them back.
//!
//! - Packing: trim transparent borders, deduplicate identical frames, shelf-pack onto a square canvas that grows until everything fits
//! - Metadata: flat `TextureAtlas` / `SubTexture` XML, one record per source frame (duplicates included), sorted by name
//! - Extraction: crop each record, undo rotation, re-pad onto the original frame canvas; atlases run concurrently
//! - Batch drivers: `generate_atlases` walks leaf folders sequentially, `extract_atlases` fans out over a worker pool
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use sprite_atlas_core::{InputImage, PackConfig, pack_images, to_atlas_xml};
//! # fn main() -> anyhow::Result<()> {
//! let a = ImageReader::open("hero/idle_0.png")?.decode()?;
//! let b = ImageReader::open("hero/idle_1.png")?.decode()?;
//! let inputs = vec![
//!   InputImage { name: "idle_0".into(), source: None, image: a },
//!   InputImage { name: "idle_1".into(), source: None, image: b },
//! ];
//! let out = pack_images("hero", inputs, &PackConfig::default())?;
//! out.rgba.save("hero.png")?;
//! std::fs::write("hero.xml", to_atlas_xml(&out.atlas, None))?;
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod dedup;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod generate;
pub mod imageio;
pub mod metadata;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod scheduler;
pub mod trim;

pub use config::*;
pub use error::*;
pub use extract::{restore_frame, sanitize_file_name};
pub use generate::{generate_atlases, plan_atlases};
pub use metadata::{ParsedAtlas, parse_atlas_xml, read_atlas_xml, to_atlas_xml};
pub use model::*;
pub use pipeline::*;
pub use progress::{NoProgress, ProgressEvent, ProgressObserver};
pub use report::*;
pub use scheduler::{extract_atlases, run_extraction};

/// Convenience prelude for common types and functions.
/// Importing `sprite_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{ExtractConfig, PackConfig};
    pub use crate::discovery::{ExtractionTask, SourceFolder};
    pub use crate::model::{Atlas, Frame, PackStats, PlacementRecord, Rect};
    pub use crate::packer::shelf::{ShelfLayout, ShelfPacker};
    pub use crate::progress::{NoProgress, ProgressEvent, ProgressObserver};
    pub use crate::report::{ExtractReport, GenerateReport};
    pub use crate::{
        InputImage, PackOutput, extract_atlases, generate_atlases, pack_images, parse_atlas_xml,
        restore_frame, to_atlas_xml,
    };
}
