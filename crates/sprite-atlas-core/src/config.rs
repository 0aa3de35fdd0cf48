use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, Result};

/// Packing configuration.
/// Key notes:
///   - `gap` is added on both axes after every frame, including against the canvas edge
///   - the canvas grows by `growth_percent` (integer ceiling) whenever a placement pass overflows
///   - `max_attempts` and `max_canvas_size` bound the grow-and-retry loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackConfig {
    /// Pixels between frames.
    #[serde(default = "default_gap")]
    pub gap: u32,
    /// Canvas growth per overflow, in percent.
    #[serde(default = "default_growth_percent")]
    pub growth_percent: u32,
    /// Maximum number of placement passes per folder.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Largest canvas side the packer may grow to.
    #[serde(default = "default_max_canvas_size")]
    pub max_canvas_size: u32,
    /// File extensions (case-insensitive) treated as frame images.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
    /// Glob patterns on frame file names to leave out.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Cosmetic comment written after the XML declaration.
    #[serde(default = "default_header_comment")]
    pub header_comment: Option<String>,
    /// Copy `<folder>.txt` next to the atlas when present.
    #[serde(default = "default_true")]
    pub copy_sidecar: bool,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            gap: default_gap(),
            growth_percent: default_growth_percent(),
            max_attempts: default_max_attempts(),
            max_canvas_size: default_max_canvas_size(),
            image_extensions: default_image_extensions(),
            exclude: Vec::new(),
            header_comment: default_header_comment(),
            copy_sidecar: true,
        }
    }
}

impl PackConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if growth could stall, the attempt cap is zero, or an
    /// exclude pattern is not a valid glob.
    pub fn validate(&self) -> Result<()> {
        if self.growth_percent == 0 {
            return Err(AtlasError::InvalidConfig(
                "growth_percent must be at least 1".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(AtlasError::InvalidConfig(
                "max_attempts must be at least 1".into(),
            ));
        }
        if self.max_canvas_size == 0 {
            return Err(AtlasError::InvalidConfig(
                "max_canvas_size must be at least 1".into(),
            ));
        }
        if self.image_extensions.is_empty() {
            return Err(AtlasError::InvalidConfig(
                "image_extensions must not be empty".into(),
            ));
        }
        build_globset(&self.exclude)?;
        Ok(())
    }

    /// True if `file_name` carries one of the configured image extensions.
    pub fn is_image_name(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => self
                .image_extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext)),
            _ => false,
        }
    }

    /// Create a fluent builder for `PackConfig`.
    pub fn builder() -> PackConfigBuilder {
        PackConfigBuilder::new()
    }
}

/// Extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Glob patterns on directory names that discovery never enters.
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,
    /// Worker threads; `None` uses the available parallelism.
    #[serde(default)]
    pub workers: Option<usize>,
    /// Write the `<w>x<h>.txt` marker next to the extracted frames.
    #[serde(default = "default_true")]
    pub write_size_marker: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            skip_dirs: default_skip_dirs(),
            workers: None,
            write_size_marker: true,
        }
    }
}

impl ExtractConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(AtlasError::InvalidConfig(
                "workers must be at least 1".into(),
            ));
        }
        build_globset(&self.skip_dirs)?;
        Ok(())
    }

    /// Number of worker threads to run extraction tasks on.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::new()
    }
}

pub(crate) fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)
            .map_err(|e| AtlasError::InvalidConfig(format!("bad pattern {pat:?}: {e}")))?;
        b.add(glob);
    }
    b.build()
        .map_err(|e| AtlasError::InvalidConfig(e.to_string()))
}

fn default_gap() -> u32 {
    10
}
fn default_growth_percent() -> u32 {
    10
}
fn default_max_attempts() -> u32 {
    64
}
fn default_max_canvas_size() -> u32 {
    16384
}
fn default_image_extensions() -> Vec<String> {
    vec!["png".into(), "jpg".into(), "jpeg".into()]
}
fn default_header_comment() -> Option<String> {
    Some("Created with sprite-atlas".into())
}
fn default_skip_dirs() -> Vec<String> {
    vec!["frames".into(), "frames_output".into(), "atlases".into()]
}
fn default_true() -> bool {
    true
}

/// Builder for `PackConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackConfigBuilder {
    cfg: PackConfig,
}

impl PackConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackConfig::default(),
        }
    }
    pub fn gap(mut self, v: u32) -> Self {
        self.cfg.gap = v;
        self
    }
    pub fn growth_percent(mut self, v: u32) -> Self {
        self.cfg.growth_percent = v;
        self
    }
    pub fn max_attempts(mut self, v: u32) -> Self {
        self.cfg.max_attempts = v;
        self
    }
    pub fn max_canvas_size(mut self, v: u32) -> Self {
        self.cfg.max_canvas_size = v;
        self
    }
    pub fn image_extensions(mut self, v: Vec<String>) -> Self {
        self.cfg.image_extensions = v;
        self
    }
    pub fn exclude(mut self, v: Vec<String>) -> Self {
        self.cfg.exclude = v;
        self
    }
    pub fn header_comment(mut self, v: Option<String>) -> Self {
        self.cfg.header_comment = v;
        self
    }
    pub fn copy_sidecar(mut self, v: bool) -> Self {
        self.cfg.copy_sidecar = v;
        self
    }
    pub fn build(self) -> PackConfig {
        self.cfg
    }
}

#[derive(Debug, Default, Clone)]
pub struct ExtractConfigBuilder {
    cfg: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: ExtractConfig::default(),
        }
    }
    pub fn skip_dirs(mut self, v: Vec<String>) -> Self {
        self.cfg.skip_dirs = v;
        self
    }
    pub fn workers(mut self, v: Option<usize>) -> Self {
        self.cfg.workers = v;
        self
    }
    pub fn write_size_marker(mut self, v: bool) -> Self {
        self.cfg.write_size_marker = v;
        self
    }
    pub fn build(self) -> ExtractConfig {
        self.cfg
    }
}
