use std::path::PathBuf;

use serde::Serialize;

use crate::model::PackStats;

/// One folder or task that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub path: PathBuf,
    pub error: String,
}

/// Result of packing one source folder.
#[derive(Debug, Clone, Serialize)]
pub struct AtlasSummary {
    pub folder: PathBuf,
    pub name: String,
    /// `None` on dry runs.
    pub image_path: Option<PathBuf>,
    pub metadata_path: Option<PathBuf>,
    pub sidecar_path: Option<PathBuf>,
    pub attempts: u32,
    pub stats: PackStats,
}

/// Outcome of a whole packing batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateReport {
    pub packed: Vec<AtlasSummary>,
    pub failed: Vec<Failure>,
    /// Folders holding images next to image-bearing subfolders; not packed.
    pub skipped: Vec<PathBuf>,
}

impl GenerateReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        let frames: usize = self.packed.iter().map(|s| s.stats.total_frames).sum();
        format!(
            "Atlases: {}, Frames: {}, Failed: {}, Skipped: {}",
            self.packed.len(),
            frames,
            self.failed.len(),
            self.skipped.len(),
        )
    }
}

/// Result of extracting one atlas.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub image_path: PathBuf,
    pub metadata_path: PathBuf,
    pub output_dir: PathBuf,
    pub frames: usize,
}

/// Outcome of a whole extraction batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractReport {
    pub extracted: Vec<TaskSummary>,
    pub failed: Vec<Failure>,
    /// Frames written across all tasks, failed ones included.
    pub frames_written: usize,
}

impl ExtractReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Atlases: {}, Frames: {}, Failed: {}",
            self.extracted.len(),
            self.frames_written,
            self.failed.len(),
        )
    }
}
