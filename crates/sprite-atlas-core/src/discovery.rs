use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use tracing::{error, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::{ExtractConfig, PackConfig, build_globset};
use crate::error::{AtlasError, Result};
use crate::metadata::read_atlas_xml;
use crate::model::PlacementRecord;
use crate::report::Failure;

/// A folder whose images become one atlas.
#[derive(Debug, Clone)]
pub struct SourceFolder {
    pub dir: PathBuf,
    /// `dir` relative to the input root (empty for the root itself).
    pub relative: PathBuf,
    /// Folder name: `imagePath` and output base name.
    pub name: String,
    /// Frame files sorted by file name.
    pub images: Vec<PathBuf>,
}

impl SourceFolder {
    /// Directory receiving `<name>.png`, `<name>.xml` and the sidecar.
    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        match self.relative.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => output_root.join(parent),
            _ => output_root.to_path_buf(),
        }
    }

    pub fn sidecar(&self) -> PathBuf {
        self.dir.join(format!("{}.txt", self.name))
    }
}

/// Leaf folders found under the input root.
#[derive(Debug, Clone, Default)]
pub struct FolderScan {
    pub leaves: Vec<SourceFolder>,
    /// Folders with images of their own and image-bearing subfolders.
    pub non_leaves: Vec<PathBuf>,
    /// Entries the walk could not read.
    pub failures: Vec<Failure>,
}

fn same_dir(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn folder_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            dir.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "atlas".to_string())
}

/// Entries under a root, plus the subtrees that could not be read.
struct Walk {
    entries: Vec<DirEntry>,
    failures: Vec<Failure>,
}

/// Walks `root` in file-name order. An unreadable root is an error; an
/// unreadable entry below it becomes a failure and its subtree is skipped.
fn walk_entries(root: &Path, skip: &GlobSet, exclude_dir: Option<&Path>) -> Result<Walk> {
    let mut walk = Walk {
        entries: Vec::new(),
        failures: Vec::new(),
    };
    let iter = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            if skip.is_match(Path::new(e.file_name())) {
                return false;
            }
            !exclude_dir.is_some_and(|ex| same_dir(e.path(), ex))
        });
    for entry in iter {
        match entry {
            Ok(e) => walk.entries.push(e),
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                if e.depth() == 0 {
                    return Err(AtlasError::Walk { path, source: e });
                }
                warn!(path = %path.display(), error = %e, "skip unreadable entry");
                walk.failures.push(Failure {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }
    Ok(walk)
}

/// Finds the folders to pack under `root`.
///
/// A folder qualifies when it directly holds at least one frame image and
/// none of its descendants do. `exclude_dir` (typically the output root) is
/// never entered.
pub fn find_leaf_folders(
    root: &Path,
    cfg: &PackConfig,
    exclude_dir: Option<&Path>,
) -> Result<FolderScan> {
    let exclude = build_globset(&cfg.exclude)?;
    let no_skip = GlobSet::empty();
    let walk = walk_entries(root, &no_skip, exclude_dir)?;
    let mut by_dir: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for entry in walk.entries {
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if !cfg.is_image_name(&file_name) || exclude.is_match(Path::new(entry.file_name())) {
            continue;
        }
        if let Some(parent) = entry.path().parent() {
            by_dir
                .entry(parent.to_path_buf())
                .or_default()
                .push(entry.path().to_path_buf());
        }
    }

    let dirs: Vec<PathBuf> = by_dir.keys().cloned().collect();
    let mut scan = FolderScan {
        failures: walk.failures,
        ..Default::default()
    };
    for (dir, mut images) in by_dir {
        let has_image_descendant = dirs.iter().any(|d| d != &dir && d.starts_with(&dir));
        if has_image_descendant {
            warn!(folder = %dir.display(), images = images.len(), "folder has image subfolders, not packed");
            scan.non_leaves.push(dir);
            continue;
        }
        images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        let relative = dir.strip_prefix(root).unwrap_or(&dir).to_path_buf();
        let name = folder_name(&dir);
        scan.leaves.push(SourceFolder {
            dir,
            relative,
            name,
            images,
        });
    }
    Ok(scan)
}

/// One atlas/metadata pair to extract.
#[derive(Debug, Clone)]
pub struct ExtractionTask {
    pub index: usize,
    pub image_path: PathBuf,
    pub metadata_path: PathBuf,
    /// Directory of the pair relative to the input root.
    pub relative_dir: PathBuf,
    /// File stem shared by the pair.
    pub base: String,
    pub records: Vec<PlacementRecord>,
}

impl ExtractionTask {
    pub fn frame_count(&self) -> usize {
        self.records.len()
    }

    /// `<output_root>/<relative_dir>/<base>/`
    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.relative_dir).join(&self.base)
    }
}

/// Extraction tasks found under a root, plus pairs whose metadata did not
/// parse and entries the walk could not read.
#[derive(Debug, Clone, Default)]
pub struct TaskScan {
    pub tasks: Vec<ExtractionTask>,
    pub failures: Vec<Failure>,
}

impl TaskScan {
    pub fn total_frames(&self) -> usize {
        self.tasks.iter().map(ExtractionTask::frame_count).sum()
    }
}

/// Collects every `<base>.png` with a sibling `<base>.xml` under `root`,
/// skipping directories named by `cfg.skip_dirs` and `exclude_dir`.
///
/// Metadata is parsed here once; a pair whose metadata is malformed becomes
/// a failure instead of a task.
pub fn find_extraction_tasks(
    root: &Path,
    cfg: &ExtractConfig,
    exclude_dir: Option<&Path>,
) -> Result<TaskScan> {
    let skip = build_globset(&cfg.skip_dirs)?;
    let walk = walk_entries(root, &skip, exclude_dir)?;
    let mut scan = TaskScan {
        failures: walk.failures,
        ..Default::default()
    };
    for entry in walk.entries {
        let path = entry.path();
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if !entry.file_type().is_file() || !is_png {
            continue;
        }
        let metadata_path = path.with_extension("xml");
        if !metadata_path.is_file() {
            continue;
        }
        let records = match read_atlas_xml(&metadata_path) {
            Ok(parsed) => parsed.records,
            Err(e) => {
                error!(path = %metadata_path.display(), error = %e, "skip atlas with bad metadata");
                scan.failures.push(Failure {
                    path: metadata_path,
                    error: e.to_string(),
                });
                continue;
            }
        };
        let relative_dir = path
            .parent()
            .and_then(|p| p.strip_prefix(root).ok())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let base = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        scan.tasks.push(ExtractionTask {
            index: scan.tasks.len(),
            image_path: path.to_path_buf(),
            metadata_path,
            relative_dir,
            base,
            records,
        });
    }
    Ok(scan)
}
