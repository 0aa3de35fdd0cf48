use std::path::{Path, PathBuf};

use tracing::{error, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::ExtractConfig;
use crate::discovery::{ExtractionTask, find_extraction_tasks};
use crate::error::Result;
use crate::extract::extract_task;
use crate::progress::{ExtractionProgress, ProgressEvent, ProgressObserver};
use crate::report::{ExtractReport, Failure, TaskSummary};

/// Folder name used for extraction output when none is given.
pub const DEFAULT_FRAMES_DIR: &str = "frames";

fn run_one(
    task: &ExtractionTask,
    output_root: &Path,
    cfg: &ExtractConfig,
    progress: &ExtractionProgress,
    observer: &dyn ProgressObserver,
) -> Result<TaskSummary> {
    let result = extract_task(task, output_root, cfg, progress, observer);
    match &result {
        Ok(summary) => {
            info!(atlas = %task.image_path.display(), frames = summary.frames, "atlas extracted");
            observer.on_event(ProgressEvent::TaskFinished {
                task: task.index,
                frames: summary.frames,
            });
        }
        Err(e) => {
            error!(atlas = %task.image_path.display(), error = %e, "extraction failed");
            observer.on_event(ProgressEvent::TaskFailed {
                task: task.index,
                error: e,
            });
        }
    }
    result
}

/// Runs `tasks` on a worker pool of `cfg.worker_count()` threads.
///
/// Frames of one task are written in order by a single worker; tasks share
/// nothing but the progress counters. A failing task does not stop the others.
pub fn run_extraction(
    tasks: &[ExtractionTask],
    output_root: &Path,
    cfg: &ExtractConfig,
    observer: &dyn ProgressObserver,
) -> Result<ExtractReport> {
    cfg.validate()?;
    let progress = ExtractionProgress::new(tasks.len());

    let outcomes: Vec<Result<TaskSummary>>;
    #[cfg(feature = "parallel")]
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cfg.worker_count())
            .build()
            .map_err(|e| crate::error::AtlasError::InvalidConfig(e.to_string()))?;
        outcomes = pool.install(|| {
            tasks
                .par_iter()
                .map(|t| run_one(t, output_root, cfg, &progress, observer))
                .collect()
        });
    }
    #[cfg(not(feature = "parallel"))]
    {
        outcomes = tasks
            .iter()
            .map(|t| run_one(t, output_root, cfg, &progress, observer))
            .collect();
    }

    let mut report = ExtractReport::default();
    for (task, outcome) in tasks.iter().zip(outcomes) {
        match outcome {
            Ok(summary) => report.extracted.push(summary),
            Err(e) => report.failed.push(Failure {
                path: task.image_path.clone(),
                error: e.to_string(),
            }),
        }
    }
    report.frames_written = progress.overall();
    Ok(report)
}

#[instrument(skip_all, fields(input = %input_root.display()))]
/// Discovers atlas/metadata pairs under `input_root` and extracts them all.
///
/// Output defaults to `<input_root>/frames`; the output root is never
/// scanned as input. Pairs with malformed metadata and unreadable
/// subdirectories are reported as failures; an unreadable `input_root` is an
/// error.
pub fn extract_atlases(
    input_root: &Path,
    output_root: Option<&Path>,
    cfg: &ExtractConfig,
    observer: &dyn ProgressObserver,
) -> Result<ExtractReport> {
    cfg.validate()?;
    let output_root: PathBuf = output_root
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input_root.join(DEFAULT_FRAMES_DIR));
    let scan = find_extraction_tasks(input_root, cfg, Some(&output_root))?;
    std::fs::create_dir_all(&output_root)?;
    observer.on_event(ProgressEvent::TasksDiscovered {
        tasks: &scan.tasks,
        total_frames: scan.total_frames(),
    });
    let mut report = run_extraction(&scan.tasks, &output_root, cfg, observer)?;
    let mut failed = scan.failures;
    failed.append(&mut report.failed);
    report.failed = failed;
    Ok(report)
}
