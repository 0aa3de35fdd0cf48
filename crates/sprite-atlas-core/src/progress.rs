use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::discovery::ExtractionTask;
use crate::error::AtlasError;
use crate::report::AtlasSummary;

/// Batch progress, emitted from the packing loop and from extraction workers.
#[derive(Debug, Clone, Copy)]
pub enum ProgressEvent<'a> {
    FoldersDiscovered {
        count: usize,
    },
    FolderPacked {
        folder: &'a Path,
        summary: &'a AtlasSummary,
    },
    FolderFailed {
        folder: &'a Path,
        error: &'a AtlasError,
    },
    TasksDiscovered {
        tasks: &'a [ExtractionTask],
        total_frames: usize,
    },
    FrameExtracted {
        task: usize,
        task_done: usize,
        overall_done: usize,
    },
    TaskFinished {
        task: usize,
        frames: usize,
    },
    TaskFailed {
        task: usize,
        error: &'a AtlasError,
    },
}

/// Receives [`ProgressEvent`]s. Called concurrently during extraction.
pub trait ProgressObserver: Sync {
    fn on_event(&self, event: ProgressEvent<'_>);
}

impl<F> ProgressObserver for F
where
    F: Fn(ProgressEvent<'_>) + Sync,
{
    fn on_event(&self, event: ProgressEvent<'_>) {
        self(event)
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_event(&self, _event: ProgressEvent<'_>) {}
}

/// Frame counters shared by all extraction workers.
#[derive(Debug)]
pub struct ExtractionProgress {
    overall: AtomicUsize,
    per_task: Vec<AtomicUsize>,
}

impl ExtractionProgress {
    pub fn new(task_count: usize) -> Self {
        Self {
            overall: AtomicUsize::new(0),
            per_task: (0..task_count).map(|_| AtomicUsize::new(0)).collect(),
        }
    }

    /// Counts one finished frame of `task`; returns `(task_done, overall_done)`
    /// as seen by this increment.
    pub fn record_frame(&self, task: usize) -> (usize, usize) {
        let task_done = self
            .per_task
            .get(task)
            .map(|c| c.fetch_add(1, Ordering::Relaxed) + 1)
            .unwrap_or(0);
        let overall_done = self.overall.fetch_add(1, Ordering::Relaxed) + 1;
        (task_done, overall_done)
    }

    pub fn overall(&self) -> usize {
        self.overall.load(Ordering::Relaxed)
    }

    pub fn task(&self, task: usize) -> usize {
        self.per_task
            .get(task)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}
