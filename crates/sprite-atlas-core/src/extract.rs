use std::path::Path;

use image::{ImageFormat, RgbaImage};
use tracing::debug;

use crate::compositing::{blit_rgba, crop_rgba, rotate_ccw};
use crate::config::ExtractConfig;
use crate::discovery::ExtractionTask;
use crate::error::{AtlasError, Result};
use crate::imageio::{decode_image, write_file};
use crate::model::PlacementRecord;
use crate::progress::{ExtractionProgress, ProgressEvent, ProgressObserver};
use crate::report::TaskSummary;

const ILLEGAL_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replaces characters that are not allowed in file names with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_FILE_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Rebuilds the untrimmed frame of `record` from the atlas.
///
/// The result is always `frame_width x frame_height`, whatever the size of
/// the cropped region.
pub fn restore_frame(atlas: &RgbaImage, record: &PlacementRecord) -> RgbaImage {
    let mut crop = crop_rgba(atlas, record.rect());
    if record.rotated {
        crop = rotate_ccw(&crop);
    }
    let mut frame = RgbaImage::new(record.frame_width, record.frame_height);
    let (px, py) = record.paste_offset();
    blit_rgba(&crop, &mut frame, px as i64, py as i64);
    frame
}

/// Name of the per-atlas size marker file.
pub fn size_marker_name(width: u32, height: u32) -> String {
    format!("{width}x{height}.txt")
}

/// Extracts every frame of one task, in record order, into
/// `<output_root>/<relative_dir>/<base>/`.
pub fn extract_task(
    task: &ExtractionTask,
    output_root: &Path,
    cfg: &ExtractConfig,
    progress: &ExtractionProgress,
    observer: &dyn ProgressObserver,
) -> Result<TaskSummary> {
    let atlas = decode_image(&task.image_path)?.to_rgba8();
    let (w, h) = atlas.dimensions();
    let out_dir = task.output_dir(output_root);
    std::fs::create_dir_all(&out_dir).map_err(|source| AtlasError::Write {
        path: out_dir.clone(),
        source,
    })?;

    if cfg.write_size_marker {
        write_file(
            &out_dir.join(size_marker_name(w, h)),
            format!("Original atlas dimensions: {w}x{h}"),
        )?;
    }

    for record in &task.records {
        let frame = restore_frame(&atlas, record);
        let path = out_dir.join(format!("{}.png", sanitize_file_name(&record.name)));
        frame.save_with_format(&path, ImageFormat::Png)?;
        let (task_done, overall_done) = progress.record_frame(task.index);
        observer.on_event(ProgressEvent::FrameExtracted {
            task: task.index,
            task_done,
            overall_done,
        });
    }
    debug!(atlas = %task.image_path.display(), frames = task.records.len(), "frames extracted");

    Ok(TaskSummary {
        image_path: task.image_path.clone(),
        metadata_path: task.metadata_path.clone(),
        output_dir: out_dir,
        frames: task.records.len(),
    })
}
