use std::fs;
use std::path::Path;

use tracing::{error, info, instrument};

use crate::config::PackConfig;
use crate::discovery::{SourceFolder, find_leaf_folders};
use crate::error::{AtlasError, Result};
use crate::imageio::{decode_image, encode_png, write_file};
use crate::metadata::to_atlas_xml;
use crate::pipeline::{InputImage, pack_images};
use crate::progress::{ProgressEvent, ProgressObserver};
use crate::report::{AtlasSummary, Failure, GenerateReport};

/// Decodes every frame of a folder. Any undecodable frame fails the folder.
pub fn load_folder(folder: &SourceFolder) -> Result<Vec<InputImage>> {
    folder
        .images
        .iter()
        .map(|path| {
            let image = decode_image(path)?;
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(InputImage {
                name,
                source: Some(path.clone()),
                image,
            })
        })
        .collect()
}

/// Packs one folder and, unless `output_root` is `None`, writes
/// `<name>.png`, `<name>.xml` and the optional sidecar copy.
///
/// Both files are encoded in memory first, so a folder that fails to pack
/// leaves nothing behind.
pub fn pack_folder(
    folder: &SourceFolder,
    output_root: Option<&Path>,
    cfg: &PackConfig,
) -> Result<AtlasSummary> {
    let inputs = load_folder(folder)?;
    let out = pack_images(&folder.name, inputs, cfg)?;
    let stats = out.stats();

    let mut summary = AtlasSummary {
        folder: folder.dir.clone(),
        name: folder.name.clone(),
        image_path: None,
        metadata_path: None,
        sidecar_path: None,
        attempts: out.attempts,
        stats,
    };
    let Some(output_root) = output_root else {
        return Ok(summary);
    };

    let png = encode_png(&out.rgba)?;
    let xml = to_atlas_xml(&out.atlas, cfg.header_comment.as_deref());
    let out_dir = folder.output_dir(output_root);
    let png_path = out_dir.join(format!("{}.png", folder.name));
    let xml_path = out_dir.join(format!("{}.xml", folder.name));
    write_file(&png_path, png)?;
    write_file(&xml_path, xml)?;
    summary.image_path = Some(png_path);
    summary.metadata_path = Some(xml_path);

    let sidecar = folder.sidecar();
    if cfg.copy_sidecar && sidecar.is_file() {
        let dest = out_dir.join(format!("{}.txt", folder.name));
        fs::copy(&sidecar, &dest).map_err(|source| AtlasError::Write {
            path: dest.clone(),
            source,
        })?;
        summary.sidecar_path = Some(dest);
    }
    Ok(summary)
}

fn run_folders(
    input_root: &Path,
    output_root: Option<&Path>,
    cfg: &PackConfig,
    observer: &dyn ProgressObserver,
) -> Result<GenerateReport> {
    cfg.validate()?;
    let scan = find_leaf_folders(input_root, cfg, output_root)?;
    observer.on_event(ProgressEvent::FoldersDiscovered {
        count: scan.leaves.len(),
    });
    let mut report = GenerateReport {
        failed: scan.failures,
        skipped: scan.non_leaves,
        ..Default::default()
    };
    // Strictly one folder at a time.
    for folder in &scan.leaves {
        match pack_folder(folder, output_root, cfg) {
            Ok(summary) => {
                info!(
                    folder = %folder.dir.display(),
                    size = summary.stats.canvas_size,
                    frames = summary.stats.total_frames,
                    "atlas written"
                );
                observer.on_event(ProgressEvent::FolderPacked {
                    folder: &folder.dir,
                    summary: &summary,
                });
                report.packed.push(summary);
            }
            Err(e) => {
                error!(folder = %folder.dir.display(), error = %e, "skip folder");
                observer.on_event(ProgressEvent::FolderFailed {
                    folder: &folder.dir,
                    error: &e,
                });
                report.failed.push(Failure {
                    path: folder.dir.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}

#[instrument(skip_all, fields(input = %input_root.display(), output = %output_root.display()))]
/// Packs every leaf folder under `input_root` into `output_root`, mirroring
/// the directory tree. A failing folder is logged and reported; the batch
/// carries on.
pub fn generate_atlases(
    input_root: &Path,
    output_root: &Path,
    cfg: &PackConfig,
    observer: &dyn ProgressObserver,
) -> Result<GenerateReport> {
    run_folders(input_root, Some(output_root), cfg, observer)
}

/// Same as [`generate_atlases`] without writing anything.
pub fn plan_atlases(
    input_root: &Path,
    cfg: &PackConfig,
    observer: &dyn ProgressObserver,
) -> Result<GenerateReport> {
    run_folders(input_root, None, cfg, observer)
}
