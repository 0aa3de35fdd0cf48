use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};

use crate::error::{AtlasError, Result};

/// Opens and decodes an image, guessing the format from its content.
pub fn decode_image(path: &Path) -> Result<DynamicImage> {
    let decode = || -> image::ImageResult<DynamicImage> {
        ImageReader::open(path)?.with_guessed_format()?.decode()
    };
    decode().map_err(|source| AtlasError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Lossless PNG encoding of an RGBA buffer.
pub fn encode_png(rgba: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Writes `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    let wrap = |source| AtlasError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::write(path, contents).map_err(wrap)
}
