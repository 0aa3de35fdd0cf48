use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Cannot decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot read directory {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Malformed atlas metadata: {0}")]
    Metadata(String),
    #[error("Could not fit {frames} frames: gave up after {attempts} attempts at canvas size {size}")]
    PackingFailure { frames: usize, attempts: u32, size: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Nothing to pack")]
    Empty,
}

impl AtlasError {
    pub(crate) fn metadata(msg: impl Into<String>) -> Self {
        AtlasError::Metadata(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AtlasError>;
