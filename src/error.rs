use std::path::PathBuf;

use image::ImageError;
use thiserror::Error;

use crate::trim::BBox;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to load image: {0}")]
    Decode(#[source] ImageError),
    #[error("Failed to trim image: {0}")]
    Encode(#[source] ImageError),
    #[error("Cannot read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Image is fully transparent")]
    EmptyImage,
    #[error("Bounding box {bbox:?} lies outside the {width}x{height} source image")]
    BoundsOutsideSource { bbox: BBox, width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
