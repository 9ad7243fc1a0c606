//! Extension based format dispatch over the `image` crate.
//!
//! Decoding is picked from a static extension table. Encoding always targets
//! one of [`ENCODERS`]; anything else falls back to PNG.

use std::ffi::OsStr;
use std::path::Path;

use image::{ColorType, DynamicImage, ImageFormat, ImageReader, Limits, RgbaImage};

use crate::error::{Error, Result};

/// How a recognised extension is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decode {
    /// The container has no reliable magic bytes; trust the extension.
    As(ImageFormat),
    /// Let the decoder sniff the container from the file contents.
    Sniff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatEntry {
    pub extension: &'static str,
    pub decode: Decode,
}

/// Extensions the tool picks up. Matching is exact, so `.PNG` is not handled.
pub const FORMATS: &[FormatEntry] = &[
    FormatEntry {
        extension: "tga",
        decode: Decode::As(ImageFormat::Tga),
    },
    FormatEntry {
        extension: "dds",
        decode: Decode::As(ImageFormat::Dds),
    },
    FormatEntry {
        extension: "png",
        decode: Decode::Sniff,
    },
    FormatEntry {
        extension: "bmp",
        decode: Decode::Sniff,
    },
    FormatEntry {
        extension: "jpg",
        decode: Decode::Sniff,
    },
    FormatEntry {
        extension: "jpeg",
        decode: Decode::Sniff,
    },
    // sprite sheets exported by the asset pipeline, usually PNG inside
    FormatEntry {
        extension: "sheet",
        decode: Decode::Sniff,
    },
];

/// Formats a trimmed image can be written back as.
pub const ENCODERS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Bmp,
    ImageFormat::Jpeg,
    ImageFormat::Tga,
];

/// Find the table entry for `path`'s extension.
pub fn lookup(path: &Path) -> Option<&'static FormatEntry> {
    let extension = path.extension().and_then(OsStr::to_str)?;
    FORMATS.iter().find(|entry| entry.extension == extension)
}

/// What trimmed files are written as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Always write PNG bytes, keeping the original file name.
    #[default]
    Png,
    /// Write the format the file was decoded from when it can be encoded,
    /// PNG otherwise.
    Preserve,
}

/// A decoded file, normalised to RGBA8.
pub struct Decoded {
    pub image: RgbaImage,
    /// Pixel format before normalisation.
    pub color: ColorType,
    /// Container format the decoder used.
    pub format: Option<ImageFormat>,
}

/// Process-wide codec state. Open one before walking and drop it afterwards.
pub struct CodecSession {
    output: OutputFormat,
    limits: Limits,
}

impl CodecSession {
    pub fn open(output: OutputFormat) -> Self {
        tracing::debug!(
            formats = FORMATS.len(),
            encoders = ENCODERS.len(),
            ?output,
            "codec session opened"
        );
        CodecSession {
            output,
            limits: Limits::default(),
        }
    }

    /// The format a file decoded as `detected` will be written in.
    pub fn target_format(&self, detected: Option<ImageFormat>) -> ImageFormat {
        match (self.output, detected) {
            (OutputFormat::Png, _) => ImageFormat::Png,
            (OutputFormat::Preserve, Some(format)) if ENCODERS.contains(&format) => format,
            (OutputFormat::Preserve, other) => {
                tracing::warn!(detected = ?other, "cannot encode source format, writing PNG");
                ImageFormat::Png
            }
        }
    }
}

/// The two capabilities the trimming pipeline needs from an image library.
pub trait ImageCodec {
    /// Decode `path` as described by its table entry, normalised to RGBA8.
    fn decode(&self, path: &Path, entry: &FormatEntry) -> Result<Decoded>;

    /// Write `image` over `path`. Returns the format actually written.
    fn encode(
        &self,
        image: RgbaImage,
        path: &Path,
        detected: Option<ImageFormat>,
    ) -> Result<ImageFormat>;
}

impl ImageCodec for CodecSession {
    fn decode(&self, path: &Path, entry: &FormatEntry) -> Result<Decoded> {
        let open_error = |source| Error::Open {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = ImageReader::open(path).map_err(open_error)?;
        match entry.decode {
            Decode::As(format) => reader.set_format(format),
            Decode::Sniff => reader = reader.with_guessed_format().map_err(open_error)?,
        }
        reader.limits(self.limits.clone());

        let format = reader.format();
        let image = reader.decode().map_err(Error::Decode)?;
        let color = image.color();

        Ok(Decoded {
            image: image.into_rgba8(),
            color,
            format,
        })
    }

    fn encode(
        &self,
        image: RgbaImage,
        path: &Path,
        detected: Option<ImageFormat>,
    ) -> Result<ImageFormat> {
        let format = self.target_format(detected);

        let written = match format {
            // no alpha channel in JPEG
            ImageFormat::Jpeg => DynamicImage::ImageRgba8(image)
                .into_rgb8()
                .save_with_format(path, format),
            _ => image.save_with_format(path, format),
        };
        written.map_err(Error::Encode)?;

        Ok(format)
    }
}

impl Drop for CodecSession {
    fn drop(&mut self) {
        tracing::debug!("codec session closed");
    }
}
