use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::codec::{self, CodecSession, ImageCodec};
use crate::error::{Error, Result};
use crate::trim;

/// What happened to a single file.
#[derive(Debug)]
pub enum Outcome {
    /// Extension not in the format table.
    Skipped,
    /// Overwritten with a `width` x `height` image.
    Trimmed { width: u32, height: u32 },
    /// Fully transparent; left untouched.
    Empty,
    Failed(Error),
}

/// Per-run tally of outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub trimmed: usize,
    pub empty: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Skipped => self.skipped += 1,
            Outcome::Trimmed { .. } => self.trimmed += 1,
            Outcome::Empty => self.empty += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Recursively visit every regular file under `dir`, depth first, in the
/// order the platform lists them. Symlinks to files are visited; pipes,
/// sockets, devices and broken links are not. Directories that cannot be
/// read are logged and skipped.
pub fn walk(dir: &Path, visit: &mut dyn FnMut(&Path)) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            let error = Error::ReadDir {
                path: dir.to_path_buf(),
                source,
            };
            warn!("{error}");
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!("Skipping unreadable entry in {}: {error}", dir.display());
                continue;
            }
        };

        let path = entry.path();
        // symlinked directories are not followed
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            walk(&path, visit);
            continue;
        }

        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => visit(&path),
            Ok(_) => debug!("Skipping {}: not a regular file", path.display()),
            Err(error) => debug!("Skipping {}: {error}", path.display()),
        }
    }
}

pub struct Trimmer<'a, C: ImageCodec = CodecSession> {
    codec: &'a C,
}

impl<'a, C: ImageCodec> Trimmer<'a, C> {
    pub fn new(codec: &'a C) -> Self {
        Trimmer { codec }
    }

    /// Trim every recognised image under `root`, overwriting each in place.
    pub fn run(&self, root: &Path) -> Summary {
        let mut summary = Summary::default();

        walk(root, &mut |path| {
            let outcome = self.process_file(path);
            summary.record(&outcome);
        });

        info!(
            "Done: {} trimmed, {} fully transparent, {} failed, {} skipped",
            summary.trimmed, summary.empty, summary.failed, summary.skipped
        );
        summary
    }

    /// Run the decode, scan, extract and encode steps for one file. Errors are
    /// logged here and never escape.
    pub fn process_file(&self, path: &Path) -> Outcome {
        let Some(entry) = codec::lookup(path) else {
            debug!("Skipping {}", path.display());
            return Outcome::Skipped;
        };

        match self.trim_file(path, entry) {
            Ok((width, height)) => {
                info!("Success, trimmed size {width} {height}");
                Outcome::Trimmed { width, height }
            }
            Err(Error::EmptyImage) => {
                info!("{} is fully transparent, leaving it as is", path.display());
                Outcome::Empty
            }
            Err(error) => {
                warn!("{}: {error}", path.display());
                Outcome::Failed(error)
            }
        }
    }

    fn trim_file(&self, path: &Path, entry: &codec::FormatEntry) -> Result<(u32, u32)> {
        let decoded = self.codec.decode(path, entry)?;

        info!(
            "File path: {} format: {} pixels: {:?}",
            path.display(),
            decoded
                .format
                .map(|f| format!("{f:?}"))
                .unwrap_or_else(|| "unknown".to_string()),
            decoded.color,
        );

        let (bbox, trimmed) = trim::trim(&decoded.image)?;
        drop(decoded.image);

        let (width, height) = trimmed.dimensions();
        let written = self.codec.encode(trimmed, path, decoded.format)?;
        debug!(?bbox, ?written, "wrote {}", path.display());

        Ok((width, height))
    }
}
