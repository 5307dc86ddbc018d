//! Persistence of extracted frames.
//!
//! The extractor itself never touches the filesystem; storage is an
//! injected capability so the core stays free of I/O assumptions.

use std::path::PathBuf;

use tracing::debug;

use crate::error::Result;
use crate::frame::Frame;

/// Destination for extracted frames, keyed by source document.
pub trait FrameSink {
    /// Store one frame under the given document grouping key.
    fn store(&self, document_key: &str, frame: &Frame) -> Result<()>;
}

/// Writes frames as PNG files, one directory per document:
/// `<root>/<document_key>/<id>.png`.
#[derive(Debug, Clone)]
pub struct PngSink {
    root: PathBuf,
}

impl PngSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl FrameSink for PngSink {
    fn store(&self, document_key: &str, frame: &Frame) -> Result<()> {
        let dir = self.root.join(document_key);
        // Idempotent: create_dir_all succeeds if the directory exists.
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.png", frame.id));
        frame.raster.save(&path)?;
        debug!(path = %path.display(), "Frame written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn sample_frame(id: &str) -> Frame {
        Frame {
            id: id.to_string(),
            raster: GrayImage::from_pixel(8, 4, Luma([255u8])),
        }
    }

    #[test]
    fn writes_png_under_document_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = PngSink::new(dir.path());

        sink.store("page-270", &sample_frame("270-01-01")).unwrap();

        let path = dir.path().join("page-270").join("270-01-01.png");
        assert!(path.is_file());

        let reloaded = image::open(&path).unwrap().to_luma8();
        assert_eq!(reloaded.dimensions(), (8, 4));
    }

    #[test]
    fn storing_twice_overwrites_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = PngSink::new(dir.path());

        sink.store("doc", &sample_frame("w1")).unwrap();
        sink.store("doc", &sample_frame("w1")).unwrap();

        assert!(dir.path().join("doc").join("w1.png").is_file());
    }
}
