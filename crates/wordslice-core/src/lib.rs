//! Core library for word-frame extraction from scanned document pages.
//!
//! This crate provides:
//! - Polygon annotations and bounding-box geometry
//! - The frame extractor (crop, Otsu binarization, polygon masking,
//!   nearest-neighbor normalization)
//! - SVG annotation loading
//! - Document/annotation pairing and a pluggable persistence sink

pub mod annotation;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod pairing;
pub mod sink;

pub use annotation::{load_annotations, parse_annotations, WordAnnotation};
pub use config::WordsliceConfig;
pub use error::{
    AnnotationError, GeometryError, PairingError, Result, ThresholdError, WordsliceError,
};
pub use frame::{Frame, FrameExtractor, BACKGROUND, INK};
pub use geometry::{BoundingBox, Point, Polygon};
pub use pairing::{pair_by_stem, DocumentPair};
pub use sink::{FrameSink, PngSink};
