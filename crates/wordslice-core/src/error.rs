//! Error types for the wordslice-core library.

use thiserror::Error;

/// Main error type for the wordslice library.
#[derive(Error, Debug)]
pub enum WordsliceError {
    /// Polygon geometry error.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Thresholding error.
    #[error("threshold error: {0}")]
    Threshold(#[from] ThresholdError),

    /// Document/annotation pairing error.
    #[error("pairing error: {0}")]
    Pairing(#[from] PairingError),

    /// Annotation parsing error.
    #[error("annotation error: {0}")]
    Annotation(#[from] AnnotationError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to polygon geometry and bounding boxes.
#[derive(Error, Debug)]
pub enum GeometryError {
    /// A polygon needs at least three vertices.
    #[error("polygon has {0} vertices, need at least 3")]
    TooFewVertices(usize),

    /// A vertex coordinate is NaN or infinite.
    #[error("polygon contains a non-finite coordinate")]
    NonFiniteCoordinate,

    /// The bounding box collapsed to zero width or height.
    #[error("degenerate bounding box for polygon '{id}'")]
    DegenerateBox { id: String },

    /// The bounding box lies entirely outside the image.
    #[error("polygon '{id}' lies outside the {width}x{height} image")]
    OutsideImage { id: String, width: u32, height: u32 },
}

/// Errors related to adaptive thresholding.
#[derive(Error, Debug)]
pub enum ThresholdError {
    /// The cropped region has a single intensity value, so Otsu's method
    /// cannot split it into two classes.
    #[error("uniform intensity {intensity} in crop for polygon '{id}'")]
    UniformRegion { id: String, intensity: u8 },
}

/// Errors related to pairing document images with annotation files.
#[derive(Error, Debug)]
pub enum PairingError {
    /// Image and annotation file counts differ.
    #[error("found {images} images but {annotations} annotation files")]
    CountMismatch { images: usize, annotations: usize },

    /// A file on one side has no stem-matched counterpart on the other.
    #[error("no matching annotation for document '{stem}'")]
    MissingAnnotation { stem: String },

    /// An annotation file has no stem-matched document image.
    #[error("no matching document for annotation '{stem}'")]
    MissingDocument { stem: String },
}

/// Errors related to SVG annotation parsing.
#[derive(Error, Debug)]
pub enum AnnotationError {
    /// The XML structure could not be read.
    #[error("malformed SVG: {0}")]
    Xml(String),

    /// A path or polygon element is missing its id attribute.
    #[error("annotation element {index} has no id attribute")]
    MissingId { index: usize },

    /// Path data contained a command outside the supported subset.
    #[error("unsupported path command '{command}' in annotation '{id}'")]
    UnsupportedCommand { id: String, command: char },

    /// Path or points data could not be parsed as coordinates.
    #[error("malformed coordinate data in annotation '{id}': {reason}")]
    BadCoordinates { id: String, reason: String },
}

/// Result type for the wordslice library.
pub type Result<T> = std::result::Result<T, WordsliceError>;
