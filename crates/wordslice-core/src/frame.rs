//! Frame extraction - the (page, polygon) -> binary word frame transform.
//!
//! For each annotated word polygon the extractor crops the page to the
//! polygon's bounding box, binarizes the crop with a per-crop Otsu
//! threshold, masks out everything outside the polygon, inverts the result,
//! and resizes it to a canonical resolution with nearest-neighbor sampling.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::drawing::draw_polygon_mut;
use tracing::debug;

use crate::error::{GeometryError, Result, ThresholdError};
use crate::geometry::{to_crop_local, BoundingBox, Polygon};

/// Background pixel value in an extracted frame.
pub const BACKGROUND: u8 = 255;
/// Ink pixel value in an extracted frame.
pub const INK: u8 = 0;

/// A normalized, fixed-size binary word image.
///
/// The raster holds exactly two values: [`BACKGROUND`] (255) and [`INK`]
/// (0). Background is the numerically high value: after ink and polygon
/// mask are combined, the result is inverted. The downstream consumer
/// relies on this polarity, so it is a fixed contract of the type.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Identifier of the source annotation.
    pub id: String,
    /// The binary raster, `target_width x target_height`.
    pub raster: GrayImage,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }
}

/// Extracts canonical binary frames from grayscale page images.
///
/// Extraction is deterministic and purely CPU-bound; one extractor can be
/// shared across threads and invocations are independent, so callers may
/// fan out one task per (page, polygon) pair.
#[derive(Debug, Clone, Copy)]
pub struct FrameExtractor {
    target_width: u32,
    target_height: u32,
}

impl FrameExtractor {
    /// Create an extractor with the default 600x120 output resolution.
    pub fn new() -> Self {
        Self {
            target_width: 600,
            target_height: 120,
        }
    }

    /// Set the canonical output resolution. Both dimensions must be
    /// positive; zero is clamped to one.
    pub fn with_target_size(mut self, width: u32, height: u32) -> Self {
        self.target_width = width.max(1);
        self.target_height = height.max(1);
        self
    }

    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    pub fn target_height(&self) -> u32 {
        self.target_height
    }

    /// Extract the frame for one polygon annotation.
    ///
    /// Fails with a [`GeometryError`] if the polygon's bounding box is
    /// degenerate or entirely outside the page, and with a
    /// [`ThresholdError`] if the cropped region has uniform intensity.
    pub fn extract(&self, page: &GrayImage, polygon: &Polygon, id: &str) -> Result<Frame> {
        let bounds = self.clipped_bounds(page, polygon, id)?;
        debug!(
            id,
            x_min = bounds.x_min,
            y_min = bounds.y_min,
            width = bounds.width(),
            height = bounds.height(),
            "Cropping word region"
        );

        let crop = imageops::crop_imm(
            page,
            bounds.x_min as u32,
            bounds.y_min as u32,
            bounds.width() as u32,
            bounds.height() as u32,
        )
        .to_image();

        let threshold = crop_threshold(&crop, id)?;
        debug!(id, threshold, "Otsu threshold computed");

        let mask = rasterize_mask(&to_crop_local(polygon, &bounds), crop.width(), crop.height());
        let composed = compose(&crop, threshold, &mask);

        let raster = imageops::resize(
            &composed,
            self.target_width,
            self.target_height,
            FilterType::Nearest,
        );

        Ok(Frame {
            id: id.to_string(),
            raster,
        })
    }

    fn clipped_bounds(
        &self,
        page: &GrayImage,
        polygon: &Polygon,
        id: &str,
    ) -> Result<BoundingBox> {
        let bounds = polygon.bounding_box();
        if bounds.is_empty() {
            return Err(GeometryError::DegenerateBox { id: id.to_string() }.into());
        }

        let clipped = bounds.clip(page.width(), page.height());
        if clipped.is_empty() {
            return Err(GeometryError::OutsideImage {
                id: id.to_string(),
                width: page.width(),
                height: page.height(),
            }
            .into());
        }
        Ok(clipped)
    }
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the per-crop Otsu threshold.
///
/// The returned level is the top intensity of the dark (ink) class: a pixel
/// is ink iff its value is `<= level`, i.e. strictly below the class
/// boundary `level + 1`. A uniform crop has no two classes to separate and
/// is rejected.
fn crop_threshold(crop: &GrayImage, id: &str) -> Result<u8> {
    let first = crop.as_raw()[0];
    if crop.as_raw().iter().all(|&v| v == first) {
        return Err(ThresholdError::UniformRegion {
            id: id.to_string(),
            intensity: first,
        }
        .into());
    }
    Ok(otsu_level(crop))
}

/// Rasterize the crop-local polygon as a filled mask (255 inside, boundary
/// included, 0 outside).
///
/// Vertices may fall outside the crop after clipping; drawing clips to the
/// canvas, so those mask pixels are dropped naturally. The fill is a
/// general scanline fill, so non-convex and self-intersecting polygons are
/// handled.
fn rasterize_mask(local: &Polygon, width: u32, height: u32) -> GrayImage {
    let mut vertices: Vec<imageproc::point::Point<i32>> = local
        .points()
        .iter()
        .map(|p| imageproc::point::Point::new(p.x as i32, p.y as i32))
        .collect();
    vertices.dedup();
    // The drawing routine treats the contour as implicitly closed and
    // rejects an explicit closing vertex.
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }

    let mut mask = GrayImage::new(width, height);
    if !vertices.is_empty() {
        draw_polygon_mut(&mut mask, &vertices, Luma([255u8]));
    }
    mask
}

/// Combine ink and mask, then invert: a pixel is ink in the output only if
/// it was below threshold and inside the polygon.
fn compose(crop: &GrayImage, threshold: u8, mask: &GrayImage) -> GrayImage {
    let mut out = GrayImage::new(crop.width(), crop.height());
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let ink = crop.get_pixel(x, y)[0] <= threshold;
        let inside = mask.get_pixel(x, y)[0] != 0;
        *pixel = Luma([if ink && inside { INK } else { BACKGROUND }]);
    }
    out
}
