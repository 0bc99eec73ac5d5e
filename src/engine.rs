//! Imaging engine boundary.
//!
//! The [`Engine`] trait is everything the pipeline needs from the imaging
//! library that does the actual pixel work: decode, block shrink, affine
//! resample, area extract, embed, rotate, colourspace, encode. The pipeline
//! never inspects pixels — it only queries dimensions and requests stage
//! transforms.
//!
//! Image handles are **move-only**: every transform takes its input
//! `Self::Image` by value and returns a new one, so the type system enforces
//! that exactly one handle is live at a time, and `Drop` is the release.
//! An error mid-pipeline cannot leak a handle.
//!
//! The production implementation is
//! [`RustEngine`](crate::rust_engine::RustEngine) — pure Rust on the `image`
//! crate, statically linked. Tests use the recording `MockEngine` below.

use crate::options::{Extend, Interpolator, Quality};
use crate::sniff::ImageType;
use thiserror::Error;

/// Diagnostic from a failed engine operation.
///
/// Engines report failures as owned values, never through shared error
/// state, so nothing needs clearing between requests on the same worker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{op}: {message}")]
pub struct EngineError {
    /// Name of the engine operation that failed.
    pub op: &'static str,
    pub message: String,
}

impl EngineError {
    pub fn new(op: &'static str, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
        }
    }
}

/// Pixel dimensions of a decoded image. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// EXIF orientation reduced to the rotations the pipeline honours.
///
/// Mirrored orientations decode as `None` — rotation plus mirror is rare
/// enough that the historical implementations never bothered either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

/// Encode-stage parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    /// Output codec; the pipeline re-encodes to the sniffed input format.
    pub format: ImageType,
    pub quality: Quality,
    /// Progressive/interlaced output, where the codec supports it.
    pub interlace: bool,
    /// Drop metadata from the output.
    pub strip: bool,
}

/// Trait for imaging engines.
///
/// Transform methods consume the image and return a replacement, mirroring
/// the one-live-handle discipline of native imaging libraries. `dimensions`
/// and `orientation` are the only queries; everything else is a stage.
pub trait Engine {
    /// Opaque image handle. The pipeline never looks inside.
    type Image;

    /// Can this format's decoder perform a coarse power-of-two downscale
    /// during decode? Capability declaration, not a format switch: a new
    /// format answers here instead of growing branches in the pipeline.
    fn supports_shrink_on_load(&self, format: ImageType) -> bool;

    fn decode(&self, buf: &[u8], format: ImageType) -> Result<Self::Image, EngineError>;

    /// Decode with a decode-time shrink of `shrink` (2, 4 or 8). Only called
    /// when [`supports_shrink_on_load`](Self::supports_shrink_on_load)
    /// answered true for `format`.
    fn decode_shrunk(
        &self,
        buf: &[u8],
        format: ImageType,
        shrink: u32,
    ) -> Result<Self::Image, EngineError>;

    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Embedded EXIF orientation, if any.
    fn orientation(&self, image: &Self::Image) -> Rotation;

    /// Block-average reduction by integer factors per axis.
    fn shrink(
        &self,
        image: Self::Image,
        x_factor: u32,
        y_factor: u32,
    ) -> Result<Self::Image, EngineError>;

    /// Affine resample by fractional scales through the named interpolator.
    fn affine(
        &self,
        image: Self::Image,
        x_scale: f64,
        y_scale: f64,
        interpolator: Interpolator,
    ) -> Result<Self::Image, EngineError>;

    /// Extract exactly `width`×`height` starting at `(left, top)`. The caller
    /// guarantees the area lies within the canvas.
    fn extract_area(
        &self,
        image: Self::Image,
        left: u32,
        top: u32,
        width: u32,
        height: u32,
    ) -> Result<Self::Image, EngineError>;

    /// Place the image at `(left, top)` on a `width`×`height` canvas filled
    /// with the `extend` background.
    fn embed(
        &self,
        image: Self::Image,
        left: u32,
        top: u32,
        width: u32,
        height: u32,
        extend: Extend,
    ) -> Result<Self::Image, EngineError>;

    fn rotate(&self, image: Self::Image, rotation: Rotation) -> Result<Self::Image, EngineError>;

    /// Force the image into the standard output colour space (sRGB).
    fn to_srgb(&self, image: Self::Image) -> Result<Self::Image, EngineError>;

    fn encode(&self, image: Self::Image, params: &EncodeParams) -> Result<Vec<u8>, EngineError>;
}
