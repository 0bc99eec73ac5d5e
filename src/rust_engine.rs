//! Pure Rust imaging engine — zero external dependencies.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Integer shrink | `DynamicImage::resize_exact`, `Triangle` (box-average equivalent) |
//! | Residual affine | `DynamicImage::resize_exact` with the mapped filter |
//! | Crop | `DynamicImage::crop_imm` |
//! | Embed | `RgbaImage` canvas + `imageops::overlay` |
//! | Rotate | `rotate90/180/270` |
//! | Colour normalize | `to_rgb8` (the `image` crate operates in 8-bit sRGB) |
//! | Encode | `JpegEncoder` / `PngEncoder` / `WebPEncoder` |
//!
//! ## Engine-specific notes
//!
//! - **Shrink-on-load** is reported for JPEG but emulated: the `image` crate
//!   does not expose libjpeg-style IDCT scaling, so the coarse reduction runs
//!   immediately after the full decode, producing the same rounded-up
//!   dimensions a block decoder would (`div_ceil`). Callers observe identical
//!   geometry either way.
//! - **Interpolator mapping**: bicubic → `CatmullRom`, bilinear → `Triangle`,
//!   nohalo → `Lanczos3` (the closest kernel this engine offers).
//! - **WebP output** is lossless (the crate's encoder); quality is ignored.
//! - **Interlace** is not supported by these encoders and is ignored;
//!   **strip** is trivially honoured since they write no metadata.

use crate::engine::{Dimensions, EncodeParams, Engine, EngineError, Rotation};
use crate::options::{Extend, Interpolator};
use crate::runtime::Runtime;
use crate::sniff::ImageType;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageFormat, ImageReader, Limits, Rgba, RgbaImage};
use std::io::Cursor;
use tracing::trace;

/// Decoded image plus the EXIF orientation read at decode time, carried
/// through every stage so the rotate stage can consult it late.
#[derive(Debug)]
pub struct RasterImage {
    pixels: DynamicImage,
    orientation: Rotation,
}

/// Pure Rust engine using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustEngine {
    limits: Limits,
}

impl RustEngine {
    /// Build an engine bound to the process-wide [`Runtime`] configuration.
    pub fn new() -> Self {
        let config = Runtime::get().config();
        let mut limits = Limits::default();
        // The closest knob this engine has to a pixel-memory cap is the
        // decode allocation limit.
        limits.max_alloc = Some(config.cache_max_bytes);
        Self { limits }
    }
}

impl Default for RustEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn image_format(format: ImageType) -> ImageFormat {
    match format {
        ImageType::Jpeg => ImageFormat::Jpeg,
        ImageType::Png => ImageFormat::Png,
        ImageType::WebP => ImageFormat::WebP,
    }
}

fn filter(interpolator: Interpolator) -> FilterType {
    match interpolator {
        Interpolator::Bicubic => FilterType::CatmullRom,
        Interpolator::Bilinear => FilterType::Triangle,
        Interpolator::Nohalo => FilterType::Lanczos3,
    }
}

fn rotation_from(orientation: Orientation) -> Rotation {
    match orientation {
        Orientation::Rotate90 => Rotation::Cw90,
        Orientation::Rotate180 => Rotation::Cw180,
        Orientation::Rotate270 => Rotation::Cw270,
        // Mirrored orientations are not honoured, same as plain decoders
        _ => Rotation::None,
    }
}

impl RustEngine {
    fn load(&self, buf: &[u8], format: ImageType) -> Result<RasterImage, EngineError> {
        let mut reader = ImageReader::with_format(Cursor::new(buf), image_format(format));
        reader.limits(self.limits.clone());
        let mut decoder = reader
            .into_decoder()
            .map_err(|e| EngineError::new("decode", e.to_string()))?;
        let orientation = decoder
            .orientation()
            .map(rotation_from)
            .unwrap_or_default();
        let pixels = DynamicImage::from_decoder(decoder)
            .map_err(|e| EngineError::new("decode", e.to_string()))?;
        Ok(RasterImage {
            pixels,
            orientation,
        })
    }
}

impl Engine for RustEngine {
    type Image = RasterImage;

    fn supports_shrink_on_load(&self, format: ImageType) -> bool {
        format == ImageType::Jpeg
    }

    fn decode(&self, buf: &[u8], format: ImageType) -> Result<RasterImage, EngineError> {
        self.load(buf, format)
    }

    fn decode_shrunk(
        &self,
        buf: &[u8],
        format: ImageType,
        shrink: u32,
    ) -> Result<RasterImage, EngineError> {
        let image = self.load(buf, format)?;
        let (w, h) = image.pixels.dimensions();
        // Emulated decode-time shrink: same rounded-up dimensions a block
        // decoder produces.
        let pixels = image.pixels.resize_exact(
            w.div_ceil(shrink).max(1),
            h.div_ceil(shrink).max(1),
            FilterType::Triangle,
        );
        Ok(RasterImage {
            pixels,
            orientation: image.orientation,
        })
    }

    fn dimensions(&self, image: &RasterImage) -> Dimensions {
        let (width, height) = image.pixels.dimensions();
        Dimensions { width, height }
    }

    fn orientation(&self, image: &RasterImage) -> Rotation {
        image.orientation
    }

    fn shrink(
        &self,
        image: RasterImage,
        x_factor: u32,
        y_factor: u32,
    ) -> Result<RasterImage, EngineError> {
        let (w, h) = image.pixels.dimensions();
        let pixels = image.pixels.resize_exact(
            w.div_ceil(x_factor).max(1),
            h.div_ceil(y_factor).max(1),
            FilterType::Triangle,
        );
        Ok(RasterImage {
            pixels,
            orientation: image.orientation,
        })
    }

    fn affine(
        &self,
        image: RasterImage,
        x_scale: f64,
        y_scale: f64,
        interpolator: Interpolator,
    ) -> Result<RasterImage, EngineError> {
        let (w, h) = image.pixels.dimensions();
        let out_w = ((w as f64 * x_scale).round() as u32).max(1);
        let out_h = ((h as f64 * y_scale).round() as u32).max(1);
        let pixels = image.pixels.resize_exact(out_w, out_h, filter(interpolator));
        Ok(RasterImage {
            pixels,
            orientation: image.orientation,
        })
    }

    fn extract_area(
        &self,
        image: RasterImage,
        left: u32,
        top: u32,
        width: u32,
        height: u32,
    ) -> Result<RasterImage, EngineError> {
        let (w, h) = image.pixels.dimensions();
        if left + width > w || top + height > h {
            return Err(EngineError::new(
                "extract_area",
                format!("area {width}x{height}+{left}+{top} outside {w}x{h} canvas"),
            ));
        }
        Ok(RasterImage {
            pixels: image.pixels.crop_imm(left, top, width, height),
            orientation: image.orientation,
        })
    }

    fn embed(
        &self,
        image: RasterImage,
        left: u32,
        top: u32,
        width: u32,
        height: u32,
        extend: Extend,
    ) -> Result<RasterImage, EngineError> {
        let background = match extend {
            Extend::Black => Rgba([0, 0, 0, 255]),
            Extend::White => Rgba([255, 255, 255, 255]),
        };
        let mut canvas = RgbaImage::from_pixel(width, height, background);
        image::imageops::overlay(&mut canvas, &image.pixels.to_rgba8(), left as i64, top as i64);
        Ok(RasterImage {
            pixels: DynamicImage::ImageRgba8(canvas),
            orientation: image.orientation,
        })
    }

    fn rotate(&self, image: RasterImage, rotation: Rotation) -> Result<RasterImage, EngineError> {
        let pixels = match rotation {
            Rotation::None => image.pixels,
            Rotation::Cw90 => image.pixels.rotate90(),
            Rotation::Cw180 => image.pixels.rotate180(),
            Rotation::Cw270 => image.pixels.rotate270(),
        };
        // The rotation is consumed; downstream queries see an upright image.
        Ok(RasterImage {
            pixels,
            orientation: Rotation::None,
        })
    }

    fn to_srgb(&self, image: RasterImage) -> Result<RasterImage, EngineError> {
        // This engine already works in 8-bit sRGB; normalizing means
        // flattening to RGB8 so every encoder accepts the buffer.
        Ok(RasterImage {
            pixels: DynamicImage::ImageRgb8(image.pixels.to_rgb8()),
            orientation: image.orientation,
        })
    }

    fn encode(&self, image: RasterImage, params: &EncodeParams) -> Result<Vec<u8>, EngineError> {
        if params.interlace {
            trace!("interlaced output not supported by this engine, ignoring");
        }
        let mut out = Cursor::new(Vec::new());
        match params.format {
            ImageType::Jpeg => {
                let encoder =
                    JpegEncoder::new_with_quality(&mut out, params.quality.value() as u8);
                image
                    .pixels
                    .write_with_encoder(encoder)
                    .map_err(|e| EngineError::new("encode", e.to_string()))?;
            }
            ImageType::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut out,
                    CompressionType::Default,
                    PngFilterType::Adaptive,
                );
                image
                    .pixels
                    .write_with_encoder(encoder)
                    .map_err(|e| EngineError::new("encode", e.to_string()))?;
            }
            ImageType::WebP => {
                let encoder = WebPEncoder::new_lossless(&mut out);
                image
                    .pixels
                    .write_with_encoder(encoder)
                    .map_err(|e| EngineError::new("encode", e.to_string()))?;
            }
        }
        Ok(out.into_inner())
    }
}
