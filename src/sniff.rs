//! Content sniffing for the supported input formats.
//!
//! Classification inspects leading bytes only — never the whole buffer.
//! WebP needs a second check beyond the RIFF marker because RIFF is a
//! container shared with WAV/AVI: the fourcc at offset 8 must read `WEBP`.

use crate::error::ResizeError;
use serde::{Deserialize, Serialize};

/// Supported input formats, resolved once before any decode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageType {
    Jpeg,
    Png,
    WebP,
}

impl ImageType {
    pub fn name(self) -> &'static str {
        match self {
            ImageType::Jpeg => "jpeg",
            ImageType::Png => "png",
            ImageType::WebP => "webp",
        }
    }
}

const MARKER_JPEG: &[u8] = &[0xff, 0xd8];
const MARKER_PNG: &[u8] = &[0x89, 0x50];
const MARKER_RIFF: &[u8] = b"RIFF";
const FOURCC_WEBP: &[u8] = b"WEBP";

/// Classify a byte buffer by signature.
///
/// Side-effect-free; fails with [`ResizeError::UnsupportedFormat`] when no
/// signature matches (including empty/truncated buffers).
pub fn sniff(buf: &[u8]) -> Result<ImageType, ResizeError> {
    if buf.starts_with(MARKER_JPEG) {
        Ok(ImageType::Jpeg)
    } else if buf.starts_with(MARKER_PNG) {
        Ok(ImageType::Png)
    } else if buf.starts_with(MARKER_RIFF) && buf.len() >= 12 && &buf[8..12] == FOURCC_WEBP {
        Ok(ImageType::WebP)
    } else {
        Err(ResizeError::UnsupportedFormat)
    }
}
