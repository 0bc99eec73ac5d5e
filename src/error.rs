//! Error surface of the resize pipeline.
//!
//! One terminal error per request. The pipeline never retries and never
//! returns partial output: the first failing stage propagates immediately,
//! and handle ownership (see [`Engine`](crate::engine::Engine)) guarantees
//! nothing leaks on the way out.

use crate::engine::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResizeError {
    /// No known signature matched the buffer's leading bytes.
    #[error("unknown image format")]
    UnsupportedFormat,

    /// The engine could not decode the buffer (plain or shrink-on-load).
    #[error("decode failed: {0}")]
    DecodeFailed(EngineError),

    /// A transform stage (shrink, affine, crop, embed, rotate, colourspace)
    /// failed, carrying the engine's diagnostic.
    #[error("transform failed: {0}")]
    TransformFailed(EngineError),

    /// The engine could not serialize the final image.
    #[error("encode failed: {0}")]
    EncodeFailed(EngineError),
}
