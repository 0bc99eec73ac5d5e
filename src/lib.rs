//! # Refit
//!
//! Buffer-to-buffer image resizing: compressed bytes in, compressed bytes
//! out, with cropping, padding, enlargement control, and a choice of
//! resampling filter. JPEG, PNG and WebP in; the output re-encodes to the
//! input format.
//!
//! # Architecture: Plan, Then Drive
//!
//! A resize is planned before any pixel moves. The total scale factor splits
//! across up to three stages, ordered from cheapest to most expensive per
//! pixel:
//!
//! ```text
//! 1. Shrink-on-load   power-of-two reduction inside the decoder (JPEG)
//! 2. Integer shrink   block-average reduction by a whole factor
//! 3. Residual affine  the leftover fraction, through a real interpolator
//! ```
//!
//! The [`plan::ScalePlan`] owns that budget; the [`pipeline`] spends it by
//! driving an [`engine::Engine`] stage by stage. The split is purely a
//! performance detail — output dimensions are identical whichever stages
//! fire, which is what the geometry tests pin down.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`sniff`] | Magic-byte format classification (JPEG/PNG/WebP or error) |
//! | [`options`] | Request options: target box, crop/embed/enlarge, gravity, quality |
//! | [`plan`] | Pure geometry: scale planning, shrink-on-load selection, crop/embed offsets |
//! | [`engine`] | The imaging-engine trait: opaque, move-only image handles |
//! | [`rust_engine`] | Production engine on the `image` crate — pure Rust, statically linked |
//! | [`pipeline`] | The orchestrator: [`pipeline::resize`] sequences the stages |
//! | [`runtime`] | Process-wide engine configuration (explicit, idempotent init) |
//! | [`error`] | Terminal per-request error kinds |
//!
//! # Design Decisions
//!
//! ## Engine Behind a Trait
//!
//! The pipeline never touches pixels. [`engine::Engine`] exposes exactly the
//! operations the geometry needs — decode, shrink, affine, extract, embed,
//! rotate, colourspace, encode — and transform methods *consume* their input
//! handle, so the one-live-handle discipline of native imaging libraries is
//! enforced by ownership instead of convention. Tests swap in a recording
//! mock that tracks dimensions symbolically; the geometry of every stage is
//! verified without encoding a single image.
//!
//! ## Residual Correction Over Trust
//!
//! Engines round. After the integer shrink, the residual is recomputed from
//! the dimensions the engine actually produced rather than the ones the plan
//! predicted, so three independent scale reductions still land on exact
//! target dimensions with no drift.
//!
//! ## Named Policies For Historically Ambiguous Behavior
//!
//! Implementations of this pipeline have disagreed on whether non-enlargement
//! compares both axes or either axis, and on how centre-gravity cropping
//! rounds. Both are pinned here: [`options::EnlargementPolicy`] is an
//! explicit choice (default: both axes), and centre crops round the offset
//! up. Tests assert the behavior rather than inferring intent.
//!
//! # Concurrency
//!
//! One request drives one handle chain start to finish; the pipeline holds no
//! shared mutable state. Run it from as many threads as you like, one request
//! per thread — engine-internal concurrency is pinned to 1 via
//! [`runtime::EngineConfig`] so application-level workers are the sole
//! parallelism axis. No retries, no timeouts: both belong to the caller.

pub mod engine;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod plan;
pub mod rust_engine;
pub mod runtime;
pub mod sniff;

pub use engine::{Dimensions, EncodeParams, Engine, EngineError, Rotation};
pub use error::ResizeError;
pub use options::{EnlargementPolicy, Extend, Gravity, Interpolator, Options, Quality};
pub use pipeline::resize;
pub use plan::ScalePlan;
pub use rust_engine::RustEngine;
pub use runtime::{EngineConfig, Runtime};
pub use sniff::{ImageType, sniff};
