//! Request options and their enumerations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the caller and the [`pipeline`](crate::pipeline), and
//! everything here is plain data — the pipeline interprets it, the
//! [`Engine`](crate::engine::Engine) executes it.
//!
//! ## Types
//!
//! - [`Options`] — Full resize request: target box, crop/embed/enlarge flags,
//!   gravity, interpolator, encode settings.
//! - [`Quality`] — Lossy encoding quality (1–100, default 90). `0` falls back
//!   to the default; out-of-range values clamp.
//! - [`Gravity`] — Crop anchor. Mutually exclusive enum; the four corner
//!   variants cover what composable direction flags would express.
//! - [`Extend`] — Background treatment for embed padding.
//! - [`Interpolator`] — Resampling kernel for the residual affine stage.
//! - [`EnlargementPolicy`] — Which axis comparison skips enlargement.

use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Quality(u32);

impl Quality {
    /// `0` means "unset" and resolves to the default; values above 100 clamp.
    pub fn new(value: u32) -> Self {
        if value == 0 {
            Self::default()
        } else {
            Self(value.min(100))
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

impl From<u32> for Quality {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Background treatment when embedding onto a larger canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Extend {
    #[default]
    Black,
    White,
}

/// Resampling kernel for the residual affine stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Interpolator {
    #[default]
    Bicubic,
    Bilinear,
    Nohalo,
}

impl Interpolator {
    /// Engine-facing kernel name.
    pub fn name(self) -> &'static str {
        match self {
            Interpolator::Bicubic => "bicubic",
            Interpolator::Bilinear => "bilinear",
            Interpolator::Nohalo => "nohalo",
        }
    }
}

/// Crop anchor: which region of an oversized canvas survives the crop.
///
/// Modelled as a mutually exclusive enum rather than composable direction
/// flags; the corner variants stand in for the flag combinations. `Centre`
/// rounds the offset up (`(excess + 1) / 2`), keeping the extra pixel on the
/// leading edge when the excess is odd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Gravity {
    #[default]
    Centre,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

/// Axis comparison deciding when `enlarge = false` forces the identity
/// transform. Historical implementations disagreed, so the choice is an
/// explicit named policy rather than a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EnlargementPolicy {
    /// Skip enlargement only when the input is smaller than the target box
    /// on *both* axes (AND).
    #[default]
    BothAxes,
    /// Skip enlargement when the input is smaller on *either* axis (OR).
    EitherAxis,
}

/// Resize request options.
///
/// A width or height of `0` means "derive from the other axis and the input
/// aspect ratio"; both zero means the identity transform at the original
/// size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub width: u32,
    pub height: u32,
    /// Fill the box, then crop the overflow (anchored by `gravity`).
    pub crop: bool,
    /// Allow scaling above the input size.
    pub enlarge: bool,
    /// Pad the fitted image onto a canvas of exactly the target box.
    pub embed: bool,
    pub extend: Extend,
    pub interpolator: Interpolator,
    pub gravity: Gravity,
    pub quality: Quality,
    /// Auto-rotate using the embedded EXIF orientation.
    pub rotate: bool,
    /// Process in linear light. Disables decode-time shrink (block decoders
    /// shrink in gamma space, which would bake in the wrong average).
    pub linear: bool,
    /// Progressive/interlaced encoding, where the output codec supports it.
    pub interlace: bool,
    /// Drop metadata from the output.
    pub strip: bool,
    pub enlargement_policy: EnlargementPolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            crop: false,
            enlarge: false,
            embed: false,
            extend: Extend::default(),
            interpolator: Interpolator::default(),
            gravity: Gravity::default(),
            quality: Quality::default(),
            rotate: false,
            linear: false,
            interlace: false,
            strip: false,
            enlargement_policy: EnlargementPolicy::default(),
        }
    }
}
