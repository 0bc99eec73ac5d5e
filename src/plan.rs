//! Pure geometry planning for the transform pipeline.
//!
//! All functions here are pure and testable without any pixels or engine.
//!
//! A resize spreads its total scale factor across up to three stages, each
//! cheaper per pixel than the next:
//!
//! 1. **Shrink-on-load** — power-of-two block reduction inside the decoder,
//!    where the format supports it.
//! 2. **Integer shrink** — block-average reduction by a whole factor.
//! 3. **Residual affine** — the remaining fractional scale, through a real
//!    interpolator.
//!
//! The [`ScalePlan`] tracks the remaining budget as stages consume it. The
//! splits are a performance detail only: the final dimensions must come out
//! identical whichever stages end up firing.

use crate::engine::Dimensions;
use crate::options::{EnlargementPolicy, Gravity, Options};

/// Scale budget for one request.
///
/// Computed once from the input dimensions and options, then mutated in
/// place as each pipeline stage consumes part of the scale, and discarded
/// after encode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalePlan {
    /// Overall remaining input→output scale divisor (input / output).
    pub factor: f64,
    /// Integer pre-shrink factor, always ≥ 1.
    pub shrink: u32,
    /// Fractional scale left after the integer shrink. `0.0` encodes a forced
    /// identity transform; `1.0` means the shrink landed exactly.
    pub residual: f64,
    /// Power-of-two decode-time shrink (1, 2, 4 or 8). Stays 1 until
    /// [`apply_shrink_on_load`](Self::apply_shrink_on_load) selects one.
    pub shrink_on_load: u32,
    /// Resolved target box. In fit (non-crop, non-embed) mode the actual
    /// output may be smaller on one axis; in crop/embed mode the pipeline
    /// forces the output onto this box.
    pub target: Dimensions,
}

impl ScalePlan {
    /// Plan the scale for `input` under `options`.
    ///
    /// Total over all positive dimensions — no failure branch. Auto axes
    /// (zero width or height) derive from the input aspect ratio with floor
    /// rounding; both zero is the identity transform.
    pub fn for_target(input: Dimensions, options: &Options) -> ScalePlan {
        let in_w = input.width as f64;
        let in_h = input.height as f64;

        let mut target = Dimensions {
            width: options.width,
            height: options.height,
        };

        let factor = match (options.width > 0, options.height > 0) {
            (true, true) => {
                let xf = in_w / options.width as f64;
                let yf = in_h / options.height as f64;
                // Crop fills the box (scale by the tighter axis), fit stays
                // entirely inside it (scale by the looser axis).
                if options.crop { xf.min(yf) } else { xf.max(yf) }
            }
            (true, false) => {
                let f = in_w / options.width as f64;
                target.height = (in_h / f).floor() as u32;
                f
            }
            (false, true) => {
                let f = in_h / options.height as f64;
                target.width = (in_w / f).floor() as u32;
                f
            }
            (false, false) => {
                target = input;
                1.0
            }
        };

        let shrink = (factor.floor() as u32).max(1);
        let mut plan = ScalePlan {
            factor,
            shrink,
            residual: shrink as f64 / factor,
            shrink_on_load: 1,
            target,
        };

        if !options.enlarge && options.enlargement_policy.would_enlarge(input, target) {
            plan.factor = 1.0;
            plan.shrink = 1;
            plan.residual = 0.0;
            plan.target = input;
        }

        plan
    }

    /// Move part of the shrink budget into the decoder, when `available`.
    ///
    /// Picks the largest power of two in {2, 4, 8} not exceeding `shrink`,
    /// divides the factor by it, and recomputes the integer shrink and
    /// residual from what remains. A no-op when the decoder lacks the
    /// capability or the shrink is below 2. Numerically transparent: the
    /// final output dimensions do not depend on whether this fires.
    pub fn apply_shrink_on_load(&mut self, available: bool) {
        if !available || self.shrink < 2 {
            return;
        }

        let load_shrink = match self.shrink {
            8.. => 8,
            4.. => 4,
            _ => 2,
        };

        self.shrink_on_load = load_shrink;
        self.factor = (self.factor / load_shrink as f64).max(1.0);
        self.shrink = self.factor.floor() as u32;
        self.residual = self.shrink as f64 / self.factor;
    }

    /// Correct the residual for engine-side rounding after the integer
    /// shrink, from the *actual* post-shrink dimensions.
    ///
    /// Per axis the residual is `target / actual`; crop takes the larger
    /// (still fill the box), fit the smaller (still stay inside it).
    pub fn recompute_residual(&mut self, shrunk: Dimensions, crop: bool) {
        let rx = self.target.width as f64 / shrunk.width as f64;
        let ry = self.target.height as f64 / shrunk.height as f64;
        self.residual = if crop { rx.max(ry) } else { rx.min(ry) };
    }
}

impl EnlargementPolicy {
    /// Would resizing `input` toward `target` require enlargement under this
    /// policy?
    pub fn would_enlarge(self, input: Dimensions, target: Dimensions) -> bool {
        match self {
            EnlargementPolicy::BothAxes => {
                input.width < target.width && input.height < target.height
            }
            EnlargementPolicy::EitherAxis => {
                input.width < target.width || input.height < target.height
            }
        }
    }
}

/// Crop offset into an oversized canvas, anchored by gravity.
///
/// `target` must already be clamped to `canvas` (the pipeline does this
/// before extraction). Centre rounds up: `(excess + 1) / 2`.
pub fn crop_offset(canvas: Dimensions, target: Dimensions, gravity: Gravity) -> (u32, u32) {
    let dx = canvas.width.saturating_sub(target.width);
    let dy = canvas.height.saturating_sub(target.height);

    let centre_x = (dx + 1) / 2;
    let centre_y = (dy + 1) / 2;

    match gravity {
        Gravity::Centre => (centre_x, centre_y),
        Gravity::North => (centre_x, 0),
        Gravity::NorthEast => (dx, 0),
        Gravity::East => (dx, centre_y),
        Gravity::SouthEast => (dx, dy),
        Gravity::South => (centre_x, dy),
        Gravity::SouthWest => (0, dy),
        Gravity::West => (0, centre_y),
        Gravity::NorthWest => (0, 0),
    }
}

/// Embed offset: centre an undersized canvas inside the target box.
pub fn embed_offset(canvas: Dimensions, target: Dimensions) -> (u32, u32) {
    (
        target.width.saturating_sub(canvas.width) / 2,
        target.height.saturating_sub(canvas.height) / 2,
    )
}
