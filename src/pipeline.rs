//! The transform pipeline: sniff → plan → drive the engine stage by stage.
//!
//! Stage order (each optional except load and encode):
//!
//! 1. **Load** — decode via the sniffed format; when the plan selected a
//!    decode-time shrink, reload with it instead (replacing the first handle).
//! 2. **Integer shrink** — only when `shrink > 1`; the residual is then
//!    recomputed from the *actual* post-shrink dimensions to absorb
//!    engine-side rounding.
//! 3. **Residual affine** — only when the residual is neither the forced-zero
//!    identity nor exactly 1.
//! 4. **Crop or embed** — only when dimensions still differ from the target.
//! 5. **Auto-rotate** — only with `options.rotate` and a non-trivial EXIF
//!    orientation.
//! 6. **Colour normalize** — always, regardless of upstream state.
//! 7. **Encode** — to the sniffed input format.
//!
//! Handle ownership moves through every engine call, so an early `?` return
//! drops whatever was live. No retries, no partial output.

use crate::engine::{Dimensions, EncodeParams, Engine, Rotation};
use crate::error::ResizeError;
use crate::options::Options;
use crate::plan::{ScalePlan, crop_offset, embed_offset};
use crate::sniff::sniff;
use tracing::debug;

/// Resize `buf` according to `options`, returning re-encoded bytes.
///
/// The single entry point of the crate. `engine` supplies the pixel work;
/// everything else — format sniffing, scale planning, stage sequencing,
/// crop/embed geometry — happens here.
pub fn resize<E: Engine>(engine: &E, buf: &[u8], options: &Options) -> Result<Vec<u8>, ResizeError> {
    let format = sniff(buf)?;

    let image = engine
        .decode(buf, format)
        .map_err(ResizeError::DecodeFailed)?;
    let input = engine.dimensions(&image);

    let mut plan = ScalePlan::for_target(input, options);
    debug!(
        format = format.name(),
        in_width = input.width,
        in_height = input.height,
        out_width = plan.target.width,
        out_height = plan.target.height,
        factor = plan.factor,
        shrink = plan.shrink,
        residual = plan.residual,
        "planned transform"
    );

    // Decode-time shrink is a capability of the decoder, not of this
    // pipeline; linear-light processing suppresses it because block decoders
    // shrink in gamma space.
    plan.apply_shrink_on_load(engine.supports_shrink_on_load(format) && !options.linear);

    let mut image = if plan.shrink_on_load > 1 {
        debug!(shrink_on_load = plan.shrink_on_load, "reloading with decode-time shrink");
        drop(image);
        engine
            .decode_shrunk(buf, format, plan.shrink_on_load)
            .map_err(ResizeError::DecodeFailed)?
    } else {
        image
    };

    if plan.shrink > 1 {
        debug!(shrink = plan.shrink, "integer shrink");
        image = engine
            .shrink(image, plan.shrink, plan.shrink)
            .map_err(ResizeError::TransformFailed)?;
        let shrunk = engine.dimensions(&image);
        plan.recompute_residual(shrunk, options.crop);
    }

    // residual 0.0 is the forced identity from the non-enlargement rule;
    // exactly 1.0 means the integer stages already landed on target.
    if plan.residual != 0.0 && plan.residual != 1.0 {
        debug!(residual = plan.residual, interpolator = options.interpolator.name(), "residual affine");
        image = engine
            .affine(image, plan.residual, plan.residual, options.interpolator)
            .map_err(ResizeError::TransformFailed)?;
    }

    let current = engine.dimensions(&image);
    if current != plan.target {
        if options.crop {
            let clamped = Dimensions {
                width: plan.target.width.min(current.width),
                height: plan.target.height.min(current.height),
            };
            let (left, top) = crop_offset(current, clamped, options.gravity);
            debug!(left, top, width = clamped.width, height = clamped.height, "crop");
            image = engine
                .extract_area(image, left, top, clamped.width, clamped.height)
                .map_err(ResizeError::TransformFailed)?;
        } else if options.embed {
            let (left, top) = embed_offset(current, plan.target);
            debug!(left, top, width = plan.target.width, height = plan.target.height, "embed");
            image = engine
                .embed(
                    image,
                    left,
                    top,
                    plan.target.width,
                    plan.target.height,
                    options.extend,
                )
                .map_err(ResizeError::TransformFailed)?;
        }
    }

    if options.rotate {
        let rotation = engine.orientation(&image);
        if rotation != Rotation::None {
            debug!(?rotation, "auto-rotate");
            image = engine
                .rotate(image, rotation)
                .map_err(ResizeError::TransformFailed)?;
        }
    }

    image = engine.to_srgb(image).map_err(ResizeError::TransformFailed)?;

    let params = EncodeParams {
        format,
        quality: options.quality,
        interlace: options.interlace,
        strip: options.strip,
    };
    engine
        .encode(image, &params)
        .map_err(ResizeError::EncodeFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{MockEngine, RecordedOp};
    use crate::options::{EnlargementPolicy, Extend, Gravity, Interpolator};
    use crate::sniff::ImageType;

    const JPEG_BUF: &[u8] = &[0xff, 0xd8, 0xff, 0xe0];
    const PNG_BUF: &[u8] = &[0x89, b'P', b'N', b'G'];

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn fit(width: u32, height: u32) -> Options {
        Options {
            width,
            height,
            ..Options::default()
        }
    }

    fn output_of(engine: &MockEngine, buf: &[u8], options: &Options) -> Dimensions {
        let out = resize(engine, buf, options).unwrap();
        MockEngine::decode_output(&out)
    }

    #[test]
    fn fit_height_bound_scales_with_residual_only() {
        // 200x250 into 200x150 → 120x150, purely through the affine
        let engine = MockEngine::new(200, 250);
        assert_eq!(output_of(&engine, PNG_BUF, &fit(200, 150)), dims(120, 150));

        let ops = engine.recorded();
        assert!(ops.iter().all(|op| !matches!(op, RecordedOp::Shrink(..))));
        assert!(ops
            .iter()
            .any(|op| matches!(op, RecordedOp::Affine(x, _, _) if (x - 0.6).abs() < 1e-9)));
    }

    #[test]
    fn fit_width_bound_lands_exactly_on_integer_shrink() {
        // 120x100 into 60x90 → 60x50: shrink 2, residual becomes exactly 1
        let engine = MockEngine::new(120, 100);
        assert_eq!(output_of(&engine, PNG_BUF, &fit(60, 90)), dims(60, 50));

        let ops = engine.recorded();
        assert!(ops.contains(&RecordedOp::Shrink(2, 2)));
        assert!(ops.iter().all(|op| !matches!(op, RecordedOp::Affine(..))));
    }

    #[test]
    fn fit_taller_than_box() {
        // 50x100 into 60x90 → 45x90
        let engine = MockEngine::new(50, 100);
        assert_eq!(output_of(&engine, PNG_BUF, &fit(60, 90)), dims(45, 90));
    }

    #[test]
    fn non_enlargement_identity_skips_every_transform_stage() {
        let engine = MockEngine::new(5, 5);
        assert_eq!(output_of(&engine, PNG_BUF, &fit(10, 10)), dims(5, 5));

        let ops = engine.recorded();
        assert_eq!(
            ops,
            vec![
                RecordedOp::Decode(ImageType::Png),
                RecordedOp::ToSrgb,
                RecordedOp::Encode {
                    format: ImageType::Png,
                    quality: 90,
                    interlace: false,
                    strip: false,
                },
            ]
        );
    }

    #[test]
    fn non_enlargement_identity_ignores_crop_and_embed_flags() {
        for flags in [(true, false), (false, true)] {
            let engine = MockEngine::new(5, 5);
            let options = Options {
                crop: flags.0,
                embed: flags.1,
                ..fit(10, 10)
            };
            assert_eq!(output_of(&engine, PNG_BUF, &options), dims(5, 5));
        }
    }

    #[test]
    fn either_axis_policy_forces_identity() {
        let engine = MockEngine::new(10, 50);
        let options = Options {
            enlargement_policy: EnlargementPolicy::EitherAxis,
            ..fit(20, 10)
        };
        assert_eq!(output_of(&engine, PNG_BUF, &options), dims(10, 50));
    }

    #[test]
    fn both_axes_policy_still_shrinks_mixed_input() {
        // Same request under the default AND policy shrinks by 5
        let engine = MockEngine::new(10, 50);
        assert_eq!(output_of(&engine, PNG_BUF, &fit(20, 10)), dims(2, 10));
    }

    #[test]
    fn identity_options_roundtrip_is_stable() {
        let engine = MockEngine::new(640, 480);
        assert_eq!(output_of(&engine, PNG_BUF, &fit(640, 480)), dims(640, 480));
    }

    #[test]
    fn crop_fills_then_extracts_exact_box() {
        // 100x100 into 60x40 crop: scale 0.6 → 60x60, extract 60x40 at top 10
        let engine = MockEngine::new(100, 100);
        let options = Options {
            crop: true,
            ..fit(60, 40)
        };
        assert_eq!(output_of(&engine, PNG_BUF, &options), dims(60, 40));

        let ops = engine.recorded();
        assert!(ops.contains(&RecordedOp::ExtractArea {
            left: 0,
            top: 10,
            width: 60,
            height: 40,
        }));
    }

    #[test]
    fn crop_gravity_north_pins_top() {
        let engine = MockEngine::new(100, 100);
        let options = Options {
            crop: true,
            gravity: Gravity::North,
            ..fit(60, 40)
        };
        output_of(&engine, PNG_BUF, &options);
        assert!(engine.recorded().contains(&RecordedOp::ExtractArea {
            left: 0,
            top: 0,
            width: 60,
            height: 40,
        }));
    }

    #[test]
    fn crop_extraction_stays_within_canvas() {
        // factor = min(2, 100/90) = 1.11; affine 0.9 → 108x90;
        // extract 60x90 at left (108-60+1)/2 = 24
        let engine = MockEngine::new(120, 100);
        let options = Options {
            crop: true,
            ..fit(60, 90)
        };
        assert_eq!(output_of(&engine, PNG_BUF, &options), dims(60, 90));
        assert!(engine.recorded().contains(&RecordedOp::ExtractArea {
            left: 24,
            top: 0,
            width: 60,
            height: 90,
        }));
    }

    #[test]
    fn embed_pads_to_exact_box_with_background() {
        // 50x100 into 100x100 embed: no scaling needed, pad left 25
        let engine = MockEngine::new(50, 100);
        let options = Options {
            embed: true,
            extend: Extend::White,
            ..fit(100, 100)
        };
        // enlarge=false with AND policy: 50 < 100 but 100 == 100, no identity
        assert_eq!(output_of(&engine, PNG_BUF, &options), dims(100, 100));
        assert!(engine.recorded().contains(&RecordedOp::Embed {
            left: 25,
            top: 0,
            width: 100,
            height: 100,
            extend: Extend::White,
        }));
    }

    #[test]
    fn embed_after_downscale_centres_both_axes() {
        // 300x200 into 100x100 embed: fit scale → 100x67, pad top
        let engine = MockEngine::new(300, 200);
        let options = Options {
            embed: true,
            ..fit(100, 100)
        };
        assert_eq!(output_of(&engine, PNG_BUF, &options), dims(100, 100));
        assert!(engine.recorded().contains(&RecordedOp::Embed {
            left: 0,
            top: 16,
            width: 100,
            height: 100,
            extend: Extend::Black,
        }));
    }

    #[test]
    fn shrink_on_load_replaces_plain_decode_and_preserves_dimensions() {
        // 1000x500 to width 100: shrink 10 → load shrink 8, residual 0.8
        let engine = MockEngine::new(1000, 500).with_shrink_on_load();
        assert_eq!(output_of(&engine, JPEG_BUF, &fit(100, 0)), dims(100, 50));

        let ops = engine.recorded();
        assert!(ops.contains(&RecordedOp::DecodeShrunk(ImageType::Jpeg, 8)));
        assert!(ops.iter().all(|op| !matches!(op, RecordedOp::Shrink(..))));

        // Same request without the capability lands on identical dimensions
        let plain = MockEngine::new(1000, 500);
        assert_eq!(output_of(&plain, JPEG_BUF, &fit(100, 0)), dims(100, 50));
    }

    #[test]
    fn shrink_on_load_not_consulted_for_unsupported_format() {
        let engine = MockEngine::new(1000, 500).with_shrink_on_load();
        output_of(&engine, PNG_BUF, &fit(100, 0));
        let ops = engine.recorded();
        assert!(ops
            .iter()
            .all(|op| !matches!(op, RecordedOp::DecodeShrunk(..))));
    }

    #[test]
    fn linear_light_suppresses_shrink_on_load() {
        let engine = MockEngine::new(1000, 500).with_shrink_on_load();
        let options = Options {
            linear: true,
            ..fit(100, 0)
        };
        assert_eq!(output_of(&engine, JPEG_BUF, &options), dims(100, 50));
        let ops = engine.recorded();
        assert!(ops
            .iter()
            .all(|op| !matches!(op, RecordedOp::DecodeShrunk(..))));
        assert!(ops.contains(&RecordedOp::Shrink(10, 10)));
    }

    #[test]
    fn rotate_requests_engine_rotation_only_when_oriented() {
        let mut engine = MockEngine::new(100, 50);
        engine.exif_orientation = Rotation::Cw90;
        let options = Options {
            rotate: true,
            ..fit(0, 0)
        };
        assert_eq!(output_of(&engine, JPEG_BUF, &options), dims(50, 100));
        assert!(engine.recorded().contains(&RecordedOp::Rotate(Rotation::Cw90)));

        let unoriented = MockEngine::new(100, 50);
        output_of(&unoriented, JPEG_BUF, &options);
        assert!(unoriented
            .recorded()
            .iter()
            .all(|op| !matches!(op, RecordedOp::Rotate(_))));
    }

    #[test]
    fn encode_carries_quality_interlace_strip_and_input_format() {
        let engine = MockEngine::new(100, 100);
        let options = Options {
            quality: crate::options::Quality::new(75),
            interlace: true,
            strip: true,
            interpolator: Interpolator::Nohalo,
            ..fit(50, 50)
        };
        output_of(&engine, JPEG_BUF, &options);
        assert!(engine.recorded().contains(&RecordedOp::Encode {
            format: ImageType::Jpeg,
            quality: 75,
            interlace: true,
            strip: true,
        }));
    }

    #[test]
    fn unknown_signature_fails_before_any_engine_call() {
        let engine = MockEngine::new(100, 100);
        let err = resize(&engine, &[0u8; 32], &fit(50, 50)).unwrap_err();
        assert!(matches!(err, ResizeError::UnsupportedFormat));
        assert!(engine.recorded().is_empty());
    }

    #[test]
    fn stage_failures_map_to_their_error_kind() {
        let decode = MockEngine::new(100, 100).failing_on("decode");
        assert!(matches!(
            resize(&decode, PNG_BUF, &fit(50, 50)).unwrap_err(),
            ResizeError::DecodeFailed(_)
        ));

        let affine = MockEngine::new(100, 100).failing_on("affine");
        assert!(matches!(
            resize(&affine, PNG_BUF, &fit(60, 60)).unwrap_err(),
            ResizeError::TransformFailed(_)
        ));

        let encode = MockEngine::new(100, 100).failing_on("encode");
        assert!(matches!(
            resize(&encode, PNG_BUF, &fit(50, 50)).unwrap_err(),
            ResizeError::EncodeFailed(_)
        ));
    }

    #[test]
    fn transform_failure_stops_the_pipeline() {
        let engine = MockEngine::new(100, 100).failing_on("shrink");
        let _ = resize(&engine, PNG_BUF, &fit(25, 25)).unwrap_err();
        let ops = engine.recorded();
        // Nothing after the failed stage ran
        assert!(ops.iter().all(|op| !matches!(op, RecordedOp::ToSrgb)));
        assert!(ops.iter().all(|op| !matches!(op, RecordedOp::Encode { .. })));
    }
}
