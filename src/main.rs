use clap::Parser;
use refit::{
    EngineConfig, EnlargementPolicy, Extend, Gravity, Interpolator, Options, Quality, Runtime,
    RustEngine,
};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once per process
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "refit")]
#[command(about = "Resize a JPEG/PNG/WebP image to fit a bounding box")]
#[command(long_about = "\
Resize a JPEG/PNG/WebP image to fit a bounding box.

The output re-encodes to the input format and goes to stdout unless --output
is given. Width or height of 0 derives that axis from the aspect ratio; both
zero keeps the original size.

Examples:

  refit photo.jpg --width 800 > small.jpg
  refit photo.jpg --width 800 --height 600 --crop --gravity north -o thumb.jpg
  refit logo.png --width 400 --height 400 --embed --extend white -o padded.png")]
#[command(version = version_string())]
struct Cli {
    /// Input image (JPEG, PNG or WebP)
    file: PathBuf,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target width in pixels (0 = derive from height)
    #[arg(long, default_value_t = 0)]
    width: u32,

    /// Target height in pixels (0 = derive from width)
    #[arg(long, default_value_t = 0)]
    height: u32,

    /// Fill the box, then crop the overflow
    #[arg(long)]
    crop: bool,

    /// Allow scaling above the input size
    #[arg(long)]
    enlarge: bool,

    /// Pad the fitted image onto a canvas of exactly the target box
    #[arg(long)]
    embed: bool,

    /// Background for embed padding
    #[arg(long, value_enum, default_value_t = Extend::Black)]
    extend: Extend,

    /// Resampling kernel for the fractional scale stage
    #[arg(long, value_enum, default_value_t = Interpolator::Bicubic)]
    interpolator: Interpolator,

    /// Crop anchor
    #[arg(long, value_enum, default_value_t = Gravity::Centre)]
    gravity: Gravity,

    /// Encoding quality, 1-100
    #[arg(long, default_value_t = 90)]
    quality: u32,

    /// Auto-rotate using the embedded EXIF orientation
    #[arg(long)]
    rotate: bool,

    /// Process in linear light (disables decode-time shrink)
    #[arg(long)]
    linear: bool,

    /// Progressive/interlaced output, where the codec supports it
    #[arg(long)]
    interlace: bool,

    /// Drop metadata from the output
    #[arg(long)]
    strip: bool,

    /// Axis comparison for skipping enlargement
    #[arg(long, value_enum, default_value_t = EnlargementPolicy::BothAxes)]
    enlargement_policy: EnlargementPolicy,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    Runtime::init(EngineConfig::default());

    let buf = std::fs::read(&cli.file)?;
    let options = Options {
        width: cli.width,
        height: cli.height,
        crop: cli.crop,
        enlarge: cli.enlarge,
        embed: cli.embed,
        extend: cli.extend,
        interpolator: cli.interpolator,
        gravity: cli.gravity,
        quality: Quality::new(cli.quality),
        rotate: cli.rotate,
        linear: cli.linear,
        interlace: cli.interlace,
        strip: cli.strip,
        enlargement_policy: cli.enlargement_policy,
    };

    let engine = RustEngine::new();
    let out = refit::resize(&engine, &buf, &options)?;

    match cli.output {
        Some(path) => std::fs::write(path, out)?,
        None => std::io::stdout().write_all(&out)?,
    }
    Ok(())
}
