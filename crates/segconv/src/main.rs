//! segconv: convert segmentation annotations between polygons and masks.
//!
//! # Usage
//!
//! ```text
//! segconv [--config FILE | --config-json JSON] [--scale F] [-v | -q] <COMMAND>
//!
//! segconv scale      --labels DIR --out DIR
//! segconv json2mask  --images DIR --labels DIR --masks DIR [--scaled DIR]
//! segconv mask2txt   --masks DIR --labels DIR
//! segconv txt2mask   --labels FILE --image FILE --output FILE
//! segconv boxes2mask --boxes FILE --image FILE --output FILE
//! ```
//!
//! Directory batches skip items that fail on their own (corrupt image,
//! malformed annotation) and report them in the summary; only
//! configuration and directory-level faults produce a failing exit code.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use segconv_pipeline::ConversionConfig;

/// Convert segmentation annotations between vector polygons and raster
/// masks.
#[derive(Parser)]
#[command(name = "segconv", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Conversion config as a JSON file. Missing fields use defaults.
    #[arg(long, global = true, conflicts_with = "config_json")]
    config: Option<PathBuf>,

    /// Conversion config as a JSON string.
    #[arg(long, global = true)]
    config_json: Option<String>,

    /// Coordinate scale factor; overrides the config value.
    #[arg(long, global = true)]
    scale: Option<f64>,

    /// Channel depth of rasterized masks; overrides the config value.
    #[arg(long, global = true, value_enum)]
    mask_kind: Option<Kind>,

    /// Log debug detail.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Log warnings and errors only.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Scale annotation points, writing `scaled_<name>` copies.
    Scale {
        /// Directory of annotation JSON files.
        #[arg(long)]
        labels: PathBuf,

        /// Output directory for scaled annotations.
        #[arg(long)]
        out: PathBuf,
    },

    /// Rasterize annotation JSON files into masks sized to their images.
    Json2mask {
        /// Directory of source images.
        #[arg(long)]
        images: PathBuf,

        /// Directory of annotation JSON files.
        #[arg(long)]
        labels: PathBuf,

        /// Output directory for `mask_<name>.png` files.
        #[arg(long)]
        masks: PathBuf,

        /// Also write the scaled annotations to this directory.
        #[arg(long)]
        scaled: Option<PathBuf>,

        /// How images are paired with annotations; overrides the config.
        #[arg(long, value_enum)]
        pairing: Option<Pairing>,
    },

    /// Vectorize masks into normalized polygon text files.
    Mask2txt {
        /// Directory of mask images.
        #[arg(long)]
        masks: PathBuf,

        /// Output directory for `<name>.txt` files.
        #[arg(long)]
        labels: PathBuf,
    },

    /// Rasterize one normalized polygon text file.
    Txt2mask {
        /// Polygon text file.
        #[arg(long)]
        labels: PathBuf,

        /// Image whose dimensions size the mask.
        #[arg(long)]
        image: PathBuf,

        /// Output mask path.
        #[arg(long)]
        output: PathBuf,
    },

    /// Draw one normalized bounding-box text file as box outlines.
    Boxes2mask {
        /// Bounding-box text file.
        #[arg(long)]
        boxes: PathBuf,

        /// Image whose dimensions size the mask.
        #[arg(long)]
        image: PathBuf,

        /// Output mask path.
        #[arg(long)]
        output: PathBuf,
    },
}

/// Mask channel depth selection.
#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    /// RGB mask, classes encoded as colors.
    Color,
    /// Single-channel mask, classes encoded as gray values.
    Gray,
}

/// Image/annotation pairing selection.
#[derive(Clone, Copy, ValueEnum)]
enum Pairing {
    /// Zip sorted listings, truncating to the shorter.
    ListingOrder,
    /// Match files by name, ignoring a `scaled_` prefix.
    Basename,
}

impl From<Pairing> for segconv_pipeline::PairingPolicy {
    fn from(p: Pairing) -> Self {
        match p {
            Pairing::ListingOrder => Self::ListingOrder,
            Pairing::Basename => Self::Basename,
        }
    }
}

/// Build a [`ConversionConfig`] from CLI arguments.
///
/// Starts from `--config` or `--config-json` (or defaults), then applies
/// the individual override flags and validates the result.
fn config_from_cli(cli: &Cli) -> Result<ConversionConfig, String> {
    let mut config = if let Some(ref path) = cli.config {
        segconv_io::load_config(path).map_err(|e| e.to_string())?
    } else if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("error parsing --config-json: {e}"))?
    } else {
        ConversionConfig::default()
    };

    if let Some(scale) = cli.scale {
        config.scale_factor = scale;
    }
    if let Some(kind) = cli.mask_kind {
        config.mask_kind = match kind {
            Kind::Color => segconv_pipeline::MaskKind::Color,
            Kind::Gray => segconv_pipeline::MaskKind::Gray,
        };
    }
    if let Command::Json2mask {
        pairing: Some(pairing),
        ..
    } = cli.command
    {
        config.pairing = pairing.into();
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn init_logging(cli: &Cli) {
    let default_filter = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run(command: &Command, config: &ConversionConfig) -> Result<(), segconv_io::IoError> {
    match command {
        Command::Scale { labels, out } => {
            segconv_io::scale_annotations(labels, out, config.scale_factor)?;
        }
        Command::Json2mask {
            images,
            labels,
            masks,
            scaled,
            ..
        } => {
            segconv_io::annotations_to_masks(images, labels, masks, scaled.as_deref(), config)?;
        }
        Command::Mask2txt { masks, labels } => {
            segconv_io::masks_to_polygons(masks, labels, config)?;
        }
        Command::Txt2mask {
            labels,
            image,
            output,
        } => segconv_io::polygons_to_mask(labels, image, output, config)?,
        Command::Boxes2mask {
            boxes,
            image,
            output,
        } => segconv_io::boxes_to_mask(boxes, image, output, config)?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            log::error!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    log::debug!("config: {config:?}");

    match run(&cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
