use clap::{Parser, Subcommand, ValueEnum};
use spatial_photo::config::{self, AppConfig};
use spatial_photo::convert::{
    CommandEncoder, ConversionParameters, ConversionRequest, DirectoryLibrary, ImageSource,
};
use spatial_photo::imaging::Eye;
use spatial_photo::motion::{AttitudeSample, DeviceOrientation};
use spatial_photo::output::{self, OrientationReport, SniffReport, SplitReport, TiltReport, ViewFile};
use spatial_photo::report::{self, LogSink};
use spatial_photo::session::{SplitScreen, SplitView};
use spatial_photo::temp::TempStore;
use spatial_photo::preview::{self, ComparisonMode, MotionPreview};
use spatial_photo::{format, orientation};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "spatial-photo")]
#[command(about = "Inspect and author spatial (stereoscopic) photos")]
#[command(long_about = "\
Inspect and author spatial (stereoscopic) photos

A spatial photo bundles a left and a right view with the camera geometry
needed to show them with parallax. This tool sniffs and orients picked
images, splits side-by-side frames into their two views, and hands pairs
to an external encoder that writes the spatial photo container.

Supported inputs: JPEG, PNG, GIF, HEIC (HEIC is passed through to the
encoder without being decoded here).

Run 'spatial-photo gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect an image's format from its leading bytes
    Sniff { file: PathBuf },
    /// Show an image's EXIF orientation and how it would be displayed
    Orientation { file: PathBuf },
    /// Split a side-by-side stereo image into left and right PNGs
    Split {
        file: PathBuf,
        /// Directory for the two halves
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Compute the preview disparity for a device attitude
    Tilt {
        /// Rotation about the device's long axis, in radians
        #[arg(long, allow_hyphen_values = true)]
        roll: f64,
        /// Rotation about the device's short axis, in radians
        #[arg(long, allow_hyphen_values = true)]
        pitch: f64,
        #[arg(long, value_enum, default_value_t = DeviceArg::Portrait)]
        device: DeviceArg,
    },
    /// Encode a stereo pair into a spatial photo and save it to the library
    Convert(ConvertArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
#[command(group(clap::ArgGroup::new("input").required(true).args(["left", "combined"])))]
struct ConvertArgs {
    /// Left-eye image
    #[arg(long, requires = "right")]
    left: Option<PathBuf>,
    /// Right-eye image
    #[arg(long, requires = "left")]
    right: Option<PathBuf>,
    /// Side-by-side image to split into left and right
    #[arg(long, conflicts_with_all = ["left", "right"])]
    combined: Option<PathBuf>,
    /// Camera separation in millimeters (overrides config)
    #[arg(long)]
    baseline: Option<f64>,
    /// Horizontal field of view in degrees (overrides config)
    #[arg(long)]
    fov: Option<f64>,
    /// Disparity adjustment (overrides config)
    #[arg(long, allow_hyphen_values = true)]
    disparity: Option<f64>,
    /// Where the encoder writes the spatial photo (default: a temp file)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Media library directory (overrides config)
    #[arg(long)]
    library: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DeviceArg {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    Unknown,
}

impl From<DeviceArg> for DeviceOrientation {
    fn from(arg: DeviceArg) -> Self {
        match arg {
            DeviceArg::Portrait => DeviceOrientation::Portrait,
            DeviceArg::PortraitUpsideDown => DeviceOrientation::PortraitUpsideDown,
            DeviceArg::LandscapeLeft => DeviceOrientation::LandscapeLeft,
            DeviceArg::LandscapeRight => DeviceOrientation::LandscapeRight,
            DeviceArg::Unknown => DeviceOrientation::Unknown,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(cli.config.as_deref())?;
    let store = TempStore::from_config(config.storage.temp_dir.as_deref());

    match cli.command {
        Command::Sniff { file } => {
            let bytes = tokio::fs::read(&file).await?;
            let report = SniffReport::new(&file, format::classify(&bytes));
            emit(cli.json, &report, output::print_sniff)?;
        }
        Command::Orientation { file } => {
            let bytes = tokio::fs::read(&file).await?;
            let codec = orientation::read_codec_orientation(&bytes)?;
            let report = OrientationReport {
                path: file,
                exif: codec.map(|c| c.exif_value()),
                display: orientation::to_display(codec),
            };
            emit(cli.json, &report, output::print_orientation)?;
        }
        Command::Split { file, out_dir } => {
            let bytes = tokio::fs::read(&file).await?;
            let mut screen = SplitScreen::new(config.preview.state());
            let Ok(view) = screen.load(bytes, &store, &LogSink).await else {
                std::process::exit(1);
            };
            let report = write_split(&file, &out_dir, view, config.preview.comparison)?;
            emit(cli.json, &report, output::print_split)?;
        }
        Command::Tilt {
            roll,
            pitch,
            device,
        } => {
            // Fixed reading fed through the same sampler the live preview uses.
            let sample = AttitudeSample::new(roll, pitch);
            let device = DeviceOrientation::from(device);
            let mut motion = MotionPreview::start(move || Some(sample), &config.motion);
            motion.next().await;
            let disparity = motion.disparity(device);
            let report = TiltReport {
                roll,
                pitch,
                device,
                disparity,
                slide_offset: preview::slide_offset(disparity),
                sample_rate_hz: config.motion.sample_rate_hz,
            };
            emit(cli.json, &report, output::print_tilt)?;
        }
        Command::Convert(args) => convert(args, &config, store).await?,
        Command::GenConfig => unreachable!("handled before config loading"),
    }

    Ok(())
}

/// Print `report` as JSON or through its text printer.
fn emit<T: serde::Serialize>(json: bool, report: &T, print: fn(&T)) -> Result<(), serde_json::Error> {
    if json {
        output::print_json(report)
    } else {
        print(report);
        Ok(())
    }
}

/// Save a split pair as `<stem>-left.png` / `<stem>-right.png`.
fn write_split(
    source: &Path,
    out_dir: &Path,
    view: &SplitView,
    comparison: ComparisonMode,
) -> Result<SplitReport, Box<dyn std::error::Error>> {
    match view {
        SplitView::Pair(pair) => {
            std::fs::create_dir_all(out_dir)?;
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let write = |eye: Eye| -> Result<ViewFile, Box<dyn std::error::Error>> {
                let view = pair.view(eye);
                let path = out_dir.join(format!("{stem}-{eye}.png"));
                view.save_png(&path)?;
                Ok(ViewFile {
                    path,
                    width: view.width(),
                    height: view.height(),
                })
            };
            let left = write(Eye::Left)?;
            let right = write(Eye::Right)?;
            Ok(SplitReport::Split {
                source: source.to_path_buf(),
                width: left.width + right.width,
                height: left.height,
                left,
                right,
                orientation: pair.display_orientation(),
                comparison,
            })
        }
        SplitView::Fallback { path, format } => Ok(SplitReport::Fallback {
            source: source.to_path_buf(),
            format: *format,
            copy: path.clone(),
        }),
    }
}

async fn convert(
    args: ConvertArgs,
    config: &AppConfig,
    store: TempStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let defaults = config.conversion;
    let params = ConversionParameters {
        baseline_mm: args.baseline.unwrap_or(defaults.baseline_mm),
        horizontal_fov_deg: args.fov.unwrap_or(defaults.horizontal_fov_deg),
        disparity_adjustment: args.disparity.unwrap_or(defaults.disparity_adjustment),
    };

    let request = match (args.combined, args.left, args.right) {
        (Some(combined), _, _) => {
            let bytes = tokio::fs::read(&combined).await?;
            let mut screen = SplitScreen::new(config.preview.state());
            if screen.load(bytes, &store, &LogSink).await.is_err() {
                std::process::exit(1);
            }
            match screen.conversion_request(params) {
                Some(request) => request,
                None => {
                    log::error!(
                        "{} cannot be split here; pass --left and --right instead",
                        combined.display()
                    );
                    std::process::exit(1);
                }
            }
        }
        (None, Some(left), Some(right)) => {
            ConversionRequest::new(ImageSource::File(left), ImageSource::File(right), params)
        }
        _ => unreachable!("clap requires --combined or both --left and --right"),
    };
    let request = match args.output {
        Some(output) => request.with_destination(output),
        None => request,
    };

    let encoder = Arc::new(CommandEncoder::from_config(&config.encoder));
    let library_path = args.library.unwrap_or_else(|| config.library.path.clone());
    let library = Arc::new(DirectoryLibrary::new(library_path));

    let outcome = request.spawn(encoder, library, store).outcome().await;
    output::print_conversion(&params, &outcome);
    report::report_outcome(&LogSink, &outcome);
    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
