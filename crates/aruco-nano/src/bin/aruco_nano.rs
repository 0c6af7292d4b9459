//! aruco-nano CLI: detect ARUCO_MIP_36h12 markers in image files.

use aruco_nano::detect::{detect_markers, load_image};
use aruco_nano::dict::builtins::ARUCO_MIP_36H12;
use aruco_nano::draw::{draw_markers, RED};
use aruco_nano::{CameraModel, DetectorParams, Marker, MarkerDetector, MarkerPose};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "aruco-nano")]
#[command(about = "Detect ARUCO_MIP_36h12 square fiducial markers and estimate their pose")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect markers in an image.
    Detect(CliDetectArgs),

    /// Print the embedded dictionary.
    DictInfo,
}

#[derive(Debug, Clone, Args)]
struct CliDetectArgs {
    /// Path to the input image.
    image: PathBuf,

    /// JSON run configuration (detector params, optional camera and marker size).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the sampling attempts per candidate.
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Override the physical marker side length used for pose.
    #[arg(long)]
    marker_size: Option<f64>,

    /// Write an annotated copy of the input image.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print results as JSON instead of text.
    #[arg(long)]
    json: bool,
}

/// Contents of the `--config` file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RunConfig {
    detector: DetectorParams,
    camera: Option<CameraModel>,
    marker_size: Option<f64>,
}

#[derive(Debug, Serialize)]
struct MarkerReport {
    #[serde(flatten)]
    marker: Marker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pose: Option<MarkerPose>,
}

#[derive(Debug, Serialize)]
struct DetectReport {
    image: String,
    width: u32,
    height: u32,
    markers: Vec<MarkerReport>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::DictInfo => run_dict_info(),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(_verbose: u8) {
    aruco_nano::core::init_tracing(false);
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8) {
    let level = aruco_nano::core::level_from_verbosity(verbose);
    if let Err(e) = aruco_nano::core::init_with_level(level) {
        eprintln!("logger already installed: {e}");
    }
}

fn load_config(path: Option<&Path>) -> CliResult<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| -> CliError {
        format!("failed to read config {}: {}", path.display(), e).into()
    })?;
    let cfg: RunConfig = serde_json::from_str(&text).map_err(|e| -> CliError {
        format!("invalid config {}: {}", path.display(), e).into()
    })?;
    Ok(cfg)
}

fn run_detect(args: &CliDetectArgs) -> CliResult<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(n) = args.max_attempts {
        cfg.detector.max_attempts_per_candidate = n;
    }
    if args.marker_size.is_some() {
        cfg.marker_size = args.marker_size;
    }
    if let Some(camera) = &cfg.camera {
        if !camera.intrinsics.is_valid() {
            return Err("invalid camera intrinsics: fx/fy must be finite and non-zero".into());
        }
    }

    log::info!("loading image {}", args.image.display());
    let img = load_image(&args.image).map_err(|e| -> CliError {
        format!("failed to open image {}: {}", args.image.display(), e).into()
    })?;
    log::info!("image size {}x{}", img.width(), img.height());

    let detector = MarkerDetector::new(cfg.detector.clone());
    let markers = detect_markers(&img, &detector);
    log::info!("detected {} markers", markers.len());

    let marker_size = cfg.marker_size.unwrap_or(1.0);
    let reports: Vec<MarkerReport> = markers
        .iter()
        .map(|m| {
            let pose = cfg.camera.as_ref().and_then(|camera| {
                m.estimate_pose(camera, marker_size)
                    .map_err(|e| log::warn!("pose of marker {} failed: {}", m.id, e))
                    .ok()
            });
            MarkerReport {
                marker: m.clone(),
                pose,
            }
        })
        .collect();

    if let Some(out) = &args.output {
        let mut canvas = img.to_rgb8();
        draw_markers(&mut canvas, &markers, RED);
        canvas.save(out)?;
        log::info!("annotated image written to {}", out.display());
    }

    let report = DetectReport {
        image: args.image.display().to_string(),
        width: img.width(),
        height: img.height(),
        markers: reports,
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &DetectReport) {
    println!(
        "{}: {} markers ({}x{})",
        report.image,
        report.markers.len(),
        report.width,
        report.height
    );
    for r in &report.markers {
        let m = &r.marker;
        let corners: Vec<String> = m
            .corners
            .iter()
            .map(|p| format!("({:.2}, {:.2})", p.x, p.y))
            .collect();
        println!("  id {:3}  rot {}  {}", m.id, m.rotation, corners.join(" "));
        if let Some(pose) = &r.pose {
            println!(
                "          rvec [{:.4}, {:.4}, {:.4}]  tvec [{:.4}, {:.4}, {:.4}]  rms {:.3}px",
                pose.rvec.x,
                pose.rvec.y,
                pose.rvec.z,
                pose.tvec.x,
                pose.tvec.y,
                pose.tvec.z,
                pose.reproj_rms
            );
        }
    }
}

fn run_dict_info() -> CliResult<()> {
    let dict = &ARUCO_MIP_36H12;
    println!("aruco-nano embedded dictionary");
    println!("  name:          {}", dict.name);
    println!("  marker size:   {}x{} bits", dict.marker_size, dict.marker_size);
    println!("  markers:       {}", dict.len());
    let last_id = (dict.len() as u32).saturating_sub(1);
    if let (Some(first), Some(last)) = (dict.code(0), dict.code(last_id)) {
        println!("  first code:    0x{:09X}", first);
        println!("  last code:     0x{:09X}", last);
    }
    Ok(())
}
