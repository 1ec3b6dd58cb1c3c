use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};

use facecam_core::capture::infrastructure::camera_config::CameraConfig;
use facecam_core::capture::infrastructure::ffmpeg_camera::available_formats;
use facecam_core::session::bootstrap::{build_live_view, LiveViewConfig};
use facecam_core::session::live_view::LiveView;
use facecam_core::session::output_dirs::OutputDirs;
use facecam_core::shared::constants::{
    DEFAULT_MIN_FACE_SIZE, DEFAULT_RECORDING_FPS, DEFAULT_TICK_INTERVAL_MS,
};

/// How long to wait for the camera's first frame.
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(10);

/// Webcam face overlays, snapshots and recording without a window.
#[derive(Parser)]
#[command(name = "facecam")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Save crops of the faces and objects in the current frame, then exit.
    Snapshot {
        #[command(flatten)]
        opts: SessionArgs,
    },
    /// Record the annotated camera feed for a fixed duration.
    Record {
        /// Recording length in seconds.
        #[arg(long, default_value = "10")]
        seconds: f64,

        #[command(flatten)]
        opts: SessionArgs,
    },
    /// List the capture formats available in this FFmpeg build.
    Devices,
}

#[derive(Args, Clone)]
struct SessionArgs {
    /// Capture format (v4l2, avfoundation, dshow, ...). Platform default if unset.
    #[arg(long)]
    format: Option<String>,

    /// Capture device, e.g. /dev/video0 or "0". Platform default if unset.
    #[arg(long)]
    device: Option<String>,

    /// Requested capture width; needs --height.
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Requested capture height; needs --width.
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Face model file. Downloaded to the cache when unset.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value = "0.5")]
    confidence: f64,

    /// Faces smaller than this many pixels on either side are ignored.
    #[arg(long, default_value_t = DEFAULT_MIN_FACE_SIZE)]
    min_face_size: u32,

    /// Disable the placeholder object overlay.
    #[arg(long)]
    no_objects: bool,

    /// Directory receiving detected_faces/, detected_objects/ and recordings.
    #[arg(long, default_value = ".")]
    output: PathBuf,

    /// Frame rate written into recordings.
    #[arg(long, default_value_t = DEFAULT_RECORDING_FPS)]
    fps: f64,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Snapshot { opts } => {
            validate(&opts)?;
            run_snapshot(&opts)
        }
        Command::Record { seconds, opts } => {
            validate(&opts)?;
            if !(seconds > 0.0 && seconds.is_finite()) {
                return Err(format!("Seconds must be positive, got {seconds}").into());
            }
            run_record(&opts, Duration::from_secs_f64(seconds))
        }
        Command::Devices => {
            for name in available_formats()? {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn run_snapshot(opts: &SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut view = start(opts)?;
    wait_for_first_frame(&mut view)?;

    let report = view.snapshot()?;
    for path in report.faces.iter().chain(&report.objects) {
        println!("{}", path.display());
    }
    log::info!(
        "Snapshot: {} face(s), {} object(s)",
        report.faces.len(),
        report.objects.len()
    );
    Ok(())
}

fn run_record(opts: &SessionArgs, duration: Duration) -> Result<(), Box<dyn std::error::Error>> {
    let mut view = start(opts)?;
    wait_for_first_frame(&mut view)?;

    let interval = Duration::from_millis(DEFAULT_TICK_INTERVAL_MS);
    view.start_recording()?;
    let started = Instant::now();
    while started.elapsed() < duration {
        match view.tick() {
            Ok(Some(out)) => {
                if let Some(e) = out.record_error {
                    if let Err(stop) = view.stop_recording() {
                        log::warn!("{stop}");
                    }
                    return Err(e.into());
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("Tick failed: {e}"),
        }
        thread::sleep(interval);
    }
    let frames = view.frames_recorded();
    let path = view.stop_recording()?;
    println!("{}", path.display());
    log::info!("Recorded {frames} frames");
    Ok(())
}

fn start(opts: &SessionArgs) -> Result<LiveView, Box<dyn std::error::Error>> {
    let config = live_view_config(opts);
    let view = build_live_view(&config, Some(Box::new(download_progress)))?;
    eprintln!();
    Ok(view)
}

/// Ticks until the camera delivers a frame, so the first snapshot or
/// recorded frame is real.
fn wait_for_first_frame(view: &mut LiveView) -> Result<(), Box<dyn std::error::Error>> {
    let deadline = Instant::now() + FIRST_FRAME_TIMEOUT;
    let interval = Duration::from_millis(DEFAULT_TICK_INTERVAL_MS);
    while Instant::now() < deadline {
        if view.tick()?.is_some() {
            return Ok(());
        }
        thread::sleep(interval);
    }
    Err(format!(
        "No frame from camera within {} seconds",
        FIRST_FRAME_TIMEOUT.as_secs()
    )
    .into())
}

fn live_view_config(opts: &SessionArgs) -> LiveViewConfig {
    let mut camera = CameraConfig::platform_default();
    if let Some(format) = &opts.format {
        camera.format = format.clone();
    }
    if let Some(device) = &opts.device {
        camera.device = device.clone();
    }
    camera.width = opts.width;
    camera.height = opts.height;

    LiveViewConfig {
        camera,
        model_path: opts.model.clone(),
        bundled_models_dir: bundled_models_dir(),
        confidence: opts.confidence,
        min_face_size: opts.min_face_size,
        placeholder_objects: !opts.no_objects,
        dirs: OutputDirs::under(&opts.output),
        recording_fps: opts.fps,
    }
}

/// `models/` next to the executable, for packaged installs.
fn bundled_models_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("models")))
}

fn validate(opts: &SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&opts.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            opts.confidence
        )
        .into());
    }
    if !(opts.fps > 0.0 && opts.fps.is_finite()) {
        return Err(format!("Frame rate must be positive, got {}", opts.fps).into());
    }
    if let Some(model) = &opts.model {
        if !model.exists() {
            return Err(format!("Model file not found: {}", model.display()).into());
        }
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("facecam").chain(args.iter().copied())).unwrap()
    }

    fn session(cli: Cli) -> SessionArgs {
        match cli.command {
            Command::Snapshot { opts } | Command::Record { opts, .. } => opts,
            Command::Devices => panic!("no session args"),
        }
    }

    #[test]
    fn test_record_defaults() {
        let cli = parse(&["record"]);
        match cli.command {
            Command::Record { seconds, opts } => {
                assert_eq!(seconds, 10.0);
                assert_eq!(opts.fps, DEFAULT_RECORDING_FPS);
                assert_eq!(opts.min_face_size, DEFAULT_MIN_FACE_SIZE);
                assert!(!opts.no_objects);
            }
            _ => panic!("expected record"),
        }
    }

    #[test]
    fn test_width_requires_height() {
        let args = ["facecam", "snapshot", "--width", "640"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_config_overrides_camera_and_output() {
        let opts = session(parse(&[
            "snapshot",
            "--format",
            "v4l2",
            "--device",
            "/dev/video2",
            "--width",
            "640",
            "--height",
            "480",
            "--output",
            "out",
            "--no-objects",
        ]));
        let config = live_view_config(&opts);
        assert_eq!(config.camera.format, "v4l2");
        assert_eq!(config.camera.device, "/dev/video2");
        assert_eq!(config.camera.width, Some(640));
        assert_eq!(config.dirs.faces, PathBuf::from("out/detected_faces"));
        assert_eq!(config.dirs.recordings, PathBuf::from("out"));
        assert!(!config.placeholder_objects);
    }

    #[test]
    fn test_validate_rejects_out_of_range_confidence() {
        let opts = session(parse(&["snapshot", "--confidence", "1.5"]));
        assert!(validate(&opts).is_err());
    }

    #[test]
    fn test_validate_rejects_missing_model() {
        let opts = session(parse(&["snapshot", "--model", "/nonexistent/face.onnx"]));
        let err = validate(&opts).unwrap_err();
        assert!(err.to_string().contains("Model file not found"));
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(validate(&session(parse(&["snapshot"]))).is_ok());
    }
}
