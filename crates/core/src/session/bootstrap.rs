//! Wires the concrete camera, detectors and writers into a [`LiveView`].

use std::path::PathBuf;

use crate::capture::domain::frame_source::FrameSource;
use crate::capture::infrastructure::camera_config::CameraConfig;
use crate::capture::infrastructure::ffmpeg_camera::FfmpegCamera;
use crate::capture::infrastructure::threaded_camera::ThreadedCamera;
use crate::detection::domain::object_detector::{NoObjectDetector, ObjectDetector};
use crate::detection::infrastructure::model_resolver::{
    self, ModelRequest, ModelResolveError, ProgressFn,
};
use crate::detection::infrastructure::onnx_face_detector::{OnnxFaceDetector, DEFAULT_CONFIDENCE};
use crate::detection::infrastructure::placeholder_object_detector::PlaceholderObjectDetector;
use crate::session::live_view::LiveView;
use crate::session::output_dirs::OutputDirs;
use crate::session::recorder::{Recorder, WriterFactory};
use crate::shared::constants::{
    DEFAULT_MIN_FACE_SIZE, DEFAULT_RECORDING_FPS, YOLO_MODEL_NAME, YOLO_MODEL_URL,
};
use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use crate::video::infrastructure::image_file_writer::ImageFileWriter;

/// Everything needed to start the live view.
#[derive(Clone, Debug)]
pub struct LiveViewConfig {
    pub camera: CameraConfig,
    /// Face model to load instead of the cached/downloaded one.
    pub model_path: Option<PathBuf>,
    /// Directory searched for a pre-packaged model.
    pub bundled_models_dir: Option<PathBuf>,
    pub confidence: f64,
    pub min_face_size: u32,
    pub placeholder_objects: bool,
    pub dirs: OutputDirs,
    pub recording_fps: f64,
}

impl Default for LiveViewConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::platform_default(),
            model_path: None,
            bundled_models_dir: None,
            confidence: DEFAULT_CONFIDENCE,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
            placeholder_objects: true,
            dirs: OutputDirs::default(),
            recording_fps: DEFAULT_RECORDING_FPS,
        }
    }
}

/// Locates the face model, downloading it on first use.
pub fn resolve_face_model(
    config: &LiveViewConfig,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let request = ModelRequest {
        name: YOLO_MODEL_NAME,
        url: YOLO_MODEL_URL,
        explicit: config.model_path.as_deref(),
        bundled_dir: config.bundled_models_dir.as_deref(),
    };
    model_resolver::resolve(&request, progress)
}

pub fn object_detector(placeholder_objects: bool) -> Box<dyn ObjectDetector> {
    if placeholder_objects {
        Box::new(PlaceholderObjectDetector::new())
    } else {
        Box::new(NoObjectDetector)
    }
}

/// Recordings are encoded with FFmpeg.
pub fn ffmpeg_writer_factory() -> WriterFactory {
    Box::new(|| Box::new(FfmpegWriter::new()))
}

/// Creates the output directories, loads the face model and opens the
/// camera. Any failure here is fatal to the caller.
pub fn build_live_view(
    config: &LiveViewConfig,
    progress: Option<ProgressFn>,
) -> Result<LiveView, Box<dyn std::error::Error>> {
    config.dirs.ensure()?;

    let model_path = resolve_face_model(config, progress)?;
    let face_detector = OnnxFaceDetector::new(&model_path, config.confidence, config.min_face_size)?;

    let camera = FfmpegCamera::open(&config.camera)?;
    let source = ThreadedCamera::spawn(camera);
    let recording_metadata = source.metadata().with_fps(config.recording_fps);
    let recorder = Recorder::new(
        ffmpeg_writer_factory(),
        config.dirs.recordings.clone(),
        recording_metadata,
    );

    Ok(LiveView::new(
        Box::new(source),
        Box::new(face_detector),
        object_detector(config.placeholder_objects),
        Box::new(ImageFileWriter::new()),
        recorder,
        config.dirs.clone(),
    ))
}
