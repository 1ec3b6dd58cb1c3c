pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const FACES_OUTPUT_DIR: &str = "detected_faces";
pub const OBJECTS_OUTPUT_DIR: &str = "detected_objects";

pub const FACE_FILE_PREFIX: &str = "face";
pub const OBJECT_FILE_PREFIX: &str = "object";
pub const RECORDING_FILE_PREFIX: &str = "recorded_video";
pub const RECORDING_EXTENSION: &str = "avi";

/// Timer interval of the live loop.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10;

/// Frame rate written into recordings, independent of the tick rate.
pub const DEFAULT_RECORDING_FPS: f64 = 20.0;

/// Faces smaller than this (in either dimension) are discarded.
pub const DEFAULT_MIN_FACE_SIZE: u32 = 30;

/// RGB colours of the overlay rectangles.
pub const FACE_BOX_COLOR: [u8; 3] = [255, 0, 0];
pub const OBJECT_BOX_COLOR: [u8; 3] = [0, 255, 0];
pub const BOX_THICKNESS: u32 = 2;
