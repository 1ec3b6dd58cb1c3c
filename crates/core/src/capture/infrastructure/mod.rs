pub mod camera_config;
pub mod ffmpeg_camera;
pub mod threaded_camera;
