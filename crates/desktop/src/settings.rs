use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use facecam_core::capture::infrastructure::camera_config::CameraConfig;
use facecam_core::session::bootstrap::LiveViewConfig;
use facecam_core::session::output_dirs::OutputDirs;
use facecam_core::shared::constants::{
    DEFAULT_MIN_FACE_SIZE, DEFAULT_RECORDING_FPS, DEFAULT_TICK_INTERVAL_MS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    System,
    Dark,
    Light,
}

impl Appearance {
    pub const ALL: &[Appearance] = &[Appearance::System, Appearance::Dark, Appearance::Light];
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Appearance::System => write!(f, "System"),
            Appearance::Dark => write!(f, "Dark"),
            Appearance::Light => write!(f, "Light"),
        }
    }
}

/// Persisted desktop preferences. Missing fields fall back to defaults, so
/// older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// libavdevice format; platform default when unset.
    pub camera_format: Option<String>,
    /// Device URL; platform default when unset.
    pub camera_device: Option<String>,
    pub model_path: Option<PathBuf>,
    /// Root for snapshots and recordings; the working directory when unset.
    pub output_dir: Option<PathBuf>,
    pub recording_fps: f64,
    pub tick_interval_ms: u64,
    /// Percent, 0-100.
    pub confidence: u32,
    pub min_face_size: u32,
    pub placeholder_objects: bool,
    pub appearance: Appearance,
    pub high_contrast: bool,
    pub font_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_format: None,
            camera_device: None,
            model_path: None,
            output_dir: None,
            recording_fps: DEFAULT_RECORDING_FPS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            confidence: 50,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
            placeholder_objects: true,
            appearance: Appearance::System,
            high_contrast: false,
            font_scale: 1.0,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceCam").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Err(e) = self.save_to(&path) {
                log::warn!("Failed to save settings to {}: {e}", path.display());
            }
        }
    }

    /// Defaults on any read or parse failure.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn output_dirs(&self) -> OutputDirs {
        match &self.output_dir {
            Some(root) => OutputDirs::under(root),
            None => OutputDirs::default(),
        }
    }

    pub fn live_view_config(&self) -> LiveViewConfig {
        let mut camera = CameraConfig::platform_default();
        if let Some(format) = &self.camera_format {
            camera.format = format.clone();
        }
        if let Some(device) = &self.camera_device {
            camera.device = device.clone();
        }

        LiveViewConfig {
            camera,
            model_path: self.model_path.clone(),
            bundled_models_dir: std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|dir| dir.join("models"))),
            confidence: self.confidence.min(100) as f64 / 100.0,
            min_face_size: self.min_face_size,
            placeholder_objects: self.placeholder_objects,
            dirs: self.output_dirs(),
            recording_fps: self.recording_fps,
        }
    }
}
