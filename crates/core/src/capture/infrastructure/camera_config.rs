/// Which libavdevice input to open and how.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraConfig {
    /// libavdevice input format, e.g. `v4l2`, `avfoundation`, `dshow`.
    pub format: String,
    /// Device URL understood by that format.
    pub device: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub framerate: Option<u32>,
}

impl CameraConfig {
    /// First camera on the current platform.
    pub fn platform_default() -> Self {
        let (format, device) = default_device();
        Self {
            format: format.to_string(),
            device: device.to_string(),
            width: None,
            height: None,
            framerate: None,
        }
    }

    /// Demuxer options passed when opening the device.
    pub fn options(&self) -> Vec<(&'static str, String)> {
        let mut opts = Vec::new();
        if let (Some(w), Some(h)) = (self.width, self.height) {
            opts.push(("video_size", format!("{w}x{h}")));
        }
        if let Some(fps) = self.framerate {
            opts.push(("framerate", fps.to_string()));
        }
        opts
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self::platform_default()
    }
}

#[cfg(target_os = "linux")]
fn default_device() -> (&'static str, &'static str) {
    ("v4l2", "/dev/video0")
}

#[cfg(target_os = "macos")]
fn default_device() -> (&'static str, &'static str) {
    ("avfoundation", "0")
}

#[cfg(target_os = "windows")]
fn default_device() -> (&'static str, &'static str) {
    ("dshow", "video=Integrated Camera")
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn default_device() -> (&'static str, &'static str) {
    ("v4l2", "/dev/video0")
}
