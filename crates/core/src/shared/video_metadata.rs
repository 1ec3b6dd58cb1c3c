/// Geometry and timing of a capture stream or a recording.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub codec: String,
}

impl VideoMetadata {
    /// Same geometry, different frame rate. Recordings use the configured
    /// rate rather than whatever the device reports.
    pub fn with_fps(&self, fps: f64) -> Self {
        Self {
            fps,
            ..self.clone()
        }
    }
}
