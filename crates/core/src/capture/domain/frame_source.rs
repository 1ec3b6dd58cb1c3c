use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Nothing new has arrived since the last read.
    #[error("no frame available")]
    NoFrame,
    /// The device stopped delivering frames for good.
    #[error("capture device disconnected")]
    Disconnected,
    #[error("capture failed: {0}")]
    Device(String),
}

/// A live source of frames, polled once per tick.
///
/// `read` must not block: a source with nothing ready returns
/// [`CaptureError::NoFrame`].
pub trait FrameSource: Send {
    fn metadata(&self) -> &VideoMetadata;

    fn read(&mut self) -> Result<Frame, CaptureError>;
}

/// A blocking frame producer, such as a camera device.
///
/// `grab` waits for the next frame; `Ok(None)` signals end of stream.
pub trait FrameGrabber: Send {
    fn metadata(&self) -> &VideoMetadata;

    fn grab(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;
}
