use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};

use crate::capture::domain::frame_source::{CaptureError, FrameGrabber, FrameSource};
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Consecutive grab failures tolerated before the capture thread gives up.
const MAX_CONSECUTIVE_ERRORS: usize = 30;

/// Frames buffered between the capture thread and the loop.
const CHANNEL_CAPACITY: usize = 2;

/// Runs a blocking [`FrameGrabber`] on a worker thread and exposes it as a
/// non-blocking [`FrameSource`].
///
/// `read` hands out the newest frame and discards older ones, so a slow
/// consumer sees the live picture rather than a growing backlog.
pub struct ThreadedCamera {
    rx: Receiver<Frame>,
    metadata: VideoMetadata,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadedCamera {
    pub fn spawn<G: FrameGrabber + 'static>(grabber: G) -> Self {
        let metadata = grabber.metadata().clone();
        let (tx, rx) = crossbeam_channel::bounded::<Frame>(CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = stop.clone();
        let stale = rx.clone();

        let handle = thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || capture_loop(grabber, &tx, &stale, &stop_clone))
            .map_err(|e| log::error!("Failed to spawn capture thread: {e}"))
            .ok();

        Self {
            rx,
            metadata,
            stop,
            handle,
        }
    }
}

impl FrameSource for ThreadedCamera {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn read(&mut self) -> Result<Frame, CaptureError> {
        let mut latest = match self.rx.try_recv() {
            Ok(frame) => frame,
            Err(TryRecvError::Empty) => return Err(CaptureError::NoFrame),
            Err(TryRecvError::Disconnected) => return Err(CaptureError::Disconnected),
        };
        while let Ok(newer) = self.rx.try_recv() {
            latest = newer;
        }
        Ok(latest)
    }
}

impl Drop for ThreadedCamera {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Capture thread panicked");
            }
        }
    }
}

/// Queues `frame`, evicting the oldest buffered frame when the consumer is
/// behind so the channel always ends with the newest one.
fn push_latest(tx: &Sender<Frame>, stale: &Receiver<Frame>, mut frame: Frame) -> bool {
    loop {
        match tx.try_send(frame) {
            Ok(()) => return true,
            Err(TrySendError::Full(rejected)) => {
                log::trace!("Consumer behind, dropping oldest frame");
                let _ = stale.try_recv();
                frame = rejected;
            }
            Err(TrySendError::Disconnected(_)) => return false,
        }
    }
}

fn capture_loop<G: FrameGrabber>(
    mut grabber: G,
    tx: &Sender<Frame>,
    stale: &Receiver<Frame>,
    stop: &AtomicBool,
) {
    let mut errors = 0usize;
    while !stop.load(Ordering::Relaxed) {
        match grabber.grab() {
            Ok(Some(frame)) => {
                errors = 0;
                if !push_latest(tx, stale, frame) {
                    break;
                }
            }
            Ok(None) => {
                log::info!("Camera reached end of stream");
                break;
            }
            Err(e) => {
                errors += 1;
                log::warn!("Frame grab failed ({errors}/{MAX_CONSECUTIVE_ERRORS}): {e}");
                if errors >= MAX_CONSECUTIVE_ERRORS {
                    log::error!("Giving up on camera after repeated failures");
                    break;
                }
            }
        }
    }
    log::debug!("Capture thread exiting");
}
