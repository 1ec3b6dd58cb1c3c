use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{RECORDING_EXTENSION, RECORDING_FILE_PREFIX};
use crate::shared::frame::Frame;
use crate::shared::timestamp::{now_stamp, unique_path};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("a recording is already in progress")]
    AlreadyRecording,
    #[error("no recording is in progress")]
    NotRecording,
    #[error("failed to open recording {path}: {message}")]
    Open { path: PathBuf, message: String },
    #[error("failed to write frame to {path}: {message}")]
    Write { path: PathBuf, message: String },
    #[error("failed to finalize recording {path}: {message}")]
    Close { path: PathBuf, message: String },
}

/// Produces a fresh, unopened writer for each recording.
pub type WriterFactory = Box<dyn Fn() -> Box<dyn VideoWriter> + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

/// Which of the start/stop controls may be used right now. Exactly one is
/// enabled at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Controls {
    pub start_enabled: bool,
    pub stop_enabled: bool,
}

struct ActiveRecording {
    writer: Box<dyn VideoWriter>,
    path: PathBuf,
    frames: usize,
}

/// Two-state recording machine: `Idle` or `Recording` with exactly one open
/// writer. Frames handed to [`Recorder::write`] while idle are ignored.
pub struct Recorder {
    factory: WriterFactory,
    output_dir: PathBuf,
    metadata: VideoMetadata,
    active: Option<ActiveRecording>,
}

impl Recorder {
    /// `metadata` fixes the frame size and frame rate of every recording.
    pub fn new(factory: WriterFactory, output_dir: impl Into<PathBuf>, metadata: VideoMetadata) -> Self {
        Self {
            factory,
            output_dir: output_dir.into(),
            metadata,
            active: None,
        }
    }

    pub fn state(&self) -> RecordingState {
        if self.active.is_some() {
            RecordingState::Recording
        } else {
            RecordingState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn controls(&self) -> Controls {
        let recording = self.is_recording();
        Controls {
            start_enabled: !recording,
            stop_enabled: recording,
        }
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.path.as_path())
    }

    /// Frames written to the current recording so far.
    pub fn frames_recorded(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.frames)
    }

    /// Opens `recorded_video_<timestamp>.avi` in the output directory.
    /// On failure the recorder stays idle.
    pub fn start(&mut self) -> Result<PathBuf, RecordingError> {
        if self.active.is_some() {
            return Err(RecordingError::AlreadyRecording);
        }

        let stem = format!("{RECORDING_FILE_PREFIX}_{}", now_stamp());
        let path = unique_path(&self.output_dir, &stem, RECORDING_EXTENSION);

        let mut writer = (self.factory)();
        writer
            .open(&path, &self.metadata)
            .map_err(|e| RecordingError::Open {
                path: path.clone(),
                message: e.to_string(),
            })?;

        log::info!(
            "Recording started: {} ({}x{} @ {} fps)",
            path.display(),
            self.metadata.width,
            self.metadata.height,
            self.metadata.fps
        );
        self.active = Some(ActiveRecording {
            writer,
            path: path.clone(),
            frames: 0,
        });
        Ok(path)
    }

    /// Appends one frame when recording; does nothing when idle.
    pub fn write(&mut self, frame: &Frame) -> Result<(), RecordingError> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        active.writer.write(frame).map_err(|e| RecordingError::Write {
            path: active.path.clone(),
            message: e.to_string(),
        })?;
        active.frames += 1;
        Ok(())
    }

    /// Finalizes the open recording and returns its path. The recorder is
    /// idle afterwards even if finalizing fails.
    pub fn stop(&mut self) -> Result<PathBuf, RecordingError> {
        let Some(mut active) = self.active.take() else {
            return Err(RecordingError::NotRecording);
        };
        active.writer.close().map_err(|e| RecordingError::Close {
            path: active.path.clone(),
            message: e.to_string(),
        })?;
        log::info!(
            "Recording saved: {} ({} frames)",
            active.path.display(),
            active.frames
        );
        Ok(active.path)
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if let Some(mut active) = self.active.take() {
            log::info!("Closing recording {} on shutdown", active.path.display());
            if let Err(e) = active.writer.close() {
                log::warn!("Failed to finalize {}: {e}", active.path.display());
            }
        }
    }
}
