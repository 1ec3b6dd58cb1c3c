use std::path::PathBuf;

use crate::capture::domain::frame_source::FrameSource;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::object_detector::ObjectDetector;
use crate::overlay::annotator::Annotator;
use crate::session::output_dirs::OutputDirs;
use crate::session::recorder::{Controls, Recorder, RecordingError, RecordingState};
use crate::session::snapshot::{save_crops, SnapshotReport};
use crate::shared::constants::{FACE_FILE_PREFIX, OBJECT_FILE_PREFIX};
use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::shared::timestamp::now_stamp;
use crate::video::domain::image_writer::ImageWriter;

/// What one successful tick produced, ready for display.
pub struct TickOutput {
    pub frame: Frame,
    pub faces: Vec<Region>,
    pub objects: Vec<Region>,
    /// The frame went into the open recording.
    pub recorded: bool,
    /// Set when a recording is open but the frame could not be appended.
    /// The frame is still good for display.
    pub record_error: Option<RecordingError>,
}

/// The render/record loop: capture, detect, annotate, optionally record.
///
/// Single-owner. The front-end calls [`LiveView::tick`] on a timer and the
/// action methods in response to user input, all from the same thread.
pub struct LiveView {
    source: Box<dyn FrameSource>,
    face_detector: Box<dyn FaceDetector>,
    object_detector: Box<dyn ObjectDetector>,
    annotator: Annotator,
    image_writer: Box<dyn ImageWriter>,
    recorder: Recorder,
    dirs: OutputDirs,
    last_raw: Option<Frame>,
    frames_shown: usize,
}

impl LiveView {
    pub fn new(
        source: Box<dyn FrameSource>,
        face_detector: Box<dyn FaceDetector>,
        object_detector: Box<dyn ObjectDetector>,
        image_writer: Box<dyn ImageWriter>,
        recorder: Recorder,
        dirs: OutputDirs,
    ) -> Self {
        Self {
            source,
            face_detector,
            object_detector,
            annotator: Annotator::default(),
            image_writer,
            recorder,
            dirs,
            last_raw: None,
            frames_shown: 0,
        }
    }

    pub fn dirs(&self) -> &OutputDirs {
        &self.dirs
    }

    pub fn recording_state(&self) -> RecordingState {
        self.recorder.state()
    }

    pub fn controls(&self) -> Controls {
        self.recorder.controls()
    }

    pub fn recording_path(&self) -> Option<PathBuf> {
        self.recorder.current_path().map(|p| p.to_path_buf())
    }

    pub fn frames_recorded(&self) -> usize {
        self.recorder.frames_recorded()
    }

    /// Successful ticks since start.
    pub fn frames_shown(&self) -> usize {
        self.frames_shown
    }

    /// One pass of the loop.
    ///
    /// `Ok(None)` means no frame was available and nothing changed. Errors
    /// come from the detectors and the loop can keep ticking after one. A
    /// failed recording write is reported in [`TickOutput::record_error`]
    /// and leaves the recording open.
    pub fn tick(&mut self) -> Result<Option<TickOutput>, Box<dyn std::error::Error>> {
        let raw = match self.source.read() {
            Ok(frame) => frame,
            Err(e) => {
                log::trace!("Tick skipped: {e}");
                return Ok(None);
            }
        };

        let (faces, objects) = self.detect(&raw)?;

        let mut frame = raw.clone();
        self.annotator.annotate(&mut frame, &faces, &objects);
        self.last_raw = Some(raw);
        self.frames_shown += 1;

        let record_error = match self.recorder.write(&frame) {
            Ok(()) => None,
            Err(e) => {
                log::warn!("{e}");
                Some(e)
            }
        };
        let recorded = self.recorder.is_recording() && record_error.is_none();

        Ok(Some(TickOutput {
            frame,
            faces,
            objects,
            recorded,
            record_error,
        }))
    }

    /// Saves the detected faces and objects of the current frame as crops.
    ///
    /// Uses a fresh frame when the source has one, otherwise the last frame
    /// the loop saw. With no frame at all the report is empty.
    pub fn snapshot(&mut self) -> Result<SnapshotReport, Box<dyn std::error::Error>> {
        let frame = match self.source.read() {
            Ok(frame) => {
                self.last_raw = Some(frame.clone());
                frame
            }
            Err(e) => match &self.last_raw {
                Some(frame) => {
                    log::debug!("Snapshot using last frame ({e})");
                    frame.clone()
                }
                None => {
                    log::warn!("Snapshot skipped: no frame available");
                    return Ok(SnapshotReport::default());
                }
            },
        };

        let (faces, objects) = self.detect(&frame)?;
        let stamp = now_stamp();
        let writer = self.image_writer.as_ref();
        let report = SnapshotReport {
            faces: save_crops(writer, &frame, &faces, &self.dirs.faces, FACE_FILE_PREFIX, &stamp)?,
            objects: save_crops(
                writer,
                &frame,
                &objects,
                &self.dirs.objects,
                OBJECT_FILE_PREFIX,
                &stamp,
            )?,
        };
        log::info!(
            "Snapshot saved {} face(s) and {} object(s)",
            report.faces.len(),
            report.objects.len()
        );
        Ok(report)
    }

    pub fn start_recording(&mut self) -> Result<PathBuf, RecordingError> {
        self.recorder.start()
    }

    pub fn stop_recording(&mut self) -> Result<PathBuf, RecordingError> {
        self.recorder.stop()
    }

    fn detect(&mut self, frame: &Frame) -> Result<(Vec<Region>, Vec<Region>), Box<dyn std::error::Error>> {
        let faces = self.face_detector.detect(frame)?;
        let objects = self.object_detector.detect(frame)?;
        Ok((faces, objects))
    }
}
