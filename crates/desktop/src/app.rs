use std::path::PathBuf;
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use iced::widget::{button, column, container, image, row, scrollable, text};
use iced::{window, Element, Length, Subscription, Task, Theme};

use facecam_core::session::live_view::LiveView;
use facecam_core::session::recorder::{Controls, RecordingState};

use crate::settings::{Appearance, Settings};
use crate::tabs;
use crate::theme;
use crate::workers::startup_worker::{self, StartupMessage};

// ---------------------------------------------------------------------------
// Tab enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Live,
    Settings,
}

impl Tab {
    const ALL: &[Tab] = &[Tab::Live, Tab::Settings];

    fn label(self) -> &'static str {
        match self {
            Tab::Live => "Camera",
            Tab::Settings => "Settings",
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    Tick,
    TakeSnapshot,
    StartRecording,
    StopRecording,
    OpenOutputFolder,
    CloseRequested(window::Id),
    Quit,
    CameraFormatChanged(String),
    CameraDeviceChanged(String),
    ConfidenceChanged(u32),
    MinFaceSizeChanged(u32),
    RecordingFpsChanged(f64),
    PlaceholderObjectsChanged(bool),
    RestoreDefaults,
    AppearanceChanged(Appearance),
    HighContrastChanged(bool),
    FontScaleChanged(f32),
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Lifecycle of the camera session.
pub enum Phase {
    Starting {
        rx: Receiver<StartupMessage>,
        download: Option<(u64, u64)>,
    },
    Running(Box<LiveView>),
    Failed(String),
    Closing,
}

/// What the live tab shows under the canvas.
pub struct LiveStatus<'a> {
    pub controls: Option<Controls>,
    pub recording: Option<(PathBuf, usize)>,
    pub message: &'a str,
    pub download: Option<(u64, u64)>,
    pub starting: bool,
}

pub struct App {
    active_tab: Tab,
    pub settings: Settings,
    phase: Phase,
    frame: Option<image::Handle>,
    status: String,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let rx = startup_worker::spawn(settings.live_view_config());
        (
            Self {
                active_tab: Tab::Live,
                settings,
                phase: Phase::Starting { rx, download: None },
                frame: None,
                status: String::new(),
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.active_tab = tab;
            }
            Message::Tick => self.on_tick(),
            Message::TakeSnapshot => {
                if let Phase::Running(view) = &mut self.phase {
                    self.status = match view.snapshot() {
                        Ok(report) if report.is_empty() => "Snapshot: nothing detected".to_string(),
                        Ok(report) => format!(
                            "Snapshot saved {} face(s) and {} object(s)",
                            report.faces.len(),
                            report.objects.len()
                        ),
                        Err(e) => {
                            log::error!("Snapshot failed: {e}");
                            format!("Snapshot failed: {e}")
                        }
                    };
                }
            }
            Message::StartRecording => {
                if let Phase::Running(view) = &mut self.phase {
                    self.status = match view.start_recording() {
                        Ok(path) => format!("Recording to {}", path.display()),
                        Err(e) => {
                            log::error!("Could not start recording: {e}");
                            format!("Could not start recording: {e}")
                        }
                    };
                }
            }
            Message::StopRecording => {
                if let Phase::Running(view) = &mut self.phase {
                    self.status = match view.stop_recording() {
                        Ok(path) => format!("Saved {}", path.display()),
                        Err(e) => {
                            log::error!("Could not stop recording: {e}");
                            format!("Could not stop recording: {e}")
                        }
                    };
                }
            }
            Message::OpenOutputFolder => {
                let dir = self
                    .settings
                    .output_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("."));
                if let Err(e) = open::that(&dir) {
                    log::warn!("Failed to open {}: {e}", dir.display());
                }
            }
            Message::CloseRequested(_) => {
                self.shutdown();
                return iced::exit();
            }
            Message::Quit => {
                self.shutdown();
                return iced::exit();
            }
            Message::CameraFormatChanged(value) => {
                self.settings.camera_format = non_empty(value);
                self.settings.save();
            }
            Message::CameraDeviceChanged(value) => {
                self.settings.camera_device = non_empty(value);
                self.settings.save();
            }
            Message::ConfidenceChanged(val) => {
                self.settings.confidence = val;
                self.settings.save();
            }
            Message::MinFaceSizeChanged(val) => {
                self.settings.min_face_size = val;
                self.settings.save();
            }
            Message::RecordingFpsChanged(val) => {
                self.settings.recording_fps = val;
                self.settings.save();
            }
            Message::PlaceholderObjectsChanged(enabled) => {
                self.settings.placeholder_objects = enabled;
                self.settings.save();
            }
            Message::RestoreDefaults => {
                let defaults = Settings::default();
                self.settings.confidence = defaults.confidence;
                self.settings.min_face_size = defaults.min_face_size;
                self.settings.recording_fps = defaults.recording_fps;
                self.settings.placeholder_objects = defaults.placeholder_objects;
                self.settings.save();
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::HighContrastChanged(enabled) => {
                self.settings.high_contrast = enabled;
                self.settings.save();
            }
            Message::FontScaleChanged(scale) => {
                self.settings.font_scale = scale;
                self.settings.save();
            }
        }
        Task::none()
    }

    fn on_tick(&mut self) {
        match &mut self.phase {
            Phase::Starting { rx, download } => {
                if let Some(phase) = poll_startup(rx, download) {
                    self.phase = phase;
                }
            }
            Phase::Running(view) => match view.tick() {
                Ok(Some(out)) => {
                    let (w, h) = (out.frame.width(), out.frame.height());
                    self.frame = Some(image::Handle::from_rgba(w, h, out.frame.to_rgba()));
                    if let Some(e) = out.record_error {
                        self.status = format!("Recording error: {e}");
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Tick failed: {e}");
                    self.status = format!("Error: {e}");
                }
            },
            Phase::Failed(_) | Phase::Closing => {}
        }
    }

    /// Finalizes an open recording and releases the camera.
    fn shutdown(&mut self) {
        if let Phase::Running(view) = &mut self.phase {
            if view.recording_state() == RecordingState::Recording {
                match view.stop_recording() {
                    Ok(path) => log::info!("Recording saved on exit: {}", path.display()),
                    Err(e) => log::error!("Failed to finalize recording on exit: {e}"),
                }
            }
        }
        self.phase = Phase::Closing;
    }

    pub fn view(&self) -> Element<'_, Message> {
        let fs = self.settings.font_scale;

        if let Phase::Failed(error) = &self.phase {
            return tabs::live_tab::error_view(fs, error);
        }

        let tab_bar = row(Tab::ALL
            .iter()
            .map(|&tab| {
                let label = text(tab.label()).size(scaled(13.0, fs));
                let btn = button(label)
                    .on_press(Message::TabSelected(tab))
                    .padding([6, 14]);
                if tab == self.active_tab {
                    btn.style(button::primary).into()
                } else {
                    btn.style(button::text).into()
                }
            })
            .collect::<Vec<_>>())
        .spacing(2);

        let content: Element<'_, Message> = match self.active_tab {
            Tab::Live => {
                tabs::live_tab::view(fs, self.frame.as_ref(), &self.live_status(), &self.theme())
            }
            Tab::Settings => scrollable(tabs::settings_tab::view(&self.settings)).into(),
        };

        column![
            tab_bar,
            container(content).padding(12).height(Length::Fill)
        ]
        .height(Length::Fill)
        .into()
    }

    fn live_status(&self) -> LiveStatus<'_> {
        let mut status = LiveStatus {
            controls: None,
            recording: None,
            message: &self.status,
            download: None,
            starting: false,
        };
        match &self.phase {
            Phase::Starting { download, .. } => {
                status.starting = true;
                status.download = *download;
            }
            Phase::Running(view) => {
                status.controls = Some(view.controls());
                status.recording = view
                    .recording_path()
                    .map(|path| (path, view.frames_recorded()));
            }
            Phase::Failed(_) | Phase::Closing => {}
        }
        status
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance, self.settings.high_contrast)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let interval = Duration::from_millis(self.settings.tick_interval_ms.max(1));
        Subscription::batch([
            iced::time::every(interval).map(|_| Message::Tick),
            window::close_requests().map(Message::CloseRequested),
        ])
    }
}

/// Drains startup messages. Returns the next phase once startup ends,
/// including when the startup thread vanished without a result.
fn poll_startup(
    rx: &Receiver<StartupMessage>,
    download: &mut Option<(u64, u64)>,
) -> Option<Phase> {
    loop {
        match rx.try_recv() {
            Ok(StartupMessage::DownloadProgress(done, total)) => {
                *download = Some((done, total));
            }
            Ok(StartupMessage::Ready(view)) => return Some(Phase::Running(view)),
            Ok(StartupMessage::Failed(e)) => return Some(Phase::Failed(e)),
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                log::error!("Startup thread exited without reporting a result");
                return Some(Phase::Failed(
                    "startup thread exited unexpectedly".to_string(),
                ));
            }
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Scale a base font size by the user's font_scale setting.
pub fn scaled(base: f32, font_scale: f32) -> f32 {
    (base * font_scale).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_rounds() {
        assert_eq!(scaled(13.0, 1.0), 13.0);
        assert_eq!(scaled(13.0, 1.5), 20.0);
    }

    #[test]
    fn test_startup_pending_keeps_progress() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(StartupMessage::DownloadProgress(10, 100)).unwrap();
        let mut download = None;
        assert!(poll_startup(&rx, &mut download).is_none());
        assert_eq!(download, Some((10, 100)));
    }

    #[test]
    fn test_startup_failure_is_reported() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(StartupMessage::Failed("no camera".to_string())).unwrap();
        let mut download = None;
        match poll_startup(&rx, &mut download) {
            Some(Phase::Failed(msg)) => assert_eq!(msg, "no camera"),
            _ => panic!("expected failed phase"),
        }
    }

    #[test]
    fn test_vanished_startup_thread_fails() {
        let (tx, rx) = crossbeam_channel::unbounded::<StartupMessage>();
        drop(tx);
        let mut download = None;
        match poll_startup(&rx, &mut download) {
            Some(Phase::Failed(msg)) => assert!(msg.contains("exited unexpectedly")),
            _ => panic!("expected failed phase"),
        }
    }

    #[test]
    fn test_blank_input_clears_override() {
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty("v4l2".to_string()), Some("v4l2".to_string()));
    }
}
