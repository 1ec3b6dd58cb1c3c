use iced::widget::{button, column, container, image, row, text, Space};
use iced::{ContentFit, Element, Length, Theme};

use crate::app::{scaled, LiveStatus, Message};
use crate::theme::status_color;

pub fn view<'a>(
    fs: f32,
    frame: Option<&image::Handle>,
    status: &LiveStatus<'_>,
    theme: &Theme,
) -> Element<'a, Message> {
    let canvas: Element<'a, Message> = match frame {
        Some(handle) => image(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => container(text(waiting_message(status)).size(scaled(14.0, fs)))
            .center(Length::Fill)
            .into(),
    };

    let controls = status.controls;
    let snapshot_btn = button(text("Take Snapshot").size(scaled(13.0, fs)))
        .on_press_maybe(controls.map(|_| Message::TakeSnapshot))
        .padding([8, 16])
        .style(button::secondary);
    let start_btn = button(text("Start Recording").size(scaled(13.0, fs)))
        .on_press_maybe(
            controls
                .filter(|c| c.start_enabled)
                .map(|_| Message::StartRecording),
        )
        .padding([8, 16])
        .style(button::primary);
    let stop_btn = button(text("Stop Recording").size(scaled(13.0, fs)))
        .on_press_maybe(
            controls
                .filter(|c| c.stop_enabled)
                .map(|_| Message::StopRecording),
        )
        .padding([8, 16])
        .style(button::danger);
    let folder_btn = button(text("Open Output Folder").size(scaled(13.0, fs)))
        .on_press(Message::OpenOutputFolder)
        .padding([8, 16])
        .style(button::text);

    let recording = status.recording.is_some();
    let state_line = match &status.recording {
        Some((path, frames)) => format!("\u{25CF} Recording {} ({frames} frames)", path.display()),
        None => "Idle".to_string(),
    };

    column![
        container(canvas).width(Length::Fill).height(Length::Fill),
        Space::new().height(10),
        row![snapshot_btn, start_btn, stop_btn, Space::new().width(Length::Fill), folder_btn]
            .spacing(8)
            .align_y(iced::Alignment::Center),
        Space::new().height(8),
        text(state_line)
            .size(scaled(12.0, fs))
            .color(status_color(theme, recording)),
        text(status.message.to_string()).size(scaled(12.0, fs)),
    ]
    .spacing(0)
    .into()
}

/// Shown in place of the canvas when startup failed.
pub fn error_view<'a>(fs: f32, error: &str) -> Element<'a, Message> {
    let content = column![
        text("FaceCam could not start").size(scaled(20.0, fs)),
        Space::new().height(8),
        text(error.to_string()).size(scaled(13.0, fs)),
        Space::new().height(16),
        button(text("Quit").size(scaled(13.0, fs)))
            .on_press(Message::Quit)
            .padding([8, 20])
            .style(button::danger),
    ]
    .align_x(iced::Alignment::Center)
    .max_width(520);

    container(content).center(Length::Fill).into()
}

fn waiting_message(status: &LiveStatus<'_>) -> String {
    match status.download {
        Some((done, total)) if total > 0 => {
            let pct = (done as f64 / total as f64 * 100.0) as u32;
            format!("Downloading face detection model... {pct}%")
        }
        Some((done, _)) => format!("Downloading face detection model... {done} bytes"),
        None if status.starting => "Starting camera...".to_string(),
        None => "Waiting for camera...".to_string(),
    }
}
