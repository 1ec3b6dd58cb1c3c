use iced::widget::{button, checkbox, column, pick_list, row, slider, text, text_input, Space};
use iced::Element;

use crate::app::{scaled, Message};
use crate::settings::{Appearance, Settings};

pub fn view<'a>(settings: &Settings) -> Element<'a, Message> {
    let fs = settings.font_scale;
    let label = |s: &'static str| text(s).size(scaled(13.0, fs)).width(150);

    let camera = column![
        text("Camera").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            label("Capture format"),
            text_input("platform default", settings.camera_format.as_deref().unwrap_or(""))
                .on_input(Message::CameraFormatChanged)
                .size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        Space::new().height(6),
        row![
            label("Device"),
            text_input("platform default", settings.camera_device.as_deref().unwrap_or(""))
                .on_input(Message::CameraDeviceChanged)
                .size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
    ];

    let detection = column![
        text("Detection").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            label("Confidence"),
            slider(10..=95, settings.confidence, Message::ConfidenceChanged),
            text(format!("{}%", settings.confidence)).size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        Space::new().height(6),
        row![
            label("Minimum face size"),
            slider(10..=200, settings.min_face_size, Message::MinFaceSizeChanged).step(2u32),
            text(format!("{} px", settings.min_face_size)).size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        Space::new().height(6),
        checkbox(settings.placeholder_objects)
            .label("Show placeholder object boxes")
            .on_toggle(Message::PlaceholderObjectsChanged)
            .text_size(scaled(13.0, fs)),
    ];

    let recording = column![
        text("Recording").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            label("Frame rate"),
            slider(5.0..=60.0, settings.recording_fps, Message::RecordingFpsChanged).step(1.0),
            text(format!("{:.0} fps", settings.recording_fps)).size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
    ];

    let appearance = column![
        text("Appearance").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            label("Mode"),
            pick_list(Appearance::ALL, Some(settings.appearance), Message::AppearanceChanged)
                .text_size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        Space::new().height(6),
        checkbox(settings.high_contrast)
            .label("High contrast")
            .on_toggle(Message::HighContrastChanged)
            .text_size(scaled(13.0, fs)),
        Space::new().height(6),
        row![
            label("Font size"),
            slider(0.8..=1.5, settings.font_scale, Message::FontScaleChanged).step(0.05),
            text(format!("{:.0}%", settings.font_scale * 100.0)).size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
    ];

    column![
        camera,
        Space::new().height(20),
        detection,
        Space::new().height(20),
        recording,
        Space::new().height(12),
        text("Camera, detection and recording changes apply on next launch.")
            .size(scaled(12.0, fs)),
        Space::new().height(8),
        button(text("Restore Defaults").size(scaled(13.0, fs)))
            .on_press(Message::RestoreDefaults)
            .padding([6, 14]),
        Space::new().height(20),
        appearance,
    ]
    .spacing(0)
    .into()
}
