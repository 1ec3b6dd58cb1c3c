use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

use crate::settings::Appearance;

pub fn resolve_theme(appearance: Appearance, high_contrast: bool) -> Theme {
    let dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => system_prefers_dark(),
    };
    Theme::custom("FaceCam", palette(dark, high_contrast))
}

fn palette(dark: bool, high_contrast: bool) -> Palette {
    match (dark, high_contrast) {
        (true, false) => Palette {
            background: color!(0x18, 0x19, 0x1b),
            text: color!(0xd8, 0xd8, 0xd8),
            primary: color!(0x4f, 0x9d, 0xe8),
            success: color!(0x3c, 0xc8, 0x6b),
            warning: color!(0xf2, 0xc1, 0x1d),
            danger: color!(0xf0, 0x4a, 0x3e),
        },
        (false, false) => Palette {
            background: color!(0xf4, 0xf4, 0xf6),
            text: color!(0x1c, 0x1c, 0x1e),
            primary: color!(0x2a, 0x6f, 0xd6),
            success: color!(0x2d, 0xa4, 0x4e),
            warning: color!(0xe0, 0x8a, 0x00),
            danger: color!(0xe0, 0x2f, 0x25),
        },
        (true, true) => Palette {
            background: color!(0x00, 0x00, 0x00),
            text: color!(0xff, 0xff, 0xff),
            primary: color!(0x72, 0xb8, 0xff),
            success: color!(0x4c, 0xe0, 0x7a),
            warning: color!(0xff, 0xd6, 0x0a),
            danger: color!(0xff, 0x5a, 0x4f),
        },
        (false, true) => Palette {
            background: color!(0xff, 0xff, 0xff),
            text: color!(0x00, 0x00, 0x00),
            primary: color!(0x00, 0x4c, 0xc4),
            success: color!(0x1f, 0x7a, 0x36),
            warning: color!(0xa8, 0x55, 0x00),
            danger: color!(0xc4, 0x00, 0x12),
        },
    }
}

/// Colour of the status line: danger while recording, plain text otherwise.
pub fn status_color(theme: &Theme, recording: bool) -> Color {
    let palette = theme.palette();
    if recording {
        palette.danger
    } else {
        palette.text
    }
}

fn system_prefers_dark() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .trim()
                    .eq_ignore_ascii_case("dark")
            })
            .unwrap_or(true)
    }
    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}
