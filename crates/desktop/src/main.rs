mod app;
mod settings;
mod tabs;
mod theme;
mod workers;

use app::App;

fn main() -> iced::Result {
    env_logger::init();

    iced::application(App::new, App::update, App::view)
        .title("FaceCam")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(iced::window::Settings {
            size: iced::Size::new(900.0, 720.0),
            min_size: Some(iced::Size::new(480.0, 400.0)),
            exit_on_close_request: false,
            ..Default::default()
        })
        .run()
}
