pub mod live_tab;
pub mod settings_tab;
