pub mod bootstrap;
pub mod live_view;
pub mod output_dirs;
pub mod recorder;
pub mod snapshot;
