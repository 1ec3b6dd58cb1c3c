use std::thread;

use crossbeam_channel::{Receiver, Sender};

use facecam_core::detection::infrastructure::model_resolver::ProgressFn;
use facecam_core::session::bootstrap::{build_live_view, LiveViewConfig};
use facecam_core::session::live_view::LiveView;

/// Messages sent from the startup thread to the UI.
pub enum StartupMessage {
    DownloadProgress(u64, u64),
    Ready(Box<LiveView>),
    Failed(String),
}

/// Builds the live view off the UI thread, since it may download the face
/// model and opening the camera can block.
pub fn spawn(config: LiveViewConfig) -> Receiver<StartupMessage> {
    let (tx, rx) = crossbeam_channel::unbounded::<StartupMessage>();
    let failure_tx = tx.clone();

    let spawned = thread::Builder::new()
        .name("startup".to_string())
        .spawn(move || run(&config, &tx));
    if let Err(e) = spawned {
        log::error!("Failed to spawn startup thread: {e}");
        let _ = failure_tx.send(StartupMessage::Failed(format!(
            "could not start the camera thread: {e}"
        )));
    }

    rx
}

fn run(config: &LiveViewConfig, tx: &Sender<StartupMessage>) {
    let progress_tx = tx.clone();
    let progress: ProgressFn = Box::new(move |downloaded, total| {
        let _ = progress_tx.send(StartupMessage::DownloadProgress(downloaded, total));
    });

    let message = match build_live_view(config, Some(progress)) {
        Ok(view) => StartupMessage::Ready(Box::new(view)),
        Err(e) => {
            log::error!("Startup failed: {e}");
            StartupMessage::Failed(e.to_string())
        }
    };
    let _ = tx.send(message);
}
