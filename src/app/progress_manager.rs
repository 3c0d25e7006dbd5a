//! Progress UI (spinner) for archive runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use archiver_core::ProgressSnapshot;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tracing::debug;

/// Spawns the progress UI (spinner) when requested.
/// Returns (handle, stop) so the caller can signal stop and await the handle.
/// When `use_spinner` is false, returns (None, stop) with stop already true.
pub(crate) fn spawn_progress_ui(
    use_spinner: bool,
    progress: watch::Receiver<ProgressSnapshot>,
) -> (Option<tokio::task::JoinHandle<()>>, Arc<AtomicBool>) {
    if !use_spinner {
        return (None, Arc::new(AtomicBool::new(true)));
    }
    let stop = Arc::new(AtomicBool::new(false));
    let handle = spawn_spinner_inner(progress, Arc::clone(&stop));
    (Some(handle), stop)
}

/// Signals the UI to stop and waits for it; returns false if the task panicked
/// or was cancelled.
pub(crate) async fn stop_progress_ui(
    handle: Option<tokio::task::JoinHandle<()>>,
    stop: &AtomicBool,
) -> bool {
    stop.store(true, Ordering::SeqCst);
    let Some(handle) = handle else {
        return true;
    };
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "progress UI task ended abnormally");
            false
        }
    }
}

fn spawn_spinner_inner(
    progress: watch::Receiver<ProgressSnapshot>,
    stop: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));

        while !stop.load(Ordering::SeqCst) {
            let message = spinner_message(&progress.borrow());
            spinner.set_message(message);
            tokio::time::sleep(Duration::from_millis(120)).await;
        }

        spinner.finish_and_clear();
    })
}

pub(crate) fn spinner_message(snapshot: &ProgressSnapshot) -> String {
    let target = snapshot
        .target
        .map_or_else(|| "all".to_string(), |t| t.to_string());
    let source = if snapshot.source.is_empty() {
        "-"
    } else {
        snapshot.source.as_str()
    };
    let counters = &snapshot.counters;
    format!(
        "[{}/{}] {} {} | {}/{} posts (self {}, media {}, link {}, failed {}, skipped {})",
        (snapshot.source_index + 1).min(snapshot.source_count.max(1)),
        snapshot.source_count,
        source,
        snapshot.state,
        counters.total(),
        target,
        counters.self_posts,
        counters.media,
        counters.link,
        counters.failed,
        counters.skipped_duplicate + counters.skipped_filtered
    )
}
