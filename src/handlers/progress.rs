use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};
use loom_dl::DownloadProgress;
use loom_dl::download::ProgressTracker;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Draw progress bars for download events until every sender is dropped.
pub fn spawn_renderer(mut receiver: mpsc::UnboundedReceiver<DownloadProgress>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let term = Term::stdout();
        let mut bar: Option<ProgressBar> = None;

        while let Some(event) = receiver.recv().await {
            match event {
                DownloadProgress::Started {
                    id,
                    output_path,
                    total_bytes,
                } => {
                    let pb = new_bar(total_bytes);
                    let name = output_path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or(id);
                    pb.set_message(name);
                    bar = Some(pb);
                }
                DownloadProgress::Progress {
                    bytes_downloaded, ..
                } => {
                    if let Some(pb) = &bar {
                        pb.set_position(bytes_downloaded);
                    }
                }
                DownloadProgress::Completed {
                    id,
                    bytes_downloaded,
                    output_path,
                    duration,
                } => {
                    if let Some(pb) = bar.take() {
                        pb.finish_and_clear();
                    }
                    let _ = term.write_line(&format!(
                        "{} {} saved to {} ({} in {})",
                        style("✅").green(),
                        style(&id).cyan(),
                        style(output_path.display()).cyan(),
                        ProgressTracker::format_bytes(bytes_downloaded),
                        ProgressTracker::format_duration(duration)
                    ));
                }
                DownloadProgress::Failed { id, error } => {
                    if let Some(pb) = bar.take() {
                        pb.abandon();
                    }
                    let _ = term.write_line(&format!(
                        "{} Failed to download video {}: {}",
                        style("❌").red(),
                        style(&id).cyan(),
                        error
                    ));
                }
            }
        }
    })
}

fn new_bar(total_bytes: Option<u64>) -> ProgressBar {
    match total_bytes {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} {msg} [{elapsed_precise}] [{bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.blue} {msg} {bytes} ({bytes_per_sec})")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        }
    }
}
