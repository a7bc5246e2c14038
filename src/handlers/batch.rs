use anyhow::Result;
use console::{Term, style};
use loom_dl::batch::{self, BatchDriver, BatchOptions, BatchReport, ItemOutcome};
use loom_dl::download::ProgressTracker;
use loom_dl::{ConfigManager, DownloadHistory};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use super::{build_manager, progress};

pub async fn handle_batch(
    config_manager: &ConfigManager,
    list: &Path,
    prefix: &str,
    out: &Path,
    timeout_ms: Option<u64>,
    force: bool,
) -> Result<BatchReport> {
    let term = Term::stdout();

    let lines = batch::read_list(list).await?;
    let delay = Duration::from_millis(
        timeout_ms.unwrap_or(config_manager.config().general.delay_ms),
    );

    term.write_line(&format!(
        "{} {} links from {} into {}",
        style("📋").cyan(),
        style(lines.len()).bold(),
        style(list.display()).cyan(),
        style(out.display()).cyan()
    ))?;

    let history = match config_manager.history_file() {
        Some(path) => match DownloadHistory::load(path).await {
            Ok(history) => {
                if !history.is_empty() {
                    info!("{} links already downloaded", history.len());
                }
                Some(history)
            }
            Err(e) => {
                warn!("Download history unavailable: {}", e);
                None
            }
        },
        None => None,
    };

    let (manager, receiver) = build_manager(config_manager)?;
    let renderer = progress::spawn_renderer(receiver);

    let options = BatchOptions {
        prefix: prefix.to_string(),
        output_dir: out.to_path_buf(),
        delay,
        skip_downloaded: !force,
    };
    let mut driver = BatchDriver::new(&manager, options);
    if let Some(history) = history {
        driver = driver.with_history(history);
    }

    let result = driver.run(&lines).await;

    drop(driver);
    drop(manager);
    let _ = renderer.await;

    let report = result?;
    print_summary(&term, &report)?;
    Ok(report)
}

fn print_summary(term: &Term, report: &BatchReport) -> Result<()> {
    term.write_line("")?;
    term.write_line(&format!(
        "{} {} downloaded ({}), {} skipped, {} failed",
        style("📊").cyan(),
        style(report.downloaded()).green(),
        ProgressTracker::format_bytes(report.total_bytes()),
        style(report.skipped()).yellow(),
        if report.has_failures() {
            style(report.failed()).red()
        } else {
            style(report.failed()).dim()
        }
    ))?;

    for item in &report.items {
        if let ItemOutcome::Failed(e) = &item.outcome {
            term.write_line(&format!(
                "   {} line {}: {} ({})",
                style("•").red(),
                item.index,
                item.source,
                style(e.kind()).dim()
            ))?;
        }
    }

    Ok(())
}
