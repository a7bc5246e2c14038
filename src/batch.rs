use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::download::{DownloadHistory, DownloadManager, DownloadRequest};
use crate::error::{LoomError, Result};
use crate::resolver::VideoResolver;
use crate::share::ShareLink;

/// A non-blank line of a URL list and its 1-based position among such lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLine {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub prefix: String,
    pub output_dir: PathBuf,
    pub delay: Duration,
    pub skip_downloaded: bool,
}

#[derive(Debug)]
pub enum ItemOutcome {
    Downloaded { output_path: PathBuf, bytes: u64 },
    Skipped,
    Failed(LoomError),
}

#[derive(Debug)]
pub struct BatchItem {
    pub index: usize,
    pub source: String,
    pub outcome: ItemOutcome,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn downloaded(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Downloaded { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn total_bytes(&self) -> u64 {
        self.items
            .iter()
            .map(|item| match item.outcome {
                ItemOutcome::Downloaded { bytes, .. } => bytes,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.outcome)).count()
    }
}

/// Split list content into trimmed, non-blank lines, keeping file order.
pub fn parse_list(content: &str) -> Vec<BatchLine> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| BatchLine {
            index: i + 1,
            text: line.to_string(),
        })
        .collect()
}

pub async fn read_list(path: &Path) -> Result<Vec<BatchLine>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| LoomError::filesystem(path, e))?;
    Ok(parse_list(&content))
}

pub fn output_filename(prefix: &str, index: usize, id: &str) -> String {
    format!("{}-{}-{}.mp4", prefix, index, id)
}

/// Runs a list of share links through a [`DownloadManager`] one at a time.
pub struct BatchDriver<'a, R> {
    manager: &'a DownloadManager<R>,
    history: Option<DownloadHistory>,
    options: BatchOptions,
}

impl<'a, R: VideoResolver> BatchDriver<'a, R> {
    pub fn new(manager: &'a DownloadManager<R>, options: BatchOptions) -> Self {
        Self {
            manager,
            history: None,
            options,
        }
    }

    pub fn with_history(mut self, history: DownloadHistory) -> Self {
        self.history = Some(history);
        self
    }

    /// Process every line in order. Per-item failures are collected in the
    /// report; only an unusable output directory aborts the run.
    pub async fn run(&mut self, lines: &[BatchLine]) -> Result<BatchReport> {
        fs::create_dir_all(&self.options.output_dir)
            .await
            .map_err(|e| LoomError::filesystem(&self.options.output_dir, e))?;

        let mut report = BatchReport::default();
        let mut fetched_before = false;

        for line in lines {
            let outcome = match ShareLink::parse(&line.text) {
                Err(e) => {
                    warn!("Skipping line {}: {}", line.index, e);
                    ItemOutcome::Failed(e)
                }
                Ok(_) if self.already_downloaded(&line.text) => {
                    info!("Already downloaded, skipping {}", line.text);
                    ItemOutcome::Skipped
                }
                Ok(link) => {
                    if fetched_before && !self.options.delay.is_zero() {
                        info!(
                            "Waiting for {:.1} seconds before the next download...",
                            self.options.delay.as_secs_f64()
                        );
                        sleep(self.options.delay).await;
                    }
                    fetched_before = true;
                    self.process(line.index, link).await
                }
            };

            report.items.push(BatchItem {
                index: line.index,
                source: line.text.clone(),
                outcome,
            });
        }

        info!(
            "Batch finished: {} downloaded, {} skipped, {} failed",
            report.downloaded(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    fn already_downloaded(&self, url: &str) -> bool {
        self.options.skip_downloaded
            && self
                .history
                .as_ref()
                .is_some_and(|history| history.contains(url))
    }

    async fn process(&mut self, index: usize, link: ShareLink) -> ItemOutcome {
        let filename = output_filename(&self.options.prefix, index, &link.id);
        let request = DownloadRequest::new(link, self.options.output_dir.join(filename));

        match self.manager.download(&request).await {
            Ok(bytes) => {
                if let Some(history) = self.history.as_mut() {
                    if let Err(e) = history.record(request.source_url()).await {
                        warn!("Could not update download history: {}", e);
                    }
                }
                debug!("Item {} finished ({} bytes)", index, bytes);
                ItemOutcome::Downloaded {
                    output_path: request.output_path,
                    bytes,
                }
            }
            Err(e) => {
                warn!("Failed to download video {}: {}", request.link, e);
                ItemOutcome::Failed(e)
            }
        }
    }
}
