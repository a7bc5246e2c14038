use std::collections::HashSet;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{LoomError, Result};

/// Append-only record of share URLs that were downloaded successfully.
///
/// Lookups see the file as it was when loaded; URLs recorded during the run
/// are written out but do not cause later duplicates in the same list to be
/// skipped.
#[derive(Debug)]
pub struct DownloadHistory {
    path: PathBuf,
    entries: HashSet<String>,
    recorded: HashSet<String>,
}

impl DownloadHistory {
    /// Read the history at `path`. A missing file is an empty history.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path).await {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(LoomError::filesystem(&path, e)),
        };

        debug!("Loaded {} history entries from {:?}", entries.len(), path);
        Ok(Self {
            path,
            entries,
            recorded: HashSet::new(),
        })
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains(url.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub async fn record(&mut self, url: &str) -> Result<()> {
        let url = url.trim();
        if self.entries.contains(url) || self.recorded.contains(url) {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| LoomError::filesystem(parent, e))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| LoomError::filesystem(&self.path, e))?;
        file.write_all(format!("{}\n", url).as_bytes())
            .await
            .map_err(|e| LoomError::filesystem(&self.path, e))?;
        file.flush()
            .await
            .map_err(|e| LoomError::filesystem(&self.path, e))?;

        self.recorded.insert(url.to_string());
        Ok(())
    }
}
