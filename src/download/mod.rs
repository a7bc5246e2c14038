pub mod engine;
pub mod history;
pub mod manager;
pub mod progress;

pub use engine::{DownloadEngine, DownloadTask};
pub use history::DownloadHistory;
pub use manager::DownloadManager;
pub use progress::{DownloadProgress, ProgressTracker};

use std::path::PathBuf;

use crate::share::ShareLink;

/// One video to fetch and the file it should land in.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub link: ShareLink,
    pub output_path: PathBuf,
}

impl DownloadRequest {
    pub fn new(link: ShareLink, output_path: PathBuf) -> Self {
        Self { link, output_path }
    }

    pub fn source_url(&self) -> &str {
        &self.link.url
    }
}

/// A direct, time-limited media location obtained from resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoAsset {
    pub direct_media_url: String,
}

impl VideoAsset {
    pub fn new(direct_media_url: String) -> Self {
        Self { direct_media_url }
    }
}
