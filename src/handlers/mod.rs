pub mod batch;
pub mod progress;
pub mod single;

use anyhow::Result;
use loom_dl::{ConfigManager, DownloadEngine, DownloadManager, DownloadProgress, LoomResolver};
use tokio::sync::mpsc;

pub use batch::handle_batch;
pub use single::handle_single;

/// Build the resolve-and-fetch pipeline from the configured API settings.
pub fn build_manager(
    config_manager: &ConfigManager,
) -> Result<(
    DownloadManager<LoomResolver>,
    mpsc::UnboundedReceiver<DownloadProgress>,
)> {
    let api = &config_manager.config().api;
    let resolver = LoomResolver::new(api)?;
    let engine = DownloadEngine::new(api)?;
    Ok(DownloadManager::new(resolver, engine))
}
