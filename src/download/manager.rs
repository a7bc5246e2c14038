use tokio::sync::mpsc;
use tracing::info;

use super::{DownloadEngine, DownloadProgress, DownloadRequest, DownloadTask};
use crate::error::Result;
use crate::resolver::VideoResolver;

/// Resolves and fetches one video at a time, reporting progress on a channel.
pub struct DownloadManager<R> {
    resolver: R,
    engine: DownloadEngine,
    progress_sender: mpsc::UnboundedSender<DownloadProgress>,
}

impl<R: VideoResolver> DownloadManager<R> {
    pub fn new(
        resolver: R,
        engine: DownloadEngine,
    ) -> (Self, mpsc::UnboundedReceiver<DownloadProgress>) {
        let (progress_sender, progress_receiver) = mpsc::unbounded_channel();

        (
            Self {
                resolver,
                engine,
                progress_sender,
            },
            progress_receiver,
        )
    }

    /// Resolve `request.link` and stream it to `request.output_path`.
    pub async fn download(&self, request: &DownloadRequest) -> Result<u64> {
        let id = request.link.id.as_str();

        info!("Resolving video {}", id);
        let asset = match self.resolver.resolve(&request.link).await {
            Ok(asset) => asset,
            Err(e) => {
                let _ = self.progress_sender.send(DownloadProgress::Failed {
                    id: id.to_string(),
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        info!(
            "Downloading video {} and saving to {:?}",
            id, request.output_path
        );
        self.engine
            .fetch(DownloadTask {
                id,
                asset: &asset,
                request,
                progress_sender: &self.progress_sender,
            })
            .await
    }
}
