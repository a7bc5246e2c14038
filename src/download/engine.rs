use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{DownloadProgress, DownloadRequest, VideoAsset};
use crate::config::ApiConfig;
use crate::error::{LoomError, Result};

const PROGRESS_UPDATE_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub struct DownloadTask<'a> {
    pub id: &'a str,
    pub asset: &'a VideoAsset,
    pub request: &'a DownloadRequest,
    pub progress_sender: &'a mpsc::UnboundedSender<DownloadProgress>,
}

/// Streams a resolved media URL to disk.
#[derive(Debug, Clone)]
pub struct DownloadEngine {
    client: Client,
}

impl DownloadEngine {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        // Media files can be large, so only connection setup is bounded
        let client = Client::builder()
            .connect_timeout(api.request_timeout())
            .user_agent(api.user_agent.as_str())
            .build()
            .map_err(|e| LoomError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch `task.asset` into `task.request.output_path`, returning the number
    /// of bytes written.
    ///
    /// The body is streamed into a sibling `.part` file that replaces the
    /// destination only once complete, so a failed fetch leaves any existing
    /// destination untouched.
    pub async fn fetch(&self, task: DownloadTask<'_>) -> Result<u64> {
        let start_time = Instant::now();
        let output_path = &task.request.output_path;
        let part_path = part_path(output_path);

        match self.fetch_attempt(&task, &part_path).await {
            Ok(bytes_downloaded) => {
                let _ = task.progress_sender.send(DownloadProgress::Completed {
                    id: task.id.to_string(),
                    bytes_downloaded,
                    output_path: output_path.clone(),
                    duration: start_time.elapsed(),
                });
                Ok(bytes_downloaded)
            }
            Err(e) => {
                if let Err(remove_err) = fs::remove_file(&part_path).await {
                    if remove_err.kind() != std::io::ErrorKind::NotFound {
                        warn!(
                            "Could not remove partial file {:?}: {}",
                            part_path, remove_err
                        );
                    }
                }
                let _ = task.progress_sender.send(DownloadProgress::Failed {
                    id: task.id.to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn fetch_attempt(&self, task: &DownloadTask<'_>, part_path: &Path) -> Result<u64> {
        let output_path = &task.request.output_path;

        debug!("GET {}", task.asset.direct_media_url);
        let response = self
            .client
            .get(&task.asset.direct_media_url)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::FORBIDDEN => {
                return Err(LoomError::Network(
                    "access denied (HTTP 403); the media link may have expired".to_string(),
                ));
            }
            status => {
                return Err(LoomError::Network(format!(
                    "media request failed with status: {}",
                    status
                )));
            }
        }

        let total_bytes = response.content_length();

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| LoomError::filesystem(parent, e))?;
            }
        }

        let mut file = File::create(part_path)
            .await
            .map_err(|e| LoomError::filesystem(part_path, e))?;

        let _ = task.progress_sender.send(DownloadProgress::Started {
            id: task.id.to_string(),
            output_path: output_path.clone(),
            total_bytes,
        });

        let mut downloaded = 0u64;
        let mut last_progress_update = Instant::now();
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result
                .map_err(|e| LoomError::Network(format!("connection dropped: {}", e)))?;

            file.write_all(&chunk)
                .await
                .map_err(|e| LoomError::filesystem(part_path, e))?;

            downloaded += chunk.len() as u64;

            if last_progress_update.elapsed() >= PROGRESS_UPDATE_INTERVAL {
                let _ = task.progress_sender.send(DownloadProgress::Progress {
                    id: task.id.to_string(),
                    bytes_downloaded: downloaded,
                });
                last_progress_update = Instant::now();
            }
        }

        file.flush()
            .await
            .map_err(|e| LoomError::filesystem(part_path, e))?;
        drop(file);

        fs::rename(part_path, output_path)
            .await
            .map_err(|e| LoomError::filesystem(output_path, e))?;
        debug!("Wrote {} bytes to {:?}", downloaded, output_path);

        Ok(downloaded)
    }
}

fn part_path(output_path: &Path) -> PathBuf {
    let mut name = output_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    output_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share::ShareLink;
    use tempfile::TempDir;

    fn request_for(path: std::path::PathBuf) -> DownloadRequest {
        let link = ShareLink::parse("https://www.loom.com/share/abc123").unwrap();
        DownloadRequest::new(link, path)
    }

    #[tokio::test]
    async fn test_fetch_writes_body_and_creates_parents() {
        let mut server = mockito::Server::new_async().await;
        let body = vec![7u8; 64 * 1024];
        let mock = server
            .mock("GET", "/media/abc123.mp4")
            .with_status(200)
            .with_body(body.clone())
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let request = request_for(temp_dir.path().join("nested/dir/out.mp4"));
        let asset = VideoAsset::new(format!("{}/media/abc123.mp4", server.url()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let engine = DownloadEngine::new(&ApiConfig::default()).unwrap();
        let written = engine
            .fetch(DownloadTask {
                id: "abc123",
                asset: &asset,
                request: &request,
                progress_sender: &tx,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&request.output_path).unwrap(), body);

        drop(tx);
        let mut saw_started = false;
        let mut saw_completed = false;
        while let Some(event) = rx.recv().await {
            match event {
                DownloadProgress::Started { total_bytes, .. } => {
                    saw_started = true;
                    assert_eq!(total_bytes, Some(body.len() as u64));
                }
                DownloadProgress::Completed {
                    bytes_downloaded, ..
                } => {
                    saw_completed = true;
                    assert_eq!(bytes_downloaded, body.len() as u64);
                }
                _ => {}
            }
        }
        assert!(saw_started && saw_completed);
    }

    #[tokio::test]
    async fn test_fetch_overwrites_existing_file() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/media/new.mp4")
            .with_body("new")
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.mp4");
        std::fs::write(&path, "old contents that are longer").unwrap();

        let request = request_for(path.clone());
        let asset = VideoAsset::new(format!("{}/media/new.mp4", server.url()));
        let (tx, _rx) = mpsc::unbounded_channel();

        let engine = DownloadEngine::new(&ApiConfig::default()).unwrap();
        engine
            .fetch(DownloadTask {
                id: "abc123",
                asset: &asset,
                request: &request,
                progress_sender: &tx,
            })
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_fetch_forbidden_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/media/expired.mp4")
            .with_status(403)
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let request = request_for(temp_dir.path().join("out.mp4"));
        let asset = VideoAsset::new(format!("{}/media/expired.mp4", server.url()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let engine = DownloadEngine::new(&ApiConfig::default()).unwrap();
        let err = engine
            .fetch(DownloadTask {
                id: "abc123",
                asset: &asset,
                request: &request,
                progress_sender: &tx,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, LoomError::Network(ref msg) if msg.contains("403")));
        assert!(!request.output_path.exists());

        drop(tx);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert!(matches!(events.last(), Some(DownloadProgress::Failed { .. })));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_existing_destination() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/media/expired.mp4")
            .with_status(403)
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("talk.mp4");
        std::fs::write(&path, "earlier recording").unwrap();

        let request = request_for(path.clone());
        let asset = VideoAsset::new(format!("{}/media/expired.mp4", server.url()));
        let (tx, _rx) = mpsc::unbounded_channel();

        let engine = DownloadEngine::new(&ApiConfig::default()).unwrap();
        let result = engine
            .fetch(DownloadTask {
                id: "abc123",
                asset: &asset,
                request: &request,
                progress_sender: &tx,
            })
            .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "earlier recording");
        assert!(!part_path(&path).exists());
    }

    #[tokio::test]
    async fn test_successful_fetch_leaves_no_part_file() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/media/ok.mp4")
            .with_body("fresh")
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("talk.mp4");
        let request = request_for(path.clone());
        let asset = VideoAsset::new(format!("{}/media/ok.mp4", server.url()));
        let (tx, _rx) = mpsc::unbounded_channel();

        let engine = DownloadEngine::new(&ApiConfig::default()).unwrap();
        engine
            .fetch(DownloadTask {
                id: "abc123",
                asset: &asset,
                request: &request,
                progress_sender: &tx,
            })
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh");
        let names: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("talk.mp4")]);
    }

    #[test]
    fn test_part_path_is_a_sibling() {
        assert_eq!(
            part_path(Path::new("/videos/talk.mp4")),
            PathBuf::from("/videos/talk.mp4.part")
        );
    }

    #[tokio::test]
    async fn test_fetch_into_unwritable_destination() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/media/ok.mp4")
            .with_body("data")
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        // A regular file where a parent directory is expected
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let request = request_for(blocker.join("out.mp4"));
        let asset = VideoAsset::new(format!("{}/media/ok.mp4", server.url()));
        let (tx, _rx) = mpsc::unbounded_channel();

        let engine = DownloadEngine::new(&ApiConfig::default()).unwrap();
        let err = engine
            .fetch(DownloadTask {
                id: "abc123",
                asset: &asset,
                request: &request,
                progress_sender: &tx,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, LoomError::Filesystem { .. }));
    }
}
