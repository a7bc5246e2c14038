pub mod batch;
pub mod config;
pub mod download;
pub mod error;
pub mod resolver;
pub mod share;

// Re-export commonly used types for easier access in tests
pub use batch::{BatchDriver, BatchLine, BatchOptions, BatchReport, ItemOutcome};
pub use config::{Config, ConfigManager};
pub use download::{
    DownloadEngine, DownloadHistory, DownloadManager, DownloadProgress, DownloadRequest,
    VideoAsset,
};
pub use error::LoomError;
pub use resolver::{LoomResolver, VideoResolver};
pub use share::ShareLink;
