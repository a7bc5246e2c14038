use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoomError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not resolve video {id}: {reason}")]
    ResolutionFailed { id: String, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("File system error at {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LoomError>;

impl LoomError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoomError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for an error that ends the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoomError::InvalidInput(_) => 2,
            LoomError::ResolutionFailed { .. } => 3,
            LoomError::Network(_) => 4,
            LoomError::Filesystem { .. } => 5,
            LoomError::Config(_) => 6,
        }
    }

    /// Short category label used in batch summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            LoomError::InvalidInput(_) => "invalid input",
            LoomError::ResolutionFailed { .. } => "resolution failed",
            LoomError::Network(_) => "network error",
            LoomError::Filesystem { .. } => "filesystem error",
            LoomError::Config(_) => "configuration error",
        }
    }
}

impl From<reqwest::Error> for LoomError {
    fn from(error: reqwest::Error) -> Self {
        LoomError::Network(error.to_string())
    }
}
