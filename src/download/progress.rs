use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum DownloadProgress {
    Started {
        id: String,
        output_path: PathBuf,
        total_bytes: Option<u64>,
    },
    Progress {
        id: String,
        bytes_downloaded: u64,
    },
    Completed {
        id: String,
        bytes_downloaded: u64,
        output_path: PathBuf,
        duration: Duration,
    },
    Failed {
        id: String,
        error: String,
    },
}

pub struct ProgressTracker;

impl ProgressTracker {
    pub fn format_bytes(bytes: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = bytes as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.1} {}", size, UNITS[unit_index])
        }
    }

    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else if total_seconds > 0 {
            format!("{}s", seconds)
        } else {
            format!("{}ms", duration.as_millis())
        }
    }
}
