use anyhow::Result;
use console::{Term, style};
use loom_dl::{ConfigManager, DownloadRequest, ShareLink};
use std::path::{Path, PathBuf};

use super::{build_manager, progress};

pub async fn handle_single(config_manager: &ConfigManager, url: &str, out: &Path) -> Result<()> {
    let term = Term::stdout();

    let link = ShareLink::parse(url)?;
    let output_path = single_output_path(out, &link);

    term.write_line(&format!(
        "{} Downloading video {} and saving to {}",
        style("⬇️").cyan(),
        style(&link.id).cyan().bold(),
        style(output_path.display()).cyan()
    ))?;

    let (manager, receiver) = build_manager(config_manager)?;
    let renderer = progress::spawn_renderer(receiver);

    let request = DownloadRequest::new(link, output_path);
    let result = manager.download(&request).await;

    // Closing the channel lets the renderer drain and exit
    drop(manager);
    let _ = renderer.await;

    result?;
    Ok(())
}

/// An existing directory as `--out` receives `<id>.mp4`.
fn single_output_path(out: &Path, link: &ShareLink) -> PathBuf {
    if out.is_dir() {
        out.join(format!("{}.mp4", link.id))
    } else {
        out.to_path_buf()
    }
}
