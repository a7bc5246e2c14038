use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "loom-dl")]
#[command(about = "Download Loom videos from share links")]
#[command(long_about = "
loom-dl resolves Loom share links to their media files and saves them locally.
A single link is written to the --out path; a list of links is downloaded one
after another into the --out directory, waiting --timeout milliseconds between
downloads.

Examples:
  loom-dl --url https://www.loom.com/share/<ID> --out demo.mp4
  loom-dl --list links.txt --prefix lesson --out videos/ --timeout 3000
")]
#[command(version)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["url", "list"])
))]
pub struct Cli {
    /// URL of the video in the format https://www.loom.com/share/[ID]
    #[arg(short, long, value_name = "URL")]
    pub url: Option<String>,

    /// Text file containing one share URL per line
    #[arg(short, long, value_name = "FILE", requires = "prefix")]
    pub list: Option<PathBuf>,

    /// Prefix for the output filenames when downloading from a list
    #[arg(short, long, value_name = "PREFIX", requires = "list")]
    pub prefix: Option<String>,

    /// Output file (single URL) or directory (with --list)
    #[arg(short, long, value_name = "PATH")]
    pub out: PathBuf,

    /// Milliseconds to wait between downloads when using --list [default: 5000]
    #[arg(short, long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Download list entries even if they are recorded as already downloaded
    #[arg(short, long)]
    pub force: bool,

    /// Override config file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// What a validated command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Single {
        url: String,
        out: PathBuf,
    },
    Batch {
        list: PathBuf,
        prefix: String,
        out: PathBuf,
    },
}

impl Cli {
    /// Validate CLI arguments and show helpful error messages
    pub fn validate(&self) -> Result<RunMode, String> {
        if self.out.as_os_str().is_empty() {
            return Err("Output path cannot be empty".to_string());
        }

        match (&self.url, &self.list) {
            (Some(url), None) => {
                if url.trim().is_empty() {
                    return Err("URL cannot be empty".to_string());
                }
                Ok(RunMode::Single {
                    url: url.trim().to_string(),
                    out: self.out.clone(),
                })
            }
            (None, Some(list)) => {
                let prefix = self
                    .prefix
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| "Please provide a non-empty --prefix with --list".to_string())?;

                if prefix.contains(['/', '\\']) {
                    return Err("Prefix cannot contain path separators".to_string());
                }

                if self.out.exists() && !self.out.is_dir() {
                    return Err(format!(
                        "--out must be a directory when using --list: {:?} is a file",
                        self.out
                    ));
                }

                Ok(RunMode::Batch {
                    list: list.clone(),
                    prefix: prefix.to_string(),
                    out: self.out.clone(),
                })
            }
            (Some(_), Some(_)) => Err("Please provide either --url or --list, not both".to_string()),
            (None, None) => Err(
                "Please provide either a single video URL with --url or a list of URLs with --list"
                    .to_string(),
            ),
        }
    }
}
