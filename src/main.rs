//! mediafetch - media download service
//!
//! Serves a small web page and two JSON endpoints that probe and download
//! media through yt-dlp, streaming the result back and deleting it.

use anyhow::Result;
use clap::Parser;
use mediafetch::downloader::clean_old_files;
use mediafetch::extractor::YtDlpExtractor;
use mediafetch::server::{self, AppContext};
use mediafetch::utils::{paths, AppSettings, DownloadsDir};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory with index.html and static assets
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Directory yt-dlp writes into (purged at startup)
    #[arg(long)]
    downloads_dir: Option<PathBuf>,

    /// Path to the yt-dlp binary
    #[arg(long)]
    ytdlp: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(self, settings: &mut AppSettings) {
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(dir) = self.static_dir {
            settings.static_dir = dir;
        }
        if let Some(dir) = self.downloads_dir {
            settings.downloads_dir = dir;
        }
        if let Some(path) = self.ytdlp {
            settings.ytdlp_path = Some(path);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from --verbose
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if args.verbose {
            "mediafetch=debug,tower_http=debug".to_string()
        } else {
            "mediafetch=info,tower_http=info".to_string()
        }
    });
    tracing_subscriber::fmt().with_env_filter(&env_filter).init();

    let mut settings = AppSettings::from_env();
    args.apply(&mut settings);
    settings.static_dir = paths::absolute(&settings.static_dir)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(settings))
}

async fn run(settings: AppSettings) -> Result<()> {
    let downloads = DownloadsDir::prepare(&settings.downloads_dir)?;

    info!("Application starting: Cleaning downloads...");
    let purged = clean_old_files(downloads.path(), Duration::ZERO);
    info!("Removed {} leftover file(s) from {}", purged, downloads.path().display());

    let extractor = match YtDlpExtractor::new(downloads.clone(), settings.ytdlp_path.as_deref()) {
        Ok(extractor) => extractor,
        Err(e) => {
            // Keep serving; every engine call will fail with a generic message.
            warn!("{}. Install it with `pip install yt-dlp`.", e);
            YtDlpExtractor::with_binary(PathBuf::from("yt-dlp"), downloads.clone())
        }
    };

    let ctx = AppContext::new(settings, Arc::new(extractor), downloads);
    server::start_server(ctx).await
}
