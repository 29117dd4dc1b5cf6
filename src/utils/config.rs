//! Application configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Address to bind the HTTP server to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Directory holding `index.html` and the assets under `/static`
    pub static_dir: PathBuf,

    /// Shared directory where yt-dlp writes its output
    pub downloads_dir: PathBuf,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Files older than this are removed by the janitor
    pub max_file_age_secs: u64,

    /// Upper bound for a single yt-dlp invocation
    pub engine_timeout_secs: u64,

    /// Maximum concurrent yt-dlp invocations
    pub max_concurrent: usize,

    /// Explicit yt-dlp binary, bypassing discovery
    pub ytdlp_path: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_dir: PathBuf::from("./static"),
            downloads_dir: PathBuf::from("./downloads"),
            cors_origins: vec!["*".to_string()],
            max_file_age_secs: 3600,
            engine_timeout_secs: 600,
            max_concurrent: 4,
            ytdlp_path: None,
        }
    }
}

impl AppSettings {
    /// Defaults overlaid with `MEDIAFETCH_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppSettings::from_env`] but reading from an arbitrary source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(host) = lookup("MEDIAFETCH_HOST") {
            settings.host = host;
        }
        if let Some(port) = parse_var(&lookup, "MEDIAFETCH_PORT") {
            settings.port = port;
        }
        if let Some(dir) = lookup("MEDIAFETCH_STATIC_DIR") {
            settings.static_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("MEDIAFETCH_DOWNLOADS_DIR") {
            settings.downloads_dir = PathBuf::from(dir);
        }
        if let Some(origins) = lookup("MEDIAFETCH_CORS_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
            if !origins.is_empty() {
                settings.cors_origins = origins;
            }
        }
        if let Some(age) = parse_var(&lookup, "MEDIAFETCH_MAX_FILE_AGE") {
            settings.max_file_age_secs = age;
        }
        if let Some(secs) = parse_var(&lookup, "MEDIAFETCH_ENGINE_TIMEOUT") {
            settings.engine_timeout_secs = secs;
        }
        if let Some(max) = parse_var(&lookup, "MEDIAFETCH_MAX_CONCURRENT") {
            settings.max_concurrent = max;
        }
        if let Some(path) = lookup("MEDIAFETCH_YTDLP") {
            settings.ytdlp_path = Some(PathBuf::from(path));
        }

        settings.sanitize();
        settings
    }

    /// Enforce sane minimums
    pub fn sanitize(&mut self) {
        if self.max_concurrent == 0 {
            self.max_concurrent = 1;
        }
        if self.engine_timeout_secs == 0 {
            self.engine_timeout_secs = 1;
        }
    }

    pub fn max_file_age(&self) -> Duration {
        Duration::from_secs(self.max_file_age_secs)
    }

    pub fn engine_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_timeout_secs)
    }

    /// True when the origin list allows everything
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable value {:?} for {}", raw, key);
            None
        }
    }
}
