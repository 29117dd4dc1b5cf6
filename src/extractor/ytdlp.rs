//! yt-dlp wrapper for media extraction
//!
//! Metadata is read from `--dump-single-json`; downloads run with
//! `--no-simulate` so the same JSON document also reports the prepared
//! output filename, which is then reconciled with what post-processing
//! actually left on disk.

use crate::extractor::models::{DownloadResult, EngineInfo, MediaInfo};
use crate::extractor::options::DownloadOptions;
use crate::extractor::traits::Extractor;
use crate::utils::error::{MediaError, MediaResult};
use crate::utils::paths::DownloadsDir;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error, info, warn};

/// Media extractor backed by the yt-dlp binary
pub struct YtDlpExtractor {
    ytdlp_path: PathBuf,
    downloads: DownloadsDir,
}

impl YtDlpExtractor {
    /// Initialize extractor and verify yt-dlp availability
    ///
    /// Search order:
    /// 1. Explicitly configured path
    /// 2. Next to the running executable
    /// 3. System PATH
    /// 4. Common installation paths
    pub fn new(downloads: DownloadsDir, configured: Option<&Path>) -> MediaResult<Self> {
        let ytdlp_path = match find_ytdlp(configured) {
            Some(path) => {
                info!("Found yt-dlp at: {}", path.display());
                path
            }
            None => {
                error!("yt-dlp not found anywhere!");
                return Err(MediaError::YtDlpNotFound);
            }
        };

        Ok(Self::with_binary(ytdlp_path, downloads))
    }

    /// Use a known binary without discovery
    pub fn with_binary(ytdlp_path: PathBuf, downloads: DownloadsDir) -> Self {
        Self {
            ytdlp_path,
            downloads,
        }
    }

    /// Get the path to yt-dlp being used
    pub fn ytdlp_path(&self) -> &Path {
        &self.ytdlp_path
    }

    pub fn downloads(&self) -> &DownloadsDir {
        &self.downloads
    }

    /// Arguments for a metadata-only query
    pub fn probe_args(url: &str) -> Vec<String> {
        let mut args: Vec<String> = [
            "--dump-single-json",
            "--no-download",
            "--no-playlist",
            "--no-warnings",
            "--quiet",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Arguments for a full fetch into the downloads directory
    pub fn fetch_args(&self, url: &str, options: &DownloadOptions, request_id: &str) -> Vec<String> {
        let mut args: Vec<String> = [
            "--dump-single-json",
            "--no-simulate",
            "--no-playlist",
            "--no-warnings",
            "--quiet",
            "--no-progress",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        args.push("-o".to_string());
        args.push(self.output_template(request_id));
        args.extend(options.engine_args());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// `<downloads>/<request_id>_%(title)s [%(id)s].%(ext)s`
    pub fn output_template(&self, request_id: &str) -> String {
        let prefix = if request_id.is_empty() {
            String::new()
        } else {
            format!("{}_", request_id)
        };
        self.downloads
            .join(&format!("{}%(title)s [%(id)s].%(ext)s", prefix))
            .to_string_lossy()
            .to_string()
    }

    /// Run yt-dlp and parse its JSON document
    ///
    /// The child is killed if this future is dropped, so a timeout around
    /// the call also stops the subprocess.
    async fn run_json(&self, args: &[String]) -> MediaResult<EngineInfo> {
        debug!("Running {} {:?}", self.ytdlp_path.display(), args);

        let output = AsyncCommand::new(&self.ytdlp_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("yt-dlp failed ({}): {}", output.status, error_msg);
            let error_msg = if error_msg.is_empty() {
                format!("yt-dlp exited with {}", output.status)
            } else {
                error_msg
            };
            return Err(MediaError::Engine(error_msg));
        }

        let info: EngineInfo = serde_json::from_slice(&output.stdout)?;
        Ok(info)
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn id(&self) -> &'static str {
        "ytdlp"
    }

    async fn probe(&self, url: &str) -> MediaResult<MediaInfo> {
        debug!("Probing media info for URL: {}", url);

        let info = self.run_json(&Self::probe_args(url)).await?;
        if info.is_playlist() {
            return Err(MediaError::Engine(format!(
                "{} is a playlist, not a single video",
                url
            )));
        }

        Ok(MediaInfo::from_engine(&info, url))
    }

    async fn fetch(
        &self,
        url: &str,
        options: &DownloadOptions,
        request_id: &str,
    ) -> MediaResult<DownloadResult> {
        info!("[{}] Fetching {} as {}", request_id, url, options);

        let info = self
            .run_json(&self.fetch_args(url, options, request_id))
            .await?;
        if info.is_playlist() {
            return Err(MediaError::Engine(format!(
                "{} is a playlist, not a single video",
                url
            )));
        }

        let reported = info.reported_filename().ok_or_else(|| {
            MediaError::FileMissing("yt-dlp did not report an output filename".to_string())
        })?;
        let path = resolve_output_path(Path::new(reported), options.target_extension());
        debug!("[{}] Output resolved to {}", request_id, path.display());

        Ok(DownloadResult {
            path,
            title: info.display_title(),
        })
    }
}

/// Pick the post-processed file if it exists, else what yt-dlp reported.
///
/// Merging and audio extraction change the extension after yt-dlp has
/// computed its filename.
pub fn resolve_output_path(reported: &Path, target_extension: &str) -> PathBuf {
    let expected = reported.with_extension(target_extension);
    if expected.exists() {
        expected
    } else {
        if expected != reported {
            warn!(
                "Expected output {} missing, using reported {}",
                expected.display(),
                reported.display()
            );
        }
        reported.to_path_buf()
    }
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. Configured path
/// 2. Next to the executable
/// 3. System PATH
/// 4. Common installation paths
pub fn find_ytdlp(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if is_executable(path) {
            info!("✓ Using configured yt-dlp: {:?}", path);
            return Some(path.to_path_buf());
        }
        warn!("Configured yt-dlp is not executable: {:?}", path);
    }

    if let Some(local) = find_next_to_exe() {
        info!("✓ Using bundled yt-dlp: {:?}", local);
        return Some(local);
    }

    if let Some(system) = find_in_path() {
        info!("✓ Using system yt-dlp: {:?}", system);
        return Some(system);
    }

    if let Some(common) = find_in_common_paths() {
        info!("✓ Using yt-dlp from common path: {:?}", common);
        return Some(common);
    }

    warn!("✗ yt-dlp not found anywhere!");
    None
}

/// yt-dlp shipped alongside the server binary (containers, dev builds)
fn find_next_to_exe() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let exe_dir = exe_path.parent()?;
    let candidate = exe_dir.join("yt-dlp");
    if is_executable(&candidate) {
        return Some(candidate);
    }
    None
}

/// Find yt-dlp in system PATH using `which`
fn find_in_path() -> Option<PathBuf> {
    which::which("yt-dlp").ok().filter(|p| p.exists())
}

/// Find yt-dlp in common installation paths
fn find_in_common_paths() -> Option<PathBuf> {
    let common_paths = [
        "/usr/local/bin/yt-dlp",
        "/usr/bin/yt-dlp",
        "/opt/homebrew/bin/yt-dlp",
        "~/.local/bin/yt-dlp",
    ];

    for path_str in common_paths {
        let expanded = match path_str.strip_prefix("~/") {
            Some(rest) => match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            },
            None => PathBuf::from(path_str),
        };

        if is_executable(&expanded) {
            return Some(expanded);
        }
    }

    None
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        match std::fs::metadata(path) {
            Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::options::{AudioCodec, MediaType};
    use tempfile::TempDir;

    fn extractor_in(dir: &Path) -> YtDlpExtractor {
        YtDlpExtractor::with_binary(PathBuf::from("yt-dlp"), DownloadsDir::new(dir))
    }

    #[test]
    fn test_configured_path_must_be_executable() {
        let temp = TempDir::new().unwrap();
        let fake = temp.path().join("yt-dlp");
        std::fs::write(&fake, b"#!/bin/sh\n").unwrap();
        // Not executable: discovery moves on instead of returning it.
        assert_ne!(find_ytdlp(Some(&fake)), Some(fake));
    }

    #[test]
    fn test_is_executable() {
        let path = PathBuf::from("/bin/sh");
        if path.exists() {
            assert!(is_executable(&path));
        }
        assert!(!is_executable(Path::new("/definitely/not/here")));
    }

    #[test]
    fn test_output_template_prefix() {
        let extractor = extractor_in(Path::new("/srv/downloads"));
        assert_eq!(
            extractor.output_template("ab12cd34"),
            "/srv/downloads/ab12cd34_%(title)s [%(id)s].%(ext)s"
        );
        assert_eq!(
            extractor.output_template(""),
            "/srv/downloads/%(title)s [%(id)s].%(ext)s"
        );
    }

    #[test]
    fn test_fetch_args_end_with_url() {
        let extractor = extractor_in(Path::new("/srv/downloads"));
        let options = DownloadOptions {
            media_type: MediaType::Audio,
            audio_codec: AudioCodec::M4a,
            ..Default::default()
        };
        let args = extractor.fetch_args("https://www.youtube.com/watch?v=abc", &options, "id1");

        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=abc");
        assert_eq!(args[args.len() - 2], "--");
        assert!(args.contains(&"--no-simulate".to_string()));
        assert!(args.windows(2).any(|w| w == ["--audio-format", "m4a"]));
    }

    #[test]
    fn test_probe_args_do_not_download() {
        let args = YtDlpExtractor::probe_args("https://example.com/v");
        assert!(args.contains(&"--no-download".to_string()));
        assert!(args.contains(&"--no-playlist".to_string()));
    }

    #[test]
    fn test_resolve_prefers_post_processed_file() {
        let temp = TempDir::new().unwrap();
        let reported = temp.path().join("id_Song [abc].webm");
        let merged = temp.path().join("id_Song [abc].mp4");
        std::fs::write(&merged, b"data").unwrap();

        assert_eq!(resolve_output_path(&reported, "mp4"), merged);
    }

    #[test]
    fn test_resolve_falls_back_to_reported() {
        let temp = TempDir::new().unwrap();
        let reported = temp.path().join("id_Song [abc].webm");
        std::fs::write(&reported, b"data").unwrap();

        assert_eq!(resolve_output_path(&reported, "mp3"), reported);
    }

    #[test]
    fn test_resolve_keeps_dotted_titles() {
        let temp = TempDir::new().unwrap();
        let reported = temp.path().join("id_Vol. 2 [abc].webm");
        let converted = temp.path().join("id_Vol. 2 [abc].mp3");
        std::fs::write(&converted, b"data").unwrap();

        assert_eq!(resolve_output_path(&reported, "mp3"), converted);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_engine_failure_text_is_propagated() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let script = temp.path().join("fake-ytdlp");
        std::fs::write(
            &script,
            "#!/bin/sh\necho 'ERROR: [youtube] abc: Private video. Sign in' >&2\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let extractor = YtDlpExtractor::with_binary(script, DownloadsDir::new(temp.path()));
        let err = extractor
            .probe("https://www.youtube.com/watch?v=abc")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "ERROR: [youtube] abc: Private video. Sign in");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_parses_engine_json() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let script = temp.path().join("fake-ytdlp");
        std::fs::write(
            &script,
            r#"#!/bin/sh
echo '{"id":"abc","title":"Song","uploader":"Band","duration":61,"formats":[{"height":480},{"height":1080},{"height":240}]}'
"#,
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let extractor = YtDlpExtractor::with_binary(script, DownloadsDir::new(temp.path()));
        let info = extractor.probe("https://example.com/v").await.unwrap();

        assert_eq!(info.title.as_deref(), Some("Song"));
        assert_eq!(info.author.as_deref(), Some("Band"));
        assert_eq!(info.duration, Some(serde_json::Number::from(61)));
        assert_eq!(info.available_qualities, vec![1080, 480]);
        assert_eq!(info.url, "https://example.com/v");
    }

    /// Executable shell script standing in for yt-dlp
    #[cfg(unix)]
    fn fake_engine(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-ytdlp");
        std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    fn audio_mp3() -> DownloadOptions {
        DownloadOptions {
            media_type: MediaType::Audio,
            audio_codec: AudioCodec::Mp3,
            ..Default::default()
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_resolves_post_processed_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().display().to_string();
        let script = fake_engine(
            temp.path(),
            &format!(
                "touch '{dir}/rid_Song [abc].mp3'\n\
                 echo '{{\"id\":\"abc\",\"title\":\"Song\",\"channel\":\"Chan\",\"_filename\":\"{dir}/rid_Song [abc].webm\"}}'"
            ),
        );

        let extractor = YtDlpExtractor::with_binary(script, DownloadsDir::new(temp.path()));
        let result = extractor
            .fetch("https://www.youtube.com/watch?v=abc", &audio_mp3(), "rid")
            .await
            .unwrap();

        assert_eq!(result.path, temp.path().join("rid_Song [abc].mp3"));
        assert_eq!(result.title, "Chan - Song");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_title_falls_back_to_artist() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().display().to_string();
        let script = fake_engine(
            temp.path(),
            &format!(
                "echo '{{\"id\":\"abc\",\"artist\":\"Singer\",\"_filename\":\"{dir}/rid_media [abc].webm\"}}'"
            ),
        );

        let extractor = YtDlpExtractor::with_binary(script, DownloadsDir::new(temp.path()));
        let result = extractor
            .fetch("https://www.youtube.com/watch?v=abc", &audio_mp3(), "rid")
            .await
            .unwrap();

        // Converted file never appeared: the reported path is kept.
        assert_eq!(result.path, temp.path().join("rid_media [abc].webm"));
        assert_eq!(result.title, "Singer - media");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_without_reported_filename() {
        let temp = TempDir::new().unwrap();
        let script = fake_engine(temp.path(), r#"echo '{"id":"abc","title":"Song"}'"#);

        let extractor = YtDlpExtractor::with_binary(script, DownloadsDir::new(temp.path()));
        let err = extractor
            .fetch("https://www.youtube.com/watch?v=abc", &audio_mp3(), "rid")
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::FileMissing(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_playlist_document_is_rejected() {
        let temp = TempDir::new().unwrap();
        let script = fake_engine(
            temp.path(),
            r#"echo '{"_type":"playlist","id":"PLx","title":"Mix","entries":[]}'"#,
        );
        let extractor = YtDlpExtractor::with_binary(script, DownloadsDir::new(temp.path()));
        let url = "https://www.youtube.com/watch?v=abc&list=PLx";

        let err = extractor.probe(url).await.unwrap_err();
        assert!(matches!(err, MediaError::Engine(_)));
        assert!(err.to_string().contains("playlist"));

        let err = extractor.fetch(url, &audio_mp3(), "rid").await.unwrap_err();
        assert!(matches!(err, MediaError::Engine(_)));
        assert!(err.to_string().contains("playlist"));
    }
}
