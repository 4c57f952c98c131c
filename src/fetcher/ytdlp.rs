//! yt-dlp backed implementations of the collaborator traits
//!
//! All three contracts (playlist resolution, format listing, fetching) shell
//! out to the `yt-dlp` binary. Progress is streamed by asking yt-dlp to print
//! one machine-readable JSON line per progress callback; the final file path
//! is printed by yt-dlp itself once the file reaches its final location.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::config::FetcherConfig;
use crate::error::{Error, FetchError, FetchErrorCategory};
use crate::types::FormatInfo;

use super::{FetchOutcome, FetchRequest, FormatLister, MediaFetcher, PlaylistResolver, ProgressEvent};

/// Binary name searched on PATH when no explicit path is configured
const YTDLP_BINARY: &str = "yt-dlp";

/// Literal prefix our progress template puts in front of each JSON line,
/// so progress output is distinguishable from `--print` output
const PROGRESS_LINE_PREFIX: &str = "progress=";

/// Number of trailing stderr lines kept for failure messages
const STDERR_TAIL_LINES: usize = 12;

/// yt-dlp CLI driver implementing all three collaborator traits
pub struct YtDlp {
    binary: PathBuf,
    config: FetcherConfig,
}

impl YtDlp {
    /// Create a driver for an explicitly known binary path
    pub fn new(binary: PathBuf, config: FetcherConfig) -> Self {
        Self { binary, config }
    }

    /// Create a driver from configuration, discovering the binary if needed.
    ///
    /// Uses the explicitly configured path when set, otherwise searches PATH
    /// (unless `search_path` is disabled).
    pub fn from_config(config: &FetcherConfig) -> crate::Result<Self> {
        let binary = match &config.ytdlp_path {
            Some(path) => path.clone(),
            None if config.search_path => which::which(YTDLP_BINARY).map_err(|_| Error::Config {
                message: format!("{YTDLP_BINARY} binary not found in PATH"),
                key: Some("ytdlp_path".to_string()),
            })?,
            None => {
                return Err(Error::Config {
                    message: "no yt-dlp path configured and PATH search is disabled".to_string(),
                    key: Some("ytdlp_path".to_string()),
                });
            }
        };

        tracing::info!(binary = %binary.display(), "yt-dlp driver initialized");
        Ok(Self::new(binary, config.clone()))
    }

    /// Base command with flags shared by every invocation
    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--no-warnings")
            .arg("--socket-timeout")
            .arg(self.config.socket_timeout_secs.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Run yt-dlp to completion and capture its output
    async fn run_capture(&self, args: &[&str]) -> Result<std::process::Output, FetchError> {
        let output = self
            .base_command()
            .args(args)
            .output()
            .await
            .map_err(|e| FetchError::other(format!("could not start yt-dlp: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(output.status.code(), stderr.trim()));
        }

        Ok(output)
    }
}

#[async_trait]
impl PlaylistResolver for YtDlp {
    async fn resolve(&self, playlist_ref: &str) -> Result<Vec<String>, FetchError> {
        let mut args = vec![
            "--flat-playlist".to_string(),
            "--skip-download".to_string(),
            "--ignore-errors".to_string(),
            "--print".to_string(),
            "url".to_string(),
        ];
        if let Some(end) = self.config.playlist_end {
            args.push("--playlist-end".to_string());
            args.push(end.to_string());
        }
        args.push(playlist_ref.to_string());

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.run_capture(&arg_refs).await?;

        let urls: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(normalize_item_url)
            .collect();

        tracing::debug!(count = urls.len(), "playlist resolved");
        Ok(urls)
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

#[async_trait]
impl FormatLister for YtDlp {
    async fn list_formats(&self, item_url: &str) -> Result<Vec<FormatInfo>, FetchError> {
        let output = self
            .run_capture(&["--dump-json", "--skip-download", item_url])
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| FetchError::extraction("yt-dlp produced no metadata"))?;

        let info: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| FetchError::extraction(format!("invalid yt-dlp metadata: {e}")))?;

        let formats = info
            .get("formats")
            .and_then(|v| v.as_array())
            .map(|entries| entries.iter().filter_map(build_format_info).collect())
            .unwrap_or_default();

        Ok(formats)
    }
}

#[async_trait]
impl MediaFetcher for YtDlp {
    async fn fetch(
        &self,
        request: FetchRequest,
        progress: mpsc::Sender<ProgressEvent>,
    ) -> Result<FetchOutcome, FetchError> {
        let mut child = self
            .base_command()
            .arg("-f")
            .arg(&request.format_selector)
            .arg("-P")
            .arg(&request.download_dir)
            .arg("-o")
            .arg(&request.output_template)
            .arg("--newline")
            .arg("--quiet")
            .arg("--progress")
            .arg("--progress-template")
            .arg(format!("download:{PROGRESS_LINE_PREFIX}%(progress)j"))
            .arg("--print")
            .arg("after_move:filepath")
            .arg(&request.source_url)
            .spawn()
            .map_err(|e| FetchError::other(format!("could not start yt-dlp: {e}")))?;

        // Collect a stderr tail concurrently so a failure has a message
        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut tail: VecDeque<String> = VecDeque::new();
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
            tail.into_iter().collect::<Vec<_>>().join("\n")
        });

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| FetchError::other("failed to capture yt-dlp stdout"))?;
        let mut lines = BufReader::new(stdout).lines();

        // Progress lines carry our template prefix; the only other stdout
        // output is the `--print after_move:filepath` path
        let mut final_path: Option<PathBuf> = None;
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| FetchError::other(format!("failed to read yt-dlp output: {e}")))?
        {
            if let Some(event) = parse_progress_line(&line) {
                progress.send(event).await.ok();
            } else {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    final_path = Some(PathBuf::from(trimmed));
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| FetchError::other(format!("failed to wait for yt-dlp: {e}")))?;
        let stderr_tail = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(classify_failure(status.code(), &stderr_tail));
        }

        let file_path = final_path
            .ok_or_else(|| FetchError::other("yt-dlp did not report an output file"))?;

        progress
            .send(ProgressEvent::Finished {
                file_path: file_path.clone(),
            })
            .await
            .ok();

        Ok(FetchOutcome { file_path })
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

/// Ensure a resolved playlist entry is a full URL.
///
/// Flat playlist extraction can yield bare video IDs; expand those the same
/// way a watch URL would be written by hand.
fn normalize_item_url(raw: &str) -> String {
    if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("https://www.youtube.com/watch?v={raw}")
    }
}

/// Parse one stdout line into a progress event.
///
/// Returns None for non-progress lines and for progress states other than
/// "downloading" (per-stream "finished" callbacks fire once per format and
/// must not be treated as the fetch's terminal signal).
fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let payload = line.trim().strip_prefix(PROGRESS_LINE_PREFIX)?;
    let value: serde_json::Value = serde_json::from_str(payload).ok()?;

    if value.get("status")?.as_str()? != "downloading" {
        return None;
    }

    let downloaded_bytes = as_u64_lossy(value.get("downloaded_bytes")).unwrap_or(0);
    let total_bytes = as_u64_lossy(value.get("total_bytes"))
        .or_else(|| as_u64_lossy(value.get("total_bytes_estimate")));
    let speed_bps = as_u64_lossy(value.get("speed"));
    let destination = value
        .get("filename")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Some(ProgressEvent::Downloading {
        downloaded_bytes,
        total_bytes,
        speed_bps,
        destination,
    })
}

/// Read a JSON number as u64, accepting the floats yt-dlp emits for
/// estimates and speeds
fn as_u64_lossy(value: Option<&serde_json::Value>) -> Option<u64> {
    let value = value?;
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f as u64)
}

/// Build a FormatInfo from one entry of yt-dlp's "formats" array.
///
/// Entries without a format_id are skipped.
fn build_format_info(fmt: &serde_json::Value) -> Option<FormatInfo> {
    let format_id = fmt.get("format_id")?.as_str()?.to_string();
    let ext = fmt.get("ext").and_then(|v| v.as_str()).unwrap_or("N/A");
    let resolution = fmt
        .get("resolution")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let height = fmt
                .get("height")
                .and_then(|v| v.as_u64())
                .map(|h| h.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            format!("{height}p")
        });
    let vcodec = fmt.get("vcodec").and_then(|v| v.as_str()).unwrap_or("none");
    let acodec = fmt.get("acodec").and_then(|v| v.as_str()).unwrap_or("none");
    let format_note = fmt
        .get("format_note")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    let description = format!(
        "{format_id} - {ext} - {resolution} - Vcodec: {vcodec} - Acodec: {acodec} {format_note}"
    );

    Some(FormatInfo {
        format_id,
        description,
    })
}

/// Map a yt-dlp failure to a FetchError with a coarse category.
///
/// The category is derived from message inspection and is informational
/// only; every failure is handled identically by the orchestrator.
fn classify_failure(exit_code: Option<i32>, stderr_tail: &str) -> FetchError {
    let message = if stderr_tail.is_empty() {
        match exit_code {
            Some(code) => format!("yt-dlp exited with status {code}"),
            None => "yt-dlp terminated by signal".to_string(),
        }
    } else {
        stderr_tail.to_string()
    };

    FetchError::new(categorize_message(&message), message)
}

/// Coarse failure categorization by message inspection
fn categorize_message(message: &str) -> FetchErrorCategory {
    let lower = message.to_lowercase();
    if lower.contains("unsupported url")
        || lower.contains("unable to extract")
        || lower.contains("is not a valid url")
        || lower.contains("video unavailable")
    {
        FetchErrorCategory::Extraction
    } else if lower.contains("http error")
        || lower.contains("timed out")
        || lower.contains("connection")
        || lower.contains("unable to download")
        || lower.contains("network")
    {
        FetchErrorCategory::Network
    } else {
        FetchErrorCategory::Other
    }
}
