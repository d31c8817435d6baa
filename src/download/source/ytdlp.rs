//! yt-dlp subprocess backend

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{Extractor, MediaInfo, SearchPlaylist};
use crate::core::config::{self, DownloadLimits};
use crate::download::error::ExtractorError;

/// Format preference: formats Telegram plays natively first.
const AUDIO_FORMAT: &str =
    "bestaudio[ext=mp3]/bestaudio[ext=m4a]/bestaudio[ext=ogg]/bestaudio[ext=wav]/bestaudio[ext=flac]/bestaudio/best";

/// Output template; titles are capped so file names stay short.
const OUTPUT_TEMPLATE: &str = "%(title).100s.%(ext)s";

const SEARCH_SOCKET_TIMEOUT: &str = "15";
const DOWNLOAD_SOCKET_TIMEOUT: &str = "30";

/// Captured result of one yt-dlp run
struct RunOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl RunOutput {
    fn into_failure(self) -> ExtractorError {
        ExtractorError::Failed {
            code: self.status.code(),
            stderr: stderr_tail(&self.stderr),
        }
    }
}

/// Last few stderr lines, enough to see yt-dlp's `ERROR:` line.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let tail = lines[lines.len().saturating_sub(3)..].join(" | ");
    crate::core::utils::truncate_chars(&tail, 500)
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = source.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Waits for the child, killing it once `deadline` passes.
fn wait_with_deadline(child: &mut Child, deadline: Duration) -> Result<Option<ExitStatus>, ExtractorError> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if started.elapsed() >= deadline {
            log::error!("yt-dlp process timed out after {}s, killing", deadline.as_secs());
            let _ = child.kill();
            let _ = child.wait(); // Reap the zombie
            return Ok(None);
        }
        thread::sleep(Duration::from_millis(100));
    }
}

/// yt-dlp backed `Extractor`.
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    bin: String,
    search_deadline: Duration,
    probe_deadline: Duration,
    download_deadline: Duration,
    max_filesize_bytes: u64,
}

impl YtDlpExtractor {
    pub fn new(bin: impl Into<String>, search_deadline: Duration, probe_deadline: Duration, download_deadline: Duration) -> Self {
        Self {
            bin: bin.into(),
            search_deadline,
            probe_deadline,
            download_deadline,
            max_filesize_bytes: DownloadLimits::default().max_file_size_bytes(),
        }
    }

    /// Byte cap yt-dlp enforces while downloading.
    pub fn with_max_filesize(mut self, bytes: u64) -> Self {
        self.max_filesize_bytes = bytes;
        self
    }

    /// Extractor using `YTDL_BIN` and deadlines derived from the limits.
    pub fn from_config(download_limits: &DownloadLimits) -> Self {
        Self::new(
            config::YTDL_BIN.clone(),
            config::timeouts::search() + Duration::from_secs(5),
            download_limits.probe_timeout + Duration::from_secs(5),
            download_limits.worker_deadline(),
        )
        .with_max_filesize(download_limits.max_file_size_bytes())
    }

    pub(crate) fn search_args(query: &str, limit: usize) -> Vec<String> {
        vec![
            "--dump-single-json".into(),
            "--flat-playlist".into(),
            "--ignore-errors".into(),
            "--no-warnings".into(),
            "--socket-timeout".into(),
            SEARCH_SOCKET_TIMEOUT.into(),
            "--".into(),
            format!("scsearch{}:{}", limit, query),
        ]
    }

    pub(crate) fn probe_args(url: &str) -> Vec<String> {
        vec![
            "--dump-single-json".into(),
            "--skip-download".into(),
            "--no-playlist".into(),
            "--no-warnings".into(),
            "-f".into(),
            "bestaudio/best".into(),
            "--socket-timeout".into(),
            SEARCH_SOCKET_TIMEOUT.into(),
            "--".into(),
            url.into(),
        ]
    }

    pub(crate) fn download_args(url: &str, output_dir: &Path, max_filesize_bytes: u64) -> Vec<String> {
        vec![
            "-f".into(),
            AUDIO_FORMAT.into(),
            "-o".into(),
            output_dir.join(OUTPUT_TEMPLATE).to_string_lossy().into_owned(),
            "--no-playlist".into(),
            "--retries".into(),
            "3".into(),
            "--fragment-retries".into(),
            "3".into(),
            "--no-part".into(),
            "--no-overwrites".into(),
            "--max-filesize".into(),
            max_filesize_bytes.to_string(),
            "--socket-timeout".into(),
            DOWNLOAD_SOCKET_TIMEOUT.into(),
            "--no-progress".into(),
            "--no-warnings".into(),
            "--dump-json".into(),
            "--no-simulate".into(),
            "--".into(),
            url.into(),
        ]
    }

    fn run(&self, args: &[String], deadline: Duration) -> Result<RunOutput, ExtractorError> {
        log::debug!("Running {} {:?}", self.bin, args);
        let mut child = Command::new(&self.bin)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain both pipes on their own threads so a chatty child never blocks on a full pipe
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let status = wait_with_deadline(&mut child, deadline)?;
        let stdout = join_reader(stdout);
        let stderr = join_reader(stderr);

        match status {
            Some(status) => Ok(RunOutput { status, stdout, stderr }),
            None => Err(ExtractorError::TimedOut(deadline.as_secs())),
        }
    }
}

impl Extractor for YtDlpExtractor {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<MediaInfo>, ExtractorError> {
        let output = self.run(&Self::search_args(query, limit), self.search_deadline)?;

        // --ignore-errors may exit non-zero while still printing usable results
        match serde_json::from_slice::<SearchPlaylist>(&output.stdout) {
            Ok(playlist) => Ok(playlist.entries.into_iter().flatten().collect()),
            Err(e) if output.status.success() => Err(e.into()),
            Err(_) => Err(output.into_failure()),
        }
    }

    fn probe(&self, url: &str) -> Result<MediaInfo, ExtractorError> {
        let output = self.run(&Self::probe_args(url), self.probe_deadline)?;
        if !output.status.success() {
            return Err(output.into_failure());
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }

    fn download(&self, url: &str, output_dir: &Path) -> Result<MediaInfo, ExtractorError> {
        let output = self.run(
            &Self::download_args(url, output_dir, self.max_filesize_bytes),
            self.download_deadline,
        )?;
        if !output.status.success() {
            return Err(output.into_failure());
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let last_line = stdout.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("{}");
        Ok(serde_json::from_str(last_line)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_args_request_batch() {
        let args = YtDlpExtractor::search_args("-lofi", 30);
        assert_eq!(args.last().map(String::as_str), Some("scsearch30:-lofi"));
        // Query never lands where yt-dlp would parse it as an option
        assert_eq!(args[args.len() - 2], "--");
    }

    #[test]
    fn test_download_args_write_into_dir() {
        let args = YtDlpExtractor::download_args("https://soundcloud.com/a/b", Path::new("/tmp/work"), 1024);
        let out_idx = args.iter().position(|a| a == "-o").expect("output flag");
        assert_eq!(args[out_idx + 1], "/tmp/work/%(title).100s.%(ext)s");
        assert!(args.contains(&"--no-playlist".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("https://soundcloud.com/a/b"));
    }

    fn max_filesize_arg(extractor: &YtDlpExtractor) -> String {
        let args = YtDlpExtractor::download_args("https://soundcloud.com/a/b", Path::new("/tmp/work"), extractor.max_filesize_bytes);
        let idx = args.iter().position(|a| a == "--max-filesize").expect("size cap flag");
        args[idx + 1].clone()
    }

    #[test]
    fn test_size_cap_follows_configured_limit() {
        let default_limits = DownloadLimits::default();
        assert_eq!(max_filesize_arg(&YtDlpExtractor::from_config(&default_limits)), "52428800");

        let raised = DownloadLimits {
            max_file_size_mb: 200.0,
            ..DownloadLimits::default()
        };
        assert_eq!(max_filesize_arg(&YtDlpExtractor::from_config(&raised)), "209715200");
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let tail = stderr_tail(b"one\ntwo\n\nthree\nERROR: four\n");
        assert_eq!(tail, "two | three | ERROR: four");
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let extractor = YtDlpExtractor::new(
            "/nonexistent/yt-dlp-binary",
            Duration::from_secs(1),
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        let err = extractor.probe("https://soundcloud.com/a/b").expect_err("binary is missing");
        assert!(matches!(err, ExtractorError::Spawn(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_deadline_kills_child() {
        let extractor = YtDlpExtractor::new(
            "sh",
            Duration::from_millis(200),
            Duration::from_millis(200),
            Duration::from_millis(200),
        );
        let started = Instant::now();
        // exec so the killed pid is the one holding the pipes
        let result = extractor.run(&["-c".to_string(), "exec sleep 5".to_string()], Duration::from_millis(200));
        assert!(matches!(result, Err(ExtractorError::TimedOut(_))));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
