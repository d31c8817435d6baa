//! Mock extraction backend
//!
//! Returns canned search results and probe sizes, and simulates downloads
//! with a configurable delay and outcome. Counters let tests check how often
//! and how concurrently the download worker ran.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use cloudtune::download::{Extractor, ExtractorError, MediaInfo};

/// What a simulated download does after its delay
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadBehavior {
    /// Writes `track.mp3` of the configured size
    Succeed,
    /// Returns a yt-dlp failure
    Fail,
    /// Panics inside the worker
    Panic,
    /// Succeeds but writes only a non-audio file
    NoAudio,
}

pub struct MockExtractor {
    search_results: Vec<MediaInfo>,
    probe_size: Option<u64>,
    file_bytes: usize,
    delay: Duration,
    /// Files are written before the delay, like a partial download
    write_before_delay: bool,
    behavior: DownloadBehavior,

    in_flight: AtomicUsize,
    peak: AtomicUsize,
    downloads: AtomicUsize,
    probes: AtomicUsize,
    bytes_written: AtomicUsize,
    dirs: Mutex<Vec<PathBuf>>,
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self {
            search_results: Vec::new(),
            probe_size: None,
            file_bytes: 1024,
            delay: Duration::ZERO,
            write_before_delay: false,
            behavior: DownloadBehavior::Succeed,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
            probes: AtomicUsize::new(0),
            bytes_written: AtomicUsize::new(0),
            dirs: Mutex::new(Vec::new()),
        }
    }
}

/// Search entry the way `scsearch` returns it
pub fn entry(title: &str, uploader: &str, duration: f64, size_bytes: Option<u64>) -> MediaInfo {
    let slug = title.to_lowercase().replace(' ', "-");
    MediaInfo {
        title: Some(title.to_string()),
        webpage_url: Some(format!("https://soundcloud.com/{}/{}", uploader, slug)),
        duration: Some(duration),
        uploader: Some(uploader.to_string()),
        filesize: size_bytes.map(|b| b as f64),
        ..Default::default()
    }
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_results(mut self, results: Vec<MediaInfo>) -> Self {
        self.search_results = results;
        self
    }

    pub fn with_probe_size(mut self, bytes: u64) -> Self {
        self.probe_size = Some(bytes);
        self
    }

    pub fn with_file_bytes(mut self, bytes: usize) -> Self {
        self.file_bytes = bytes;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn writing_before_delay(mut self) -> Self {
        self.write_before_delay = true;
        self
    }

    pub fn with_behavior(mut self, behavior: DownloadBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written.load(Ordering::SeqCst)
    }

    /// Output directories handed to the worker, in call order
    pub fn dirs(&self) -> Vec<PathBuf> {
        self.dirs.lock().unwrap().clone()
    }

    fn write_output(&self, dir: &Path) -> Result<(), ExtractorError> {
        let name = if self.behavior == DownloadBehavior::NoAudio {
            "track.part.txt"
        } else {
            "track.mp3"
        };
        std::fs::write(dir.join(name), vec![0u8; self.file_bytes])?;
        self.bytes_written.fetch_add(self.file_bytes, Ordering::SeqCst);
        Ok(())
    }
}

/// Decrements the in-flight counter even when the worker panics
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Extractor for MockExtractor {
    fn search(&self, _query: &str, limit: usize) -> Result<Vec<MediaInfo>, ExtractorError> {
        Ok(self.search_results.iter().take(limit).cloned().collect())
    }

    fn probe(&self, url: &str) -> Result<MediaInfo, ExtractorError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(MediaInfo {
            webpage_url: Some(url.to_string()),
            filesize: self.probe_size.map(|b| b as f64),
            ..Default::default()
        })
    }

    fn download(&self, url: &str, output_dir: &Path) -> Result<MediaInfo, ExtractorError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.dirs.lock().unwrap().push(output_dir.to_path_buf());

        if self.write_before_delay {
            self.write_output(output_dir)?;
        }
        std::thread::sleep(self.delay);

        match self.behavior {
            DownloadBehavior::Fail => Err(ExtractorError::Failed {
                code: Some(1),
                stderr: "ERROR: Unable to download".to_string(),
            }),
            DownloadBehavior::Panic => panic!("simulated worker crash"),
            DownloadBehavior::Succeed | DownloadBehavior::NoAudio => {
                if !self.write_before_delay {
                    self.write_output(output_dir)?;
                }
                Ok(MediaInfo {
                    webpage_url: Some(url.to_string()),
                    ..Default::default()
                })
            }
        }
    }
}
