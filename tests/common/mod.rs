//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod recorder;

#[allow(unused_imports)]
pub use recorder::{RecordingSink, SinkEvent};

use std::path::Path;
use std::time::Duration;

use cloudtune::core::DownloadLimits;

pub const MB: u64 = 1024 * 1024;

/// Limits rooted in `temp_root` with short timeouts
#[allow(dead_code)]
pub fn test_limits(temp_root: &Path) -> DownloadLimits {
    DownloadLimits {
        max_file_size_mb: 50.0,
        short_timeout: Duration::from_secs(5),
        medium_timeout: Duration::from_secs(5),
        long_timeout: Duration::from_secs(5),
        probe_timeout: Duration::from_secs(5),
        max_concurrent_downloads: 2,
        temp_root: temp_root.to_path_buf(),
        ..DownloadLimits::default()
    }
}

/// Entries left under `dir` (0 when it does not exist)
#[allow(dead_code)]
pub fn entries_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|rd| rd.count()).unwrap_or(0)
}
