//! Per-attempt working directory that removes itself.

use backon::{BlockingRetryable, ConstantBuilder};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::config::cleanup;

/// Exclusively owned temp directory, removed on drop.
///
/// Shared as `Arc<ScopedTempDir>` between the caller and the blocking worker:
/// whichever side lets go last deletes the directory, so a worker that
/// outlives a timed-out caller still cleans up after itself.
#[derive(Debug)]
pub struct ScopedTempDir {
    path: PathBuf,
}

impl ScopedTempDir {
    /// Creates a fresh uniquely named directory under `root`.
    pub fn create_in(root: &Path) -> io::Result<Self> {
        fs_err::create_dir_all(root)?;
        let dir = tempfile::Builder::new().prefix("cloudtune-").tempdir_in(root)?;
        Ok(Self { path: dir.keep() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the directory now, retrying transient failures.
    /// Safe to call repeatedly; a missing directory counts as removed.
    pub fn cleanup(&self) -> io::Result<()> {
        remove_dir_with_retry(&self.path)
    }
}

impl Drop for ScopedTempDir {
    fn drop(&mut self) {
        match self.cleanup() {
            Ok(()) => log::debug!("🧹 Removed temp dir {}", self.path.display()),
            Err(e) => log::error!("❌ Could not remove temp dir {}: {}", self.path.display(), e),
        }
    }
}

/// Deletes `path` recursively, up to `cleanup::ATTEMPTS` times with a short pause.
pub fn remove_dir_with_retry(path: &Path) -> io::Result<()> {
    retry_removal(
        || match fs_err::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        },
        cleanup::retry_delay(),
    )
}

fn retry_removal(remove: impl FnMut() -> io::Result<()>, delay: Duration) -> io::Result<()> {
    remove
        .retry(
            ConstantBuilder::default()
                .with_delay(delay)
                .with_max_times(cleanup::ATTEMPTS.saturating_sub(1)),
        )
        .sleep(std::thread::sleep)
        .notify(|err: &io::Error, dur| {
            log::warn!("⚠️ Temp dir cleanup failed ({}), retrying in {:?}", err, dur);
        })
        .call()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::Arc;

    #[test]
    fn test_dropped_dir_is_removed() {
        let root = tempfile::tempdir().expect("root");
        let path = {
            let dir = ScopedTempDir::create_in(root.path()).expect("create");
            fs_err::write(dir.path().join("track.mp3"), b"data").expect("write");
            dir.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_last_owner_removes() {
        let root = tempfile::tempdir().expect("root");
        let dir = Arc::new(ScopedTempDir::create_in(root.path()).expect("create"));
        let worker = Arc::clone(&dir);
        let path = dir.path().to_path_buf();

        drop(dir);
        assert!(path.exists(), "worker still holds the directory");
        drop(worker);
        assert!(!path.exists());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let root = tempfile::tempdir().expect("root");
        let dir = ScopedTempDir::create_in(root.path()).expect("create");
        dir.cleanup().expect("first cleanup");
        dir.cleanup().expect("second cleanup");
        assert!(!dir.path().exists());
    }

    #[test]
    fn test_creates_missing_root() {
        let root = tempfile::tempdir().expect("root");
        let nested = root.path().join("a").join("b");
        let dir = ScopedTempDir::create_in(&nested).expect("create");
        assert!(dir.path().starts_with(&nested));
    }

    #[test]
    fn test_persistent_failure_gives_up_after_all_attempts() {
        let calls = Cell::new(0);
        let result = retry_removal(
            || {
                calls.set(calls.get() + 1);
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
            },
            Duration::from_millis(1),
        );

        assert_eq!(result.expect_err("removal never succeeds").kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(calls.get(), cleanup::ATTEMPTS);
    }

    #[test]
    fn test_transient_failure_is_retried() {
        let calls = Cell::new(0);
        let result = retry_removal(
            || {
                calls.set(calls.get() + 1);
                if calls.get() < cleanup::ATTEMPTS {
                    Err(io::Error::other("busy"))
                } else {
                    Ok(())
                }
            },
            Duration::from_millis(1),
        );

        assert!(result.is_ok());
        assert_eq!(calls.get(), cleanup::ATTEMPTS);
    }
}
