//! Download orchestration
//!
//! `DownloadOrchestrator` takes one `Track` from "the user pressed a button"
//! to "an audio message is in the chat" (or a clear failure line):
//!
//! 1. reject tracks without an http(s) source URL
//! 2. probe the declared size and refuse files over the limit
//! 3. wait for a download slot
//! 4. download into a private temp dir on the blocking pool, under a
//!    duration-based timeout
//! 5. pick the audio file, re-check its real size, upload it
//! 6. record the download in the user's session
//!
//! The slot permit and the temp dir are moved into the blocking worker, so a
//! timed-out caller never frees a slot or a directory the worker still uses.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::core::config::{limits, timeouts, DownloadLimits};
use crate::core::types::Track;
use crate::core::utils::bytes_to_mb;
use crate::download::delivery::{AudioUpload, DeliverySink};
use crate::download::error::{DeliveryFailure, ExtractorError};
use crate::download::progress::{ProgressTracker, Stage};
use crate::download::source::{Extractor, MediaInfo};
use crate::download::temp::ScopedTempDir;
use crate::storage::{update_session, SessionStore};

/// Result of the pre-download size check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeEstimate {
    /// Declared size in MiB, 0 when unknown
    pub size_mb: f64,
    pub fits_limit: bool,
    /// Threshold the size was compared against
    pub threshold_mb: f64,
}

pub struct DownloadOrchestrator {
    extractor: Arc<dyn Extractor>,
    store: Arc<dyn SessionStore>,
    limits: DownloadLimits,
    slots: Arc<Semaphore>,
}

impl DownloadOrchestrator {
    pub fn new(extractor: Arc<dyn Extractor>, store: Arc<dyn SessionStore>, limits: DownloadLimits) -> Self {
        let limits = limits.normalized();
        let slots = Arc::new(Semaphore::new(limits.max_concurrent_downloads));
        Self {
            extractor,
            store,
            limits,
            slots,
        }
    }

    /// Free download slots right now
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    /// Pre-check threshold: long tracks get a reduced budget because their
    /// declared sizes tend to undershoot.
    pub fn threshold_mb(&self, duration: u32) -> f64 {
        if duration > self.limits.long_track_secs {
            self.limits.max_file_size_mb * self.limits.long_track_ratio
        } else {
            self.limits.max_file_size_mb
        }
    }

    /// Probes the declared size without fetching the payload.
    ///
    /// Falls back to the size reported by search, and is optimistic
    /// (`0 MB`, fits) when neither is known or the probe fails.
    pub async fn estimate_size(&self, track: &Track) -> SizeEstimate {
        let threshold_mb = self.threshold_mb(track.duration);
        let optimistic = SizeEstimate {
            size_mb: 0.0,
            fits_limit: true,
            threshold_mb,
        };

        let extractor = Arc::clone(&self.extractor);
        let url = track.webpage_url.clone();
        let task = tokio::task::spawn_blocking(move || extractor.probe(&url));

        let info: MediaInfo = match tokio::time::timeout(self.limits.probe_timeout, task).await {
            Ok(Ok(Ok(info))) => info,
            Ok(Ok(Err(e))) => {
                log::warn!("⚠️ Size probe failed for '{}': {}", track.title, e);
                return optimistic;
            }
            Ok(Err(join_err)) => {
                log::warn!("⚠️ Size probe worker failed for '{}': {}", track.title, join_err);
                return optimistic;
            }
            Err(_) => {
                log::warn!("⚠️ Size probe timed out for '{}'", track.title);
                return optimistic;
            }
        };

        match info.declared_size_bytes().or(track.filesize_approx) {
            Some(bytes) => {
                let size_mb = bytes_to_mb(bytes);
                SizeEstimate {
                    size_mb,
                    fits_limit: size_mb < threshold_mb,
                    threshold_mb,
                }
            }
            None => optimistic,
        }
    }

    /// Download timeout bucket for the track's duration.
    pub fn select_timeout(&self, track: &Track) -> Duration {
        if track.duration < timeouts::SHORT_TRACK_SECS {
            self.limits.short_timeout
        } else if track.duration < timeouts::MEDIUM_TRACK_SECS {
            self.limits.medium_timeout
        } else {
            self.limits.long_timeout
        }
    }

    /// Runs the whole pipeline starting at `Downloading`.
    pub async fn download_and_deliver(&self, user_id: i64, track: &Track, sink: &dyn DeliverySink) -> bool {
        let mut tracker = ProgressTracker::new();
        self.deliver_tracked(user_id, track, sink, &mut tracker).await
    }

    /// Runs the pipeline continuing an existing tracker (e.g. after `Searching`).
    /// Returns `true` only when the audio was sent.
    pub async fn deliver_tracked(
        &self,
        user_id: i64,
        track: &Track,
        sink: &dyn DeliverySink,
        tracker: &mut ProgressTracker,
    ) -> bool {
        if track.source_url().is_none() {
            log::warn!("⚠️ Track '{}' has no usable URL", track.title);
            return self.fail(tracker, sink, track, DeliveryFailure::MissingUrl).await;
        }

        let estimate = self.estimate_size(track).await;
        if !estimate.fits_limit {
            log::info!(
                "📦 '{}' declares {:.1} MB (threshold {:.1} MB), offering link",
                track.title,
                estimate.size_mb,
                estimate.threshold_mb
            );
            return self.too_large(tracker, sink, track, estimate.size_mb).await;
        }

        let permit = match Arc::clone(&self.slots).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                return self
                    .fail(tracker, sink, track, DeliveryFailure::Extraction(e.to_string()))
                    .await
            }
        };
        tracker.emit(sink, Stage::Downloading, track).await;

        let workdir = match ScopedTempDir::create_in(&self.limits.temp_root) {
            Ok(dir) => Arc::new(dir),
            Err(e) => {
                log::error!("❌ Could not create temp dir: {}", e);
                return self
                    .fail(tracker, sink, track, DeliveryFailure::Extraction(e.to_string()))
                    .await;
            }
        };

        let timeout = self.select_timeout(track);
        log::info!(
            "⬇️ Downloading '{}' ({}s) for user {} with timeout {:?}",
            track.title,
            track.duration,
            user_id,
            timeout
        );

        let extractor = Arc::clone(&self.extractor);
        let worker_dir = Arc::clone(&workdir);
        let url = track.webpage_url.clone();
        let task = tokio::task::spawn_blocking(move || {
            // Both are released only when the worker returns
            let _permit = permit;
            let result = extractor.download(&url, worker_dir.path());
            drop(worker_dir);
            result
        });

        let download: Result<MediaInfo, ExtractorError> = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                log::error!("❌ Download worker crashed for '{}': {}", track.title, join_err);
                return self
                    .fail(tracker, sink, track, DeliveryFailure::Extraction(join_err.to_string()))
                    .await;
            }
            Err(_) => {
                log::error!("❌ Download error for '{}': timed out after {:?}", track.title, timeout);
                if let Err(e) = workdir.cleanup() {
                    log::warn!("⚠️ Early cleanup after timeout failed: {}", e);
                }
                return self
                    .fail(
                        tracker,
                        sink,
                        track,
                        DeliveryFailure::Timeout {
                            secs: timeout.as_secs(),
                        },
                    )
                    .await;
            }
        };

        if let Err(e) = download {
            log::error!("❌ Download error for '{}': {}", track.title, e);
            return self
                .fail(tracker, sink, track, DeliveryFailure::Extraction(e.to_string()))
                .await;
        }

        tracker.emit(sink, Stage::Processing, track).await;

        let Some(audio_path) = find_audio_file(workdir.path()) else {
            log::error!("❌ No audio file in {} for '{}'", workdir.path().display(), track.title);
            return self.fail(tracker, sink, track, DeliveryFailure::NoAudioFile).await;
        };

        let size_mb = match fs_err::metadata(&audio_path) {
            Ok(meta) => bytes_to_mb(meta.len()),
            Err(e) => {
                log::error!("❌ Could not stat {}: {}", audio_path.display(), e);
                return self.fail(tracker, sink, track, DeliveryFailure::NoAudioFile).await;
            }
        };

        if size_mb >= self.limits.max_file_size_mb {
            log::info!("📦 '{}' is {:.1} MB on disk, offering link", track.title, size_mb);
            return self.too_large(tracker, sink, track, size_mb).await;
        }

        tracker.emit(sink, Stage::Sending, track).await;

        if let Err(e) = sink.send_audio(AudioUpload::new(audio_path, track, size_mb)).await {
            log::error!("❌ Failed to send '{}': {}", track.title, e);
            return self
                .fail(tracker, sink, track, DeliveryFailure::SendFailed(e.to_string()))
                .await;
        }
        drop(workdir);

        let downloaded = track.clone();
        if let Err(e) = update_session(self.store.as_ref(), user_id, move |session| {
            session.record_download(downloaded);
        }) {
            log::warn!("⚠️ Could not record download for user {}: {}", user_id, e);
        }

        tracker.emit(sink, Stage::Success, track).await;
        log::info!("✅ Delivered '{}' ({:.1} MB) to user {}", track.title, size_mb, user_id);
        true
    }

    async fn too_large(&self, tracker: &mut ProgressTracker, sink: &dyn DeliverySink, track: &Track, size_mb: f64) -> bool {
        let limit_mb = self.limits.max_file_size_mb;
        tracker
            .emit(sink, Stage::Error(DeliveryFailure::TooLarge { size_mb, limit_mb }), track)
            .await;
        sink.offer_external_link(track, size_mb, limit_mb).await;
        false
    }

    async fn fail(
        &self,
        tracker: &mut ProgressTracker,
        sink: &dyn DeliverySink,
        track: &Track,
        failure: DeliveryFailure,
    ) -> bool {
        log::debug!("Delivery of '{}' failed: {}", track.title, failure.subcategory());
        tracker.emit(sink, Stage::Error(failure), track).await;
        false
    }
}

/// First file (by name) in `dir` with an allowed audio extension.
pub fn find_audio_file(dir: &Path) -> Option<PathBuf> {
    let entries = match fs_err::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("⚠️ Could not read {}: {}", dir.display(), e);
            return None;
        }
    };

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| limits::AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}
