use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Configuration constants for the bot
/// Reads an environment variable and parses it, falling back to `default`
/// when the variable is missing or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("⚠️ Ignoring malformed {}={:?}, using default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Telegram user ids allowed to run the admin commands
/// Read from ADMIN_IDS (comma or whitespace separated). Empty disables admin commands.
pub static ADMIN_IDS: Lazy<Vec<i64>> =
    Lazy::new(|| parse_admin_ids(&env::var("ADMIN_IDS").unwrap_or_default()));

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Root directory for per-download temporary directories
/// Read from TEMP_FILES_DIR, defaults to the system temp dir
pub static TEMP_FILES_DIR: Lazy<PathBuf> = Lazy::new(|| {
    env::var("TEMP_FILES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir())
});

/// User sessions file
/// Default: user_data.json
pub static DATA_FILE: Lazy<PathBuf> =
    Lazy::new(|| PathBuf::from(env::var("DATA_FILE").unwrap_or_else(|_| "user_data.json".to_string())));

/// Charts cache file
/// Default: charts_cache.json
pub static CHARTS_FILE: Lazy<PathBuf> =
    Lazy::new(|| PathBuf::from(env::var("CHARTS_FILE").unwrap_or_else(|_| "charts_cache.json".to_string())));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: bot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "bot.log".to_string()));

/// Port for the /health endpoint. Unset disables the server.
pub static HEALTH_PORT: Lazy<Option<u16>> = Lazy::new(|| env::var("HEALTH_PORT").ok().and_then(|p| p.parse().ok()));

/// Parses an admin id list like `"123, 456 789"`, skipping junk entries.
pub fn parse_admin_ids(raw: &str) -> Vec<i64> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .filter_map(|part| match part.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                log::warn!("⚠️ Skipping invalid admin id {:?}", part);
                None
            }
        })
        .collect()
}

/// Attachment size limits
pub mod limits {
    /// Telegram Bot API upload limit for bots (in megabytes)
    pub const MAX_FILE_SIZE_MB: f64 = 50.0;

    /// Tracks longer than this (seconds) get a stricter pre-download size threshold
    pub const LONG_TRACK_SECS: u32 = 1800;

    /// Share of the size limit allowed for long tracks before downloading
    pub const LONG_TRACK_SIZE_RATIO: f64 = 0.7;

    /// Telegram limit for audio title / performer fields (characters)
    pub const AUDIO_FIELD_MAX_CHARS: usize = 64;

    /// Extensions Telegram plays inline as audio
    pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "ogg", "wav", "flac"];
}

/// Download timeout configuration
pub mod timeouts {
    use super::Duration;

    /// Tracks shorter than this (seconds) are "short"
    pub const SHORT_TRACK_SECS: u32 = 180;

    /// Tracks shorter than this (seconds) are "medium"; everything else is "long"
    pub const MEDIUM_TRACK_SECS: u32 = 600;

    pub const SHORT_SECS: u64 = 30;
    pub const MEDIUM_SECS: u64 = 60;
    pub const LONG_SECS: u64 = 120;

    /// Timeout for one search call
    pub const SEARCH_SECS: u64 = 25;

    /// Timeout for the size probe
    pub const PROBE_SECS: u64 = 20;

    /// Search timeout duration
    pub fn search() -> Duration {
        Duration::from_secs(super::env_or("SEARCH_TIMEOUT_SECS", SEARCH_SECS))
    }
}

/// Queue processing configuration
pub mod queue {
    /// Maximum number of concurrent downloads
    pub const MAX_CONCURRENT_DOWNLOADS: usize = 3;

    /// Maximum number of concurrent searches
    pub const MAX_CONCURRENT_SEARCHES: usize = 3;

    pub fn max_concurrent_searches() -> usize {
        super::env_or("MAX_CONCURRENT_SEARCHES", MAX_CONCURRENT_SEARCHES).max(1)
    }
}

/// Search and listing configuration
pub mod search {
    /// Candidates requested from SoundCloud per search (`scsearch30:`)
    pub const BATCH_SIZE: usize = 30;

    /// Buttons per listing page
    pub const RESULTS_PER_PAGE: usize = 10;

    /// Minimum length of a free-text query
    pub const MIN_QUERY_CHARS: usize = 2;

    /// Remembered search queries per user
    pub const SEARCH_HISTORY_LIMIT: usize = 10;

    /// Remembered downloads per user
    pub const DOWNLOAD_HISTORY_LIMIT: usize = 50;
}

/// Charts / playlists / recommendations
pub mod discovery {
    use super::Duration;

    /// Charts are rebuilt when older than this
    pub const CHARTS_TTL_HOURS: i64 = 24;

    /// Popular queries used to build the charts
    pub const CHARTS_QUERIES: usize = 5;

    /// Tracks kept per chart query
    pub const CHARTS_TRACKS_PER_QUERY: usize = 10;

    /// Queries taken from a mood playlist
    pub const PLAYLIST_QUERIES: usize = 3;

    /// Tracks kept per playlist query
    pub const PLAYLIST_TRACKS_PER_QUERY: usize = 10;

    /// Popular queries mixed into recommendations
    pub const POPULAR_QUERIES: usize = 4;

    /// Tracks kept per popular query
    pub const POPULAR_TRACKS_PER_QUERY: usize = 8;

    /// Recent downloads used as recommendation seeds
    pub const RECENT_DOWNLOADS: usize = 10;

    /// Max tracks shown in any generated listing
    pub const LISTING_LIMIT: usize = 30;

    /// Pause between consecutive searches of one refresh
    pub const QUERY_PAUSE_MS: u64 = 1000;

    pub fn query_pause() -> Duration {
        Duration::from_millis(QUERY_PAUSE_MS)
    }
}

/// Rate limiting configuration
pub mod rate_limit {
    use super::Duration;

    /// Seconds between two downloads of the same user
    pub const COOLDOWN_SECONDS: u64 = 3;

    /// Rate limit duration
    pub fn duration() -> Duration {
        Duration::from_secs(super::env_or("DOWNLOAD_COOLDOWN_SECS", COOLDOWN_SECONDS))
    }
}

/// Temp directory cleanup
pub mod cleanup {
    use super::Duration;

    /// Total removal attempts
    pub const ATTEMPTS: usize = 3;

    pub const RETRY_DELAY_MS: u64 = 300;

    pub fn retry_delay() -> Duration {
        Duration::from_millis(RETRY_DELAY_MS)
    }
}

/// Admin maintenance
pub mod admin {
    /// Users without activity for longer than this are removed by /admin_cleanup
    pub const INACTIVE_DAYS: i64 = 30;
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// HTTP client timeout for Bot API requests (seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 300;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Everything the download orchestrator needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadLimits {
    /// Hard attachment limit in megabytes
    pub max_file_size_mb: f64,
    /// Duration (seconds) above which the stricter pre-check ratio applies
    pub long_track_secs: u32,
    /// Share of `max_file_size_mb` allowed for long tracks before download
    pub long_track_ratio: f64,
    pub short_timeout: Duration,
    pub medium_timeout: Duration,
    pub long_timeout: Duration,
    pub probe_timeout: Duration,
    pub max_concurrent_downloads: usize,
    /// Parent directory for per-attempt temp directories
    pub temp_root: PathBuf,
}

impl Default for DownloadLimits {
    fn default() -> Self {
        Self {
            max_file_size_mb: limits::MAX_FILE_SIZE_MB,
            long_track_secs: limits::LONG_TRACK_SECS,
            long_track_ratio: limits::LONG_TRACK_SIZE_RATIO,
            short_timeout: Duration::from_secs(timeouts::SHORT_SECS),
            medium_timeout: Duration::from_secs(timeouts::MEDIUM_SECS),
            long_timeout: Duration::from_secs(timeouts::LONG_SECS),
            probe_timeout: Duration::from_secs(timeouts::PROBE_SECS),
            max_concurrent_downloads: queue::MAX_CONCURRENT_DOWNLOADS,
            temp_root: env::temp_dir(),
        }
    }
}

impl DownloadLimits {
    /// Builds limits from the environment overrides
    /// (`MAX_FILE_SIZE_MB`, `TIMEOUT_*_SECS`, `MAX_CONCURRENT_DOWNLOADS`, `TEMP_FILES_DIR`).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_file_size_mb: env_or("MAX_FILE_SIZE_MB", defaults.max_file_size_mb),
            short_timeout: Duration::from_secs(env_or("TIMEOUT_SHORT_SECS", timeouts::SHORT_SECS)),
            medium_timeout: Duration::from_secs(env_or("TIMEOUT_MEDIUM_SECS", timeouts::MEDIUM_SECS)),
            long_timeout: Duration::from_secs(env_or("TIMEOUT_LONG_SECS", timeouts::LONG_SECS)),
            probe_timeout: Duration::from_secs(env_or("PROBE_TIMEOUT_SECS", timeouts::PROBE_SECS)),
            max_concurrent_downloads: env_or("MAX_CONCURRENT_DOWNLOADS", queue::MAX_CONCURRENT_DOWNLOADS),
            temp_root: TEMP_FILES_DIR.clone(),
            ..defaults
        }
        .normalized()
    }

    /// Clamps overrides into a consistent shape: timeouts never shrink as
    /// duration grows, at least one download slot, a positive size limit.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.max_file_size_mb.is_nan() || self.max_file_size_mb <= 0.0 {
            self.max_file_size_mb = limits::MAX_FILE_SIZE_MB;
        }
        self.long_track_ratio = self.long_track_ratio.clamp(0.0, 1.0);
        self.max_concurrent_downloads = self.max_concurrent_downloads.max(1);
        self.medium_timeout = self.medium_timeout.max(self.short_timeout);
        self.long_timeout = self.long_timeout.max(self.medium_timeout);
        self
    }

    /// Size limit in bytes, as yt-dlp's `--max-filesize` expects it.
    pub fn max_file_size_bytes(&self) -> u64 {
        (self.max_file_size_mb * 1024.0 * 1024.0) as u64
    }

    /// Process-level deadline for one yt-dlp download. Outlives the caller's
    /// timeout so a stray worker still terminates.
    pub fn worker_deadline(&self) -> Duration {
        self.long_timeout * 2
    }
}
