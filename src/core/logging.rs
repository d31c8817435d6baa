//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A startup summary of the effective limits
//! - A panic hook that routes panics into the log

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config::{self, DownloadLimits};

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    install_panic_hook();

    Ok(())
}

/// Logs panics through `log` so they land in the log file too.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        log::error!("💥 Panic: {}", info);
        default_hook(info);
    }));
}

/// Logs the effective configuration at application startup
pub fn log_startup_configuration(limits: &DownloadLimits) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🎛️ Startup configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("yt-dlp binary: {}", *config::YTDL_BIN);
    log::info!("Sessions file: {}", config::DATA_FILE.display());
    log::info!("Charts file: {}", config::CHARTS_FILE.display());
    log::info!("Temp root: {}", limits.temp_root.display());
    log::info!(
        "Size limit: {:.0} MB ({:.0}% for tracks over {}s)",
        limits.max_file_size_mb,
        limits.long_track_ratio * 100.0,
        limits.long_track_secs
    );
    log::info!(
        "Timeouts: short {}s / medium {}s / long {}s",
        limits.short_timeout.as_secs(),
        limits.medium_timeout.as_secs(),
        limits.long_timeout.as_secs()
    );
    log::info!(
        "Concurrency: {} downloads / {} searches",
        limits.max_concurrent_downloads,
        config::queue::max_concurrent_searches()
    );

    if config::ADMIN_IDS.is_empty() {
        log::warn!("⚠️  ADMIN_IDS not set. Admin commands disabled.");
    } else {
        log::info!("✅ Admins configured: {:?}", *config::ADMIN_IDS);
    }
}
