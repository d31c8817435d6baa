use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::dispatching::Dispatcher;
use teloxide::error_handlers::LoggingErrorHandler;

use cloudtune::cli::{Cli, Commands};
use cloudtune::core::health::start_health_server;
use cloudtune::core::rate_limiter::RateLimiter;
use cloudtune::core::{config, init_logger, log_startup_configuration, DownloadLimits};
use cloudtune::core::utils::format_duration;
use cloudtune::download::{Discovery, DownloadOrchestrator, Extractor, SearchService, YtDlpExtractor};
use cloudtune::storage::{ChartsCache, JsonFileStore, SessionStore};
use cloudtune::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run) | None => run_bot().await,
        Some(Commands::Search { query, limit }) => run_search(&query, limit).await,
        Some(Commands::Probe { url }) => run_probe(&url).await,
    }
}

async fn run_search(query: &str, limit: usize) -> Result<()> {
    let limits = DownloadLimits::from_env();
    let extractor: Arc<dyn Extractor> = Arc::new(YtDlpExtractor::from_config(&limits));
    let search = SearchService::from_config(extractor);

    let tracks = search.search(query).await?;
    if tracks.is_empty() {
        println!("Nothing found for '{}'", query);
        return Ok(());
    }
    for (i, track) in tracks.iter().take(limit).enumerate() {
        println!(
            "{:>2}. {} - {} [{}] {}",
            i + 1,
            track.artist,
            track.title,
            format_duration(track.duration),
            track.webpage_url
        );
    }
    Ok(())
}

async fn run_probe(url: &str) -> Result<()> {
    let limits = DownloadLimits::from_env();
    let extractor = YtDlpExtractor::from_config(&limits);
    let url = url.to_string();
    let info = tokio::task::spawn_blocking(move || extractor.probe(&url)).await??;

    println!("Title:    {}", info.title.as_deref().unwrap_or("?"));
    println!("Uploader: {}", info.uploader.as_deref().unwrap_or("?"));
    println!(
        "Duration: {}",
        info.duration.map(|d| format_duration(d as u32)).unwrap_or_else(|| "?".into())
    );
    match info.declared_size_bytes() {
        Some(bytes) => println!("Size:     {:.1} MB", bytes as f64 / (1024.0 * 1024.0)),
        None => println!("Size:     unknown"),
    }
    Ok(())
}

/// Runs the bot with long polling until Ctrl+C
async fn run_bot() -> Result<()> {
    if config::BOT_TOKEN.is_empty() {
        log::error!("❌ BOT_TOKEN is not set");
        std::process::exit(1);
    }

    let limits = DownloadLimits::from_env();
    log_startup_configuration(&limits);

    let extractor: Arc<dyn Extractor> = Arc::new(YtDlpExtractor::from_config(&limits));
    let store: Arc<dyn SessionStore> = Arc::new(JsonFileStore::open(config::DATA_FILE.clone()));
    let charts = Arc::new(ChartsCache::load(config::CHARTS_FILE.clone()));

    let search = SearchService::from_config(Arc::clone(&extractor));
    let discovery = Arc::new(Discovery::new(search, charts));
    let orchestrator = Arc::new(DownloadOrchestrator::new(extractor, Arc::clone(&store), limits));
    let rate_limiter = Arc::new(RateLimiter::new(config::rate_limit::duration()));

    if let Some(port) = *config::HEALTH_PORT {
        tokio::spawn(async move {
            if let Err(e) = start_health_server(port).await {
                log::error!("❌ Health server stopped: {}", e);
            }
        });
    }

    let bot = create_bot(&config::BOT_TOKEN)?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("⚠️ Failed to register bot commands: {}", e);
    }

    let deps = HandlerDeps::new(
        Arc::clone(&store),
        orchestrator,
        discovery,
        rate_limiter,
        config::ADMIN_IDS.clone(),
        vec![config::DATA_FILE.clone(), config::CHARTS_FILE.clone()],
    );

    log::info!("🚀 Bot started");
    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .error_handler(LoggingErrorHandler::with_custom_text("An error from the dispatcher"))
        .build()
        .dispatch()
        .await;

    if let Err(e) = store.flush() {
        log::error!("❌ Failed to save sessions on shutdown: {}", e);
    }
    log::info!("👋 Bot stopped");
    Ok(())
}
