//! Bot initialization and the public command list

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "🚀 Start bot")]
    Start,
    #[command(description = "🔍 Search music")]
    Search(String),
    #[command(description = "📊 Top charts")]
    Charts,
    #[command(description = "🎲 Random track")]
    Random,
    #[command(description = "🎭 Mood playlists")]
    Mood,
    #[command(description = "🎯 Recommendations")]
    Recommendations,
    #[command(description = "⚙️ Settings")]
    Settings,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (invalid URL, client build failure)
pub fn create_bot(token: &str) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;

    let bot = if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        Bot::with_client(token, client).set_api_url(url)
    } else {
        Bot::with_client(token, client)
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_list() {
        let commands = Command::bot_commands();
        let names: Vec<&str> = commands.iter().map(|c| c.command.trim_start_matches('/')).collect();
        assert_eq!(
            names,
            vec!["start", "search", "charts", "random", "mood", "recommendations", "settings"]
        );
    }

    #[test]
    fn test_parse_search_with_query() {
        let cmd = Command::parse("/search daft punk", "cloudtune_bot").expect("valid command");
        assert_eq!(cmd, Command::Search("daft punk".to_string()));
    }
}
