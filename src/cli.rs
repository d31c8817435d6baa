use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cloudtune")]
#[command(author, version, about = "Telegram bot that finds SoundCloud tracks and sends them as audio", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Search SoundCloud from the terminal and print the cleaned results
    Search {
        /// Free-text query
        query: String,

        /// Maximum number of results to print
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Show what yt-dlp reports for a track URL without downloading it
    Probe {
        /// SoundCloud track URL
        url: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["cloudtune"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_search_subcommand() {
        let cli = Cli::try_parse_from(["cloudtune", "search", "lo-fi beats", "-l", "3"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Search {
                query: "lo-fi beats".to_string(),
                limit: 3
            })
        );
    }

    #[test]
    fn test_probe_requires_url() {
        assert!(Cli::try_parse_from(["cloudtune", "probe"]).is_err());
    }
}
