//! Command-line access to card links.
//!
//! ```bash
//! # Share a canned English message with a blessing
//! noorcard encode --sender "Ali" --message "May this Ramzan bring you peace..." --theme lantern-glow --blessing 2
//!
//! # Open a link, or just its fragment
//! noorcard decode "https://example.org/#Ali.eB052X"
//!
//! # Use dictionaries other than the built-in ones
//! noorcard decode "#Ali.eB052X" --dictionaries ./dictionaries.json
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use noorcard::{CardConfiguration, Dictionaries, Dictionary, Language, Theme};

#[derive(Parser)]
#[command(name = "noorcard")]
#[command(version)]
#[command(about = "Encode greeting cards into share links and open existing ones")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON file of dictionaries to use instead of the built-in ones
    #[arg(short, long, global = true)]
    dictionaries: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the share link of a card
    Encode {
        /// Name of the sender
        #[arg(short, long)]
        sender: String,
        /// Message text, canned or not
        #[arg(short, long)]
        message: String,
        /// Theme id, e.g. lantern-glow
        #[arg(short, long, default_value = "crescent-dream", value_parser = parse_theme)]
        theme: Theme,
        /// Index of the blessing to attach
        #[arg(short, long)]
        blessing: Option<usize>,
        /// Language id: en, ur, ru, ar, or hi
        #[arg(short, long, default_value = "en", value_parser = parse_language)]
        language: Language,
        /// Page the link points to
        #[arg(long, default_value = "https://example.org/")]
        base_url: String,
    },
    /// Print the card held by a link or fragment, as JSON
    Decode {
        /// A full link, or just its fragment
        link: String,
    },
}

fn parse_theme(id: &str) -> Result<Theme, String> {
    Theme::from_id(id).ok_or_else(|| format!("unknown theme {id:?}"))
}

fn parse_language(id: &str) -> Result<Language, String> {
    Language::from_id(id).ok_or_else(|| format!("unknown language {id:?}"))
}

fn warn_missing_blessing(dictionary: &Dictionary, blessing: Option<usize>) {
    if let Some(index) = blessing.filter(|&index| dictionary.blessing(index).is_none()) {
        tracing::warn!(index, "blessing is not in the dictionary and will be clamped when opened");
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let loaded;
    let dictionaries = match &cli.dictionaries {
        Some(path) => {
            loaded = Dictionaries::load_from_file(path)
                .with_context(|| format!("failed to load dictionaries from {}", path.display()))?;
            &loaded
        }
        None => Dictionaries::builtin(),
    };

    match cli.command {
        Commands::Encode { sender, message, theme, blessing, language, base_url } => {
            let card = CardConfiguration {
                sender,
                message,
                theme,
                blessing,
                language,
                ..Default::default()
            };
            match dictionaries.get(language) {
                None => tracing::warn!(language = language.id(), "no dictionary, message will be sent as custom text"),
                Some(dictionary) => warn_missing_blessing(dictionary, blessing),
            }

            println!("{}", noorcard::share_link(&base_url, &card, dictionaries)?);
        }

        Commands::Decode { link } => {
            let fragment = link
                .split_once('#')
                .map_or(link.as_str(), |(_, fragment)| fragment);

            let Some(card) = noorcard::open_fragment(fragment, dictionaries) else {
                bail!("no shared card in this link");
            };
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
    }

    Ok(())
}
