use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reelkey_parse::MediaKind;

#[derive(Parser)]
#[command(name = "reelkey")]
#[command(about = "Search movies and series on OMDb and open them in the embed player", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  reelkey config set-key 0123abcd\n  reelkey search Matrix\n  reelkey search Dark --type series\n  reelkey open tt0133093\n  reelkey page /title/tt5753856/ --page dark.html --click\n  reelkey overlay\n"
)]
pub struct Cli {
    /// Path to a config file (overrides the platform config directory)
    #[arg(long, global = true, env = "REELKEY_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// OMDb API key for this invocation only
    #[arg(long, global = true, env = "REELKEY_OMDB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Write logs to a daily rolling file in this directory instead of stderr
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print embed URLs instead of opening a browser
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search titles by name
    Search {
        query: String,

        /// Restrict to one kind (movie, series)
        #[arg(short = 't', long = "type")]
        kind: Option<MediaKind>,
    },

    /// Show the full record for one title
    Lookup {
        /// Title identifier (e.g. tt0133093)
        id: String,
    },

    /// Decide whether a title is a movie or a series
    Resolve {
        id: String,

        /// Saved title page to read og:type and JSON-LD from
        #[arg(long, value_name = "FILE")]
        page: Option<PathBuf>,
    },

    /// Open the embed player for a title
    Open {
        id: String,

        /// Skip resolution and open as this kind
        #[arg(short, long)]
        kind: Option<MediaKind>,
    },

    /// Run the watch-button injector against a page path
    Page {
        /// Page path, e.g. /title/tt0133093/
        path: String,

        /// Saved HTML of the page
        #[arg(long, value_name = "FILE")]
        page: Option<PathBuf>,

        /// Click the injected control
        #[arg(long)]
        click: bool,
    },

    /// Interactive search overlay on the terminal
    Overlay,

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration (the API key is masked)
    Show,
    /// Store the OMDb API key
    SetKey { key: String },
    /// Remove the stored OMDb API key
    ClearKey,
    /// Change the overlay shortcut, e.g. "Alt+Shift+K"; empty resets it
    SetShortcut { shortcut: String },
    /// Write the default config file if none exists
    Init,
}
