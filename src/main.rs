//! Playlist Keeper - a local playlist and track library.
//!
//! Tracks (streamed or local files) and playlists live in a single SQLite
//! database. Liked Songs is an ordinary playlist with a reserved title.
//! Everything is driven from the command line; running without a
//! subcommand lists the library.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod metadata;
pub mod model;
pub mod scanner;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_DIRECTIVE: &str = "playlist_keeper=info";

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    let directive: Directive = DEFAULT_LOG_DIRECTIVE.parse()?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(directive))
        .init();

    let config = config::load();
    cli::run_command(&args, &config)
}
