//! Command-line interface for Cinetrend.

mod commands;

use clap::{Parser, Subcommand};

/// Cinetrend - movie discovery with trending searches
#[derive(Parser)]
#[command(name = "cinetrend")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    #[command(alias = "daemon")]
    Serve,

    /// Search movies and record the search
    #[command(alias = "s")]
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// List popular movies
    Discover,

    /// Show the most searched queries
    #[command(alias = "t")]
    Trending {
        /// Number of entries to show
        #[arg(long, short)]
        limit: Option<u64>,
    },

    /// Show keywords, trailer and watch providers for a movie
    #[command(alias = "m")]
    Movie {
        /// TMDB movie ID
        id: i64,
        /// Watch provider region (ISO 3166-1 code)
        #[arg(long)]
        region: Option<String>,
    },

    /// Interactive search: type queries, results follow after a pause
    Browse,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
