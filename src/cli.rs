use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reelcache")]
#[command(author, version, about = "Movie metadata resolution and caching engine")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a movie and print its cached record
    Lookup {
        /// Movie title
        #[arg(long)]
        title: Option<String>,

        /// Release year
        #[arg(long)]
        year: Option<i32>,

        /// Provider id of the desired movie
        #[arg(long)]
        id: Option<i64>,

        /// Imdb id (with or without the tt prefix)
        #[arg(long)]
        imdb_id: Option<String>,

        /// Free-text guess to clean and parse into title and year
        #[arg(long)]
        guess: Option<String>,

        /// Never go online; fail if the movie is not cached
        #[arg(long)]
        cached_only: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Enumerate a curated provider list (e.g. "dvds" "new releases")
    List {
        /// List type segment
        list_type: String,

        /// List name segment
        list_name: String,

        /// Country code
        #[arg(long, default_value = "us")]
        country: String,

        /// Maximum number of movies to return
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Apply pending cache schema migrations and exit
    Migrate,

    /// Display version information
    Version,
}
