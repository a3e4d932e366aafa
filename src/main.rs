mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

use reelcache::config;
use reelcache::lookup::{lookup_movie, LookupRequest};
use reelcache::provider::{MovieProvider, RottenTomatoesClient};
use reelcache_db::pool::init_pool;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelcache=trace,reelcache_db=debug,reelcache_common=debug".to_string()
        } else {
            "reelcache=info,reelcache_db=info".to_string()
        }
    });
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = config::load_config_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Lookup {
            title,
            year,
            id,
            imdb_id,
            guess,
            cached_only,
            json,
        } => {
            let pool = init_pool(&config.database.path)?;
            let provider = RottenTomatoesClient::new(&config.provider);

            let request = LookupRequest {
                title,
                year,
                provider_id: id,
                imdb_id,
                smart_match: guess,
                only_cached: cached_only,
            };

            let movie = lookup_movie(&pool, &provider, &request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&movie)?);
            } else {
                println!(
                    "{} ({}) [id {}]",
                    movie.title,
                    movie
                        .year
                        .map_or_else(|| "unknown".to_string(), |y| y.to_string()),
                    movie.id
                );
                if let Some(score) = movie.critics_score {
                    println!("  critics: {}% {}", score, movie.critics_rating.as_deref().unwrap_or(""));
                }
                if let Some(score) = movie.audience_score {
                    println!("  audience: {}% {}", score, movie.audience_rating.as_deref().unwrap_or(""));
                }
                if !movie.genres.is_empty() {
                    println!("  genres: {}", movie.genres.join(", "));
                }
                if !movie.directors.is_empty() {
                    println!("  directed by: {}", movie.directors.join(", "));
                }
            }
        }

        Commands::List {
            list_type,
            list_name,
            country,
            limit,
        } => {
            let provider = RottenTomatoesClient::new(&config.provider);
            let movies = provider
                .list(&list_type, &list_name, &country, limit, limit, None)
                .await;
            if movies.is_empty() {
                tracing::warn!("list returned no movies");
            }
            for movie in movies {
                println!(
                    "{} ({})",
                    movie.title.as_deref().unwrap_or("<untitled>"),
                    movie
                        .year
                        .map_or_else(|| "unknown".to_string(), |y| y.to_string()),
                );
            }
        }

        Commands::Migrate => {
            let pool = init_pool(&config.database.path)?;
            let conn = pool
                .get()
                .map_err(|e| anyhow::anyhow!("failed to get connection: {e}"))?;
            let version = reelcache_db::migrations::current_version(&conn)
                .map_err(|e| anyhow::anyhow!("migration check failed: {e}"))?;
            println!("cache schema at version {version}");
        }

        Commands::Version => {
            println!("reelcache {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
