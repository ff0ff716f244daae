use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use log::{error, info};
use mrate_client::observability::LogMetrics;
use mrate_client::omdb::{Movie, OmdbClient};
use mrate_client::store::FileStore;
use mrate_client::views::{
    ListQuery, MovieOption, SortKey, SortOrder, WatchedFilter, WatchlistState, Wheel,
};
use mrate_client::{
    ApiClient, ClientConfig, FetchStrategy, MovieService, ResponseCache, RouteGuard, Session,
};

const DEFAULT_CACHE_FILE: &str = "mrate-cache.json";

#[derive(Debug, Parser)]
#[command(name = "mrate")]
#[command(about = "M-Rate client: cached OMDb lookups, session checks and watchlists", long_about = None)]
struct Cli {
    /// Cache file (overrides MRATE_CACHE_FILE)
    #[arg(long, global = true)]
    cache_file: Option<PathBuf>,

    /// Session token for backend calls
    #[arg(long, global = true, env = "MRATE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search movies by title
    Search {
        query: String,
        /// Skip the cache and hit the API
        #[arg(long)]
        force: bool,
    },
    /// Show one movie by IMDb id
    Movie {
        imdb_id: String,
        #[arg(long)]
        force: bool,
    },
    /// Evaluate the route guard for a path
    Guard { path: String },
    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Build or spin a movie wheel
    Wheel {
        #[command(subcommand)]
        action: WheelAction,
    },
    /// Sign in and print the session cookie
    Login { username: String, password: String },
    /// List the signed-in user's watchlist
    Watchlist {
        /// Match title, director or cast
        #[arg(long, default_value = "")]
        filter: String,
        #[arg(long, value_enum, default_value_t = WatchedArg::All)]
        watched: WatchedArg,
        #[arg(long, value_enum, default_value_t = SortArg::DateAdded)]
        sort: SortArg,
        /// Ascending order (default is descending)
        #[arg(long)]
        asc: bool,
    },
}

#[derive(Debug, Subcommand)]
enum CacheAction {
    /// Remove every cached response
    Clear,
    /// Remove expired responses only
    Purge,
    /// Show entry count and size
    Stats,
}

#[derive(Debug, Subcommand)]
enum WheelAction {
    /// Encode Name=imdbId pairs into a wheel URL
    Encode {
        #[arg(required = true, num_args = 2..)]
        options: Vec<String>,
    },
    /// Spin a wheel from a query string such as "?options=Up=tt1049413,..."
    Spin { query: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WatchedArg {
    All,
    Watched,
    Unwatched,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    DateAdded,
    Title,
    Year,
}

type Movies = MovieService<FileStore, OmdbClient>;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let args = Cli::parse();
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    if let Err(err) = run(args, config).await {
        error!("Error: {}", err);
        process::exit(1);
    }
}

async fn run(args: Cli, config: ClientConfig) -> mrate_client::Result<()> {
    let session = args
        .token
        .as_deref()
        .map(Session::with_token)
        .unwrap_or_default();

    match args.command {
        Commands::Search { query, force } => {
            let movies = movie_service(&config, args.cache_file).await?;
            let results = movies
                .search_movies(&query, FetchStrategy::from(force))
                .await?;
            if !results.is_success() {
                println!(
                    "{}",
                    results.error.as_deref().unwrap_or("No movies found")
                );
                return Ok(());
            }
            println!("{} result(s)", results.total());
            for hit in &results.hits {
                println!(
                    "  {}  {} ({})",
                    hit.imdb_id,
                    hit.title,
                    hit.year.as_deref().unwrap_or("?")
                );
            }
        }
        Commands::Movie { imdb_id, force } => {
            let movies = movie_service(&config, args.cache_file).await?;
            let movie = movies
                .fetch_movie_by_id(&imdb_id, FetchStrategy::from(force))
                .await?;
            print_movie(&movie);
        }
        Commands::Guard { path } => {
            let outcome = RouteGuard::new().evaluate(&path, session.token().as_deref());
            println!("{}", outcome);
            if let Some(cookie) = outcome.set_cookie_header() {
                println!("Set-Cookie: {}", cookie);
            }
        }
        Commands::Cache { action } => {
            let movies = movie_service(&config, args.cache_file).await?;
            let removed = match action {
                CacheAction::Clear => movies.clear_cache().await,
                CacheAction::Purge => movies.purge_expired().await,
                CacheAction::Stats => {
                    let stats = movies.cache().store().stats();
                    println!(
                        "{}: {} entries, {} bytes",
                        movies.cache().store().path().display(),
                        stats.total_entries,
                        stats.total_bytes
                    );
                    return Ok(());
                }
            };
            println!("Removed {} cached response(s)", removed);
        }
        Commands::Wheel { action } => match action {
            WheelAction::Encode { options } => {
                let selection = options
                    .iter()
                    .map(|pair| match pair.split_once('=') {
                        Some((name, id)) => Ok(MovieOption::new(name, id)),
                        None => Err(mrate_client::Error::ValidationError(format!(
                            "Expected Name=imdbId, got {:?}",
                            pair
                        ))),
                    })
                    .collect::<mrate_client::Result<Vec<_>>>()?;
                println!("{}", mrate_client::views::wheel_url(&selection)?);
            }
            WheelAction::Spin { query } => {
                let wheel = Wheel::from_query(&query);
                println!("Segments: {}", wheel.labels().join(" | "));
                let Some(index) = wheel.spin() else {
                    return Ok(());
                };
                match wheel.winner(index) {
                    Some(option) => println!("Winner: {} ({})", option.name, option.imdb_id),
                    None => println!("Landed on: {}", wheel.labels()[index]),
                }
            }
        },
        Commands::Login { username, password } => {
            let api = ApiClient::from_config(&config, session)?;
            api.authenticate(&username, &password).await?;
            if let Some(cookie) = api.session().set_cookie_header() {
                println!("Set-Cookie: {}", cookie);
            }
        }
        Commands::Watchlist {
            filter,
            watched,
            sort,
            asc,
        } => {
            let api = ApiClient::from_config(&config, session)?;
            let movies = movie_service(&config, args.cache_file).await?;
            let state = WatchlistState::hydrate(api.full_watchlist().await?, &movies).await;

            let query = ListQuery::new()
                .with_text(filter)
                .with_watched(match watched {
                    WatchedArg::All => WatchedFilter::All,
                    WatchedArg::Watched => WatchedFilter::Watched,
                    WatchedArg::Unwatched => WatchedFilter::Unwatched,
                })
                .sorted_by(
                    match sort {
                        SortArg::DateAdded => SortKey::DateAdded,
                        SortArg::Title => SortKey::Title,
                        SortArg::Year => SortKey::Year,
                    },
                    if asc { SortOrder::Asc } else { SortOrder::Desc },
                );

            let stats = state.stats();
            println!(
                "{} movie(s), {} watched ({}%)",
                stats.total, stats.watched, stats.watched_percentage
            );
            for item in state.view(&query) {
                println!(
                    "  [{}] {}  {} ({})",
                    if item.entry.watched { "x" } else { " " },
                    item.movie.imdb_id,
                    item.movie.title,
                    item.movie.year.as_deref().unwrap_or("?")
                );
            }
        }
    }
    Ok(())
}

async fn movie_service(config: &ClientConfig, cache_file: Option<PathBuf>) -> mrate_client::Result<Movies> {
    let path = cache_file
        .or_else(|| config.cache_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE));
    info!("Using cache file {}", path.display());

    let store = FileStore::open(&path).await?;
    let source = OmdbClient::builder(
        config.omdb_api_key.clone(),
        config.omdb_base_url.clone(),
        config.http_timeout,
    )?;
    let cache = ResponseCache::new(store).with_metrics(Box::new(LogMetrics));
    Ok(MovieService::with_cache(cache, source))
}

fn print_movie(movie: &Movie) {
    println!(
        "{} ({})",
        movie.title,
        movie.year.as_deref().unwrap_or("?")
    );
    if let Some(director) = &movie.director {
        println!("Director: {}", director);
    }
    if let Some(actors) = &movie.actors {
        println!("Cast: {}", actors);
    }
    if let Some(score) = movie.imdb_score() {
        println!("IMDb: {:.1}", score);
    }
    if let Some(plot) = &movie.plot {
        println!("\n{}", plot);
    }
}
