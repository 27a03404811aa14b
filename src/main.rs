use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter};

use aka_timestamps::api::ApiServer;
use aka_timestamps::{processing, Config, MetadataFetcher, ResultsStore, YoutubeDl};

#[derive(Parser)]
#[command(name = "aka-timestamps")]
#[command(author = "TigreRoll")]
#[command(version)]
#[command(about = "Locate description questions in episode subtitles")]
struct Cli {
    /// Configuration file (defaults to aka-timestamps.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, analyze and serve results over HTTP
    Serve,

    /// Align one subtitle file against one description
    Analyze {
        /// WebVTT subtitle file
        #[arg(short, long)]
        transcript: PathBuf,

        /// Episode description file
        #[arg(short, long)]
        description: PathBuf,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze every episode in the metadata directory without fetching
    Scan {
        /// Metadata directory, overrides configuration
        #[arg(short, long)]
        meta_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging before the config is read so its messages are visible
    let (filter, filter_handle) = reload::Layer::new(log_filter(cli.verbose, None));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    filter_handle.reload(log_filter(cli.verbose, Some(&config.logging.level)))?;

    if cli.verbose {
        info!("Verbose logging enabled");
    }

    config.validate()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Analyze {
            transcript,
            description,
            json,
        } => analyze_files(transcript, description, json).await,
        Commands::Scan { meta_dir } => scan(config, meta_dir).await,
    }
}

/// RUST_LOG wins, then `--verbose`, then the configured level
fn log_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    if verbose {
        return EnvFilter::new("aka_timestamps=debug,tower_http=debug,info");
    }
    EnvFilter::new(level.unwrap_or("aka_timestamps=info,warn"))
}

async fn serve(config: Config) -> Result<()> {
    info!("🚀 AKA question timestamps starting...");
    for line in config.summary().lines() {
        info!("{}", line);
    }

    let meta_dir = config.fetch.meta_dir.clone();
    let fetch_on_startup = !meta_dir.exists();
    if fetch_on_startup {
        info!("📁 Creating metadata directory {}", meta_dir.display());
        tokio::fs::create_dir_all(&meta_dir).await?;
    }

    let config = Arc::new(config);
    let store = ResultsStore::new();
    let fetcher: Arc<dyn MetadataFetcher> = Arc::new(YoutubeDl::new(&config.fetch));

    {
        let config = Arc::clone(&config);
        let store = store.clone();
        let fetcher = Arc::clone(&fetcher);
        tokio::spawn(async move {
            let _guard = store.begin_fetch().await;
            let outcome = if fetch_on_startup {
                processing::refresh(fetcher.as_ref(), true, &config.fetch.meta_dir, &config.episodes, &store).await
            } else {
                processing::analyze_episodes(&config.fetch.meta_dir, &config.episodes, &store).await
            };

            if let Err(e) = outcome {
                error!("Startup analysis failed: {}", e);
            }
        });
    }

    ApiServer::new(store, config, fetcher).start().await
}

async fn analyze_files(transcript: PathBuf, description: PathBuf, json: bool) -> Result<()> {
    let start_time = std::time::Instant::now();
    let alignment = processing::analyze(&transcript, &description).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&alignment)?);
        return Ok(());
    }

    for result in &alignment.timestamps {
        let Some(question) = alignment.questions.get(result.question_index) else {
            continue;
        };
        let at = if result.found { result.at_str.as_str() } else { "--:--" };
        println!("{:>8}  {}", at, question.short);
    }

    info!(
        "🎉 {} of {} questions located in {:.2}s",
        alignment.located_questions(),
        alignment.questions.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

async fn scan(mut config: Config, meta_dir: Option<PathBuf>) -> Result<()> {
    if let Some(dir) = meta_dir {
        config.fetch.meta_dir = dir;
    }

    if !config.fetch.meta_dir.is_dir() {
        warn!("Metadata directory does not exist: {}", config.fetch.meta_dir.display());
        return Err(anyhow::anyhow!("Metadata directory not found"));
    }

    let store = ResultsStore::new();
    let summary = processing::analyze_episodes(&config.fetch.meta_dir, &config.episodes, &store).await?;

    info!("✅ Episodes: {}", summary.episodes);
    info!("📊 Newly analyzed: {}", summary.analyzed);
    info!("❌ Failed: {}", summary.failed);

    Ok(())
}
