use clap::Parser;
use http_fetch::{HttpFetcherConfig, HttpPageFetcher};
use serde::Serialize;
use shared::config::{Config, StoreBackend};
use std::sync::Arc;
use storage_engine::{MokaStore, RedisStore};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;
use webcache::{CachingFetcher, FetchEvent, KeyValueStore};

/// Fetch pages through a shared cache, counting every request.
#[derive(Parser, Debug)]
#[command(name = "webcache", version)]
struct Args {
    /// URLs to fetch
    #[arg(required = true)]
    urls: Vec<String>,

    /// Fetch every URL this many times
    #[arg(short, long, default_value_t = 1)]
    repeat: u32,

    /// Print the request count after each fetch
    #[arg(short, long)]
    count: bool,

    /// Print one JSON report per fetch instead of the page body
    #[arg(long)]
    json: bool,

    /// Print cache events (hit, stored, failed) to stderr
    #[arg(long)]
    events: bool,
}

#[derive(Serialize)]
struct FetchReport<'a> {
    url: &'a str,
    attempt: u32,
    count: i64,
    bytes: usize,
    body: &'a str,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing; stdout is reserved for page output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load environment variables
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();

    info!(
        "Using {} store ({}), result TTL {}s",
        config.store.name(),
        if config.store.is_remote() { "shared" } else { "process-local" },
        config.result_ttl.as_secs()
    );
    let store: Arc<dyn KeyValueStore> = match &config.store {
        StoreBackend::Memory => Arc::new(MokaStore::default()),
        StoreBackend::Redis(url) => Arc::new(RedisStore::connect(url).await?),
    };

    let http = Arc::new(HttpPageFetcher::with_config(HttpFetcherConfig::from(&config))?);

    let (event_tx, mut event_rx) = broadcast::channel::<FetchEvent>(64);
    let mut fetcher = CachingFetcher::new(store, http).with_ttl(config.result_ttl);
    if args.events {
        fetcher = fetcher.with_event_broadcaster(event_tx);
    }

    for url in &args.urls {
        for attempt in 1..=args.repeat {
            let page = fetcher.fetch(url).await?;

            while let Ok(event) = event_rx.try_recv() {
                eprintln!("{}", serde_json::to_string(&event)?);
            }

            if args.json {
                let report = FetchReport {
                    url,
                    attempt,
                    count: fetcher.request_count(url).await?,
                    bytes: page.len(),
                    body: &page,
                };
                println!("{}", serde_json::to_string(&report)?);
                continue;
            }

            println!("{}", page);
            if args.count {
                println!("count:{} = {}", url, fetcher.request_count(url).await?);
            }
        }
    }

    Ok(())
}
