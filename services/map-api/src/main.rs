//! World map rendering API server.

use anyhow::{Context, Result};
use clap::Parser;
use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use map_api::{build_router, metrics, AppState, MapApiConfig};

#[derive(Parser, Debug)]
#[command(name = "map-api")]
#[command(about = "Renders rotated world map views over HTTP")]
struct Args {
    /// Listen address
    #[arg(short, long, env = "MAP_API_LISTEN", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// World image path (overrides MAP_IMAGE_PATH)
    #[arg(long)]
    image: Option<PathBuf>,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long)]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    let worker_threads = args.worker_threads.or_else(|| {
        env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|s| s.parse().ok())
    });
    if let Some(threads) = worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    metrics::describe();

    info!("Prometheus metrics exporter initialized");
    info!("Starting map API server");

    let mut config = MapApiConfig::from_env()?;
    if let Some(image) = args.image {
        config.image_path = image;
    }

    // Decoding and downscaling a large world image takes a while.
    let state = tokio::task::spawn_blocking(move || AppState::new(config))
        .await?
        .context("Failed to load world image")?;
    let app = build_router(Arc::new(state), prometheus_handle);

    let addr: SocketAddr = args.listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
