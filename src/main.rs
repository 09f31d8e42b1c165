use clap::Parser;
use songrec_api::RestApi;
use songrec_core::RecommenderConfig;
use songrec_storage::ArtifactStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Song recommendations over precomputed similarity and latent-factor artifacts
#[derive(Parser, Debug)]
#[command(name = "songrec")]
#[command(about = "A small song recommendation service", long_about = None)]
struct Args {
    /// Directory holding songs.csv, similarity.bin and (optionally) affinity.bin
    #[arg(short, long, default_value = "./models")]
    models_dir: PathBuf,

    /// Address to bind the HTTP API to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, default_value_t = 5000)]
    http_port: u16,

    /// Number of songs returned per request
    #[arg(long, default_value_t = songrec_core::DEFAULT_TOP_K)]
    top_k: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting SongRec v{}", env!("CARGO_PKG_VERSION"));
    info!("Models directory: {:?}", args.models_dir);

    let artifacts = ArtifactStore::new(&args.models_dir)?.load()?;
    let recommender = Arc::new(artifacts.into_recommender(RecommenderConfig { top_k: args.top_k })?);
    info!(
        "Recommender ready: {} songs, top_k={}, collaborative={}",
        recommender.catalog().distinct_count(),
        recommender.config().top_k,
        recommender.affinity_available()
    );

    let host = args.host.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", host, http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(recommender, &host, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://{}:{}/", args.host, args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
