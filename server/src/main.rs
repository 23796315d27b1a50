//! Potato Blight Server
//!
//! Loads the classifier once, then serves leaf diagnoses over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use potato_blight::backend::{default_device, InferenceBackend};
use potato_blight::utils::logging::{init_logging, LogConfig};
use potato_blight::{BlightNetConfig, BurnClassifier, LeafPipeline, PipelineConfig};
use potato_blight_server::{build_router, AppState, ServerConfig};

/// Potato Blight Server
#[derive(Parser, Debug)]
#[command(name = "potato-blight-server")]
#[command(author = "Warre Snaet")]
#[command(version = "0.1.0")]
#[command(about = "HTTP API for potato leaf blight classification")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Trained model weights (.mpk)
    #[arg(short, long, env = "POTATO_BLIGHT_MODEL")]
    model: PathBuf,

    /// Pipeline config (TOML); built-in thresholds when omitted
    #[arg(short, long, env = "POTATO_BLIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum upload size in megabytes
    #[arg(long, default_value = "10")]
    max_upload_mb: usize,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error); overrides --verbose
    #[arg(long, env = "POTATO_BLIGHT_LOG")]
    log_level: Option<String>,

    /// Plain log output without ANSI colors, for log collectors
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_flags(cli.verbose, cli.log_level.as_deref(), !cli.no_color);
    init_logging(&log_config).map_err(anyhow::Error::msg)?;

    let pipeline_config = PipelineConfig::load_or_default(cli.config.as_deref())?;
    let config = ServerConfig {
        max_upload_bytes: cli.max_upload_mb * 1024 * 1024,
        ..ServerConfig::default()
    };

    info!("Potato Blight Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Model:        {:?}", cli.model);
    info!("  Backend:      {}", config.backend);
    info!("  Log level:    {}", log_config.level);
    info!("  Max upload:   {} bytes", config.max_upload_bytes);
    info!("  Not-leaf:     {}", pipeline_config.not_leaf_threshold);
    info!("  Healthy min:  {}", pipeline_config.healthy_class_threshold);
    info!("  Green min:    {}", pipeline_config.min_green_ratio);
    info!("  Zoom factors: {:?}", pipeline_config.zoom_factors);

    let net_config = BlightNetConfig::new().with_input_size(pipeline_config.target_size as usize);
    let classifier =
        BurnClassifier::<InferenceBackend>::load(&cli.model, &net_config, default_device())?;
    let pipeline = LeafPipeline::new(pipeline_config, Box::new(classifier))?;

    let app = build_router(AppState::new(config, pipeline));

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
