//! Potato Blight CLI
//!
//! Runs the leaf decision pipeline on local images, screens images with the
//! green gate only, and writes configuration files.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{debug, info};

use potato_blight::backend::{backend_name, default_device, InferenceBackend};
use potato_blight::preprocess::{decode_image, green_ratio, has_supported_extension};
use potato_blight::utils::logging::{init_logging, LogConfig};
use potato_blight::utils::{format_millis, format_percent};
use potato_blight::{BlightNetConfig, BurnClassifier, Decision, LeafPipeline, PipelineConfig};

/// Potato leaf blight classification
///
/// Rejects images that do not look like a leaf, then averages a CNN's
/// predictions over several centered zoom crops.
#[derive(Parser, Debug)]
#[command(name = "potato_blight")]
#[command(author = "Warre Snaet")]
#[command(version = "0.1.0")]
#[command(about = "Potato leaf blight classification with Burn", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error); overrides --verbose
    #[arg(long, global = true, env = "POTATO_BLIGHT_LOG")]
    log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a single image or every image in a directory
    Predict {
        /// Path to input image or directory
        #[arg(short, long)]
        input: PathBuf,

        /// Path to trained BlightNet weights
        #[arg(short, long, env = "POTATO_BLIGHT_MODEL")]
        model: PathBuf,

        /// Pipeline configuration (TOML)
        #[arg(short, long, env = "POTATO_BLIGHT_CONFIG")]
        config: Option<PathBuf>,

        /// Print one JSON record per image instead of a summary
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Report the green ratio of images without running the model
    Screen {
        /// Path to input image or directory
        #[arg(short, long)]
        input: PathBuf,

        /// Pipeline configuration (TOML)
        #[arg(short, long, env = "POTATO_BLIGHT_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Write the default pipeline configuration to a TOML file
    InitConfig {
        /// Output file path
        #[arg(short, long, default_value = "potato_blight.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_flags(cli.verbose, cli.log_level.as_deref(), true);
    init_logging(&log_config).map_err(anyhow::Error::msg)?;
    debug!("Log level: {}", log_config.level);

    match cli.command {
        Commands::Predict {
            input,
            model,
            config,
            json,
        } => cmd_predict(&input, &model, config.as_deref(), json),

        Commands::Screen { input, config } => cmd_screen(&input, config.as_deref()),

        Commands::InitConfig { output } => cmd_init_config(&output),
    }
}

/// A single file, or the supported images directly inside a directory
fn collect_images(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        bail!("Input path not found: {}", input.display());
    }

    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(input)
        .with_context(|| format!("Failed to read directory {}", input.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_supported_extension(p))
        .collect();
    files.sort();

    if files.is_empty() {
        bail!("No supported images found in {}", input.display());
    }

    Ok(files)
}

fn load_image(path: &Path) -> Result<image::DynamicImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    decode_image(&bytes).with_context(|| format!("Failed to decode {}", path.display()))
}

fn cmd_predict(input: &Path, model: &Path, config: Option<&Path>, json: bool) -> Result<()> {
    let config = PipelineConfig::load_or_default(config)?;
    let files = collect_images(input)?;

    info!("Running prediction");
    info!("  Input: {}", input.display());
    info!("  Model: {}", model.display());
    info!("  Images: {}", files.len());

    if !json {
        println!("{}", "Prediction Configuration:".cyan().bold());
        println!("  Input:   {}", input.display());
        println!("  Model:   {}", model.display());
        println!("  Backend: {}", backend_name());
        println!(
            "  Gates:   green >= {}, confidence >= {}, healthy >= {}",
            config.min_green_ratio, config.not_leaf_threshold, config.healthy_class_threshold
        );
        println!();
        println!("{}", "Loading model...".cyan());
    }

    let net_config = BlightNetConfig::new().with_input_size(config.target_size as usize);
    let classifier =
        BurnClassifier::<InferenceBackend>::load(model, &net_config, default_device())?;
    let pipeline = LeafPipeline::new(config, Box::new(classifier))?;

    let mut failures = 0usize;
    for path in &files {
        let start = Instant::now();
        let result = load_image(path).and_then(|img| Ok(pipeline.run(&img)?));
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(decision) if json => {
                let record = serde_json::json!({
                    "image": path.display().to_string(),
                    "result": decision,
                });
                println!("{}", record);
            }
            Ok(decision) => print_decision(path, &decision, elapsed_ms),
            Err(e) => {
                failures += 1;
                eprintln!("{} {}: {:#}", "Error:".red(), path.display(), e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} images failed", failures, files.len());
    }

    Ok(())
}

fn print_decision(path: &Path, decision: &Decision, elapsed_ms: f64) {
    println!("{}", path.display().to_string().bold());

    match decision {
        Decision::Diagnosed(d) => {
            let label = if d.label.is_disease() {
                d.label.readable().red().bold()
            } else {
                d.label.readable().green().bold()
            };
            println!("  Prediction: {} ({})", label, d.label.key());
            println!("  Confidence: {}", format_percent(d.confidence as f64));
            if d.overridden() {
                println!(
                    "  {} model top class was {} below the healthy threshold",
                    "Note:".yellow(),
                    d.raw_top_class.readable()
                );
            }
        }
        rejected => {
            println!("  Prediction: {}", "Not a leaf".yellow().bold());
            if let Some(message) = rejected.message() {
                println!("  Reason:     {}", message);
            }
            if let Some(confidence) = rejected.confidence() {
                println!("  Confidence: {}", format_percent(confidence as f64));
            }
        }
    }

    println!("  Green:      {}", format_percent(decision.green_ratio()));
    println!("  Time:       {}", format_millis(elapsed_ms));
    println!();
}

fn cmd_screen(input: &Path, config: Option<&Path>) -> Result<()> {
    let config = PipelineConfig::load_or_default(config)?;
    let files = collect_images(input)?;

    println!(
        "{} (minimum {})",
        "Green content screening".cyan().bold(),
        format_percent(config.min_green_ratio)
    );
    println!();

    let mut passed = 0usize;
    for path in &files {
        let ratio = match load_image(path) {
            Ok(img) => green_ratio(&img),
            Err(e) => {
                eprintln!("{} {}: {:#}", "Error:".red(), path.display(), e);
                continue;
            }
        };

        let verdict = if ratio < config.min_green_ratio {
            "not_leaf".yellow()
        } else {
            passed += 1;
            "pass".green()
        };
        println!("  {:>8}  {:<8}  {}", format_percent(ratio), verdict, path.display());
    }

    println!();
    println!("{}/{} images passed the green gate", passed, files.len());
    Ok(())
}

fn cmd_init_config(output: &Path) -> Result<()> {
    if output.exists() {
        bail!("Refusing to overwrite existing file {}", output.display());
    }

    PipelineConfig::default().save(output)?;
    println!("{} {}", "Wrote default configuration to".green(), output.display());
    Ok(())
}
