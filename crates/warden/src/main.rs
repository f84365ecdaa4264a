//! # Warden - Rookery Verification Engine
//!
//! Forge tool for the challenge pipeline: generates one polynomial-derivative
//! problem, renders the obfuscated challenge image, and writes the PNG to
//! disk for manual inspection. The chat-platform host drives the same
//! library API in production.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use warden::captcha::{ChallengeRenderer, ProblemGenerator};
use warden::config::AppConfig;

/// Rookery Warden - challenge forge
#[derive(Parser, Debug)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/warden.toml")]
    config: String,

    /// Artwork directory (overrides config)
    #[arg(long, env = "ASSET_DIR")]
    asset_dir: Option<String>,

    /// Font file (overrides config)
    #[arg(long, env = "FONT_PATH")]
    font: Option<String>,

    /// Force a specific pattern identifier instead of a random one
    #[arg(short, long)]
    pattern: Option<String>,

    /// Where to write the rendered challenge
    #[arg(short, long, default_value = "challenge.png")]
    out: String,

    /// Also write challenge metadata (pattern, problem text) as JSON
    #[arg(long)]
    manifest: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_logging(&args.log_level, args.json_logs)?;

    info!("🐦 Warden challenge forge v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load(&args.config)?;
    if let Some(ref asset_dir) = args.asset_dir {
        config.asset_dir = asset_dir.clone();
    }
    if let Some(ref font) = args.font {
        config.font_path = font.clone();
    }

    let catalog = config.catalog().context("Invalid pattern catalog")?;
    info!(patterns = catalog.len(), "📋 Pattern catalog loaded");

    let generator = ProblemGenerator::new(catalog);
    let renderer = ChallengeRenderer::new(&config.asset_dir, &config.font_path);

    let mut problem = generator.generate(&mut rand::rng());
    if let Some(pattern_id) = args.pattern {
        let key = generator
            .catalog()
            .key_for(&pattern_id)
            .with_context(|| format!("Unknown pattern: {pattern_id}"))?;
        // Redraw until the forced pattern comes up
        while problem.pattern_id != pattern_id {
            problem = generator.generate(&mut rand::rng());
        }
        info!(pattern = %pattern_id, key, "Forced pattern");
    }

    let png = renderer
        .render(&problem.pattern_id, &problem.problem_text)
        .await
        .context("Failed to render challenge")?;

    tokio::fs::write(&args.out, &png)
        .await
        .with_context(|| format!("Failed to write {}", args.out))?;

    if let Some(ref manifest) = args.manifest {
        // The answer is skipped during serialization, so the manifest is
        // safe to hand to the host alongside the image
        let json = serde_json::to_string_pretty(&problem)?;
        tokio::fs::write(manifest, json)
            .await
            .with_context(|| format!("Failed to write {manifest}"))?;
    }

    info!(
        pattern = %problem.pattern_id,
        answer = problem.answer,
        bytes = png.len(),
        out = %args.out,
        "✅ Challenge forged"
    );

    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}
