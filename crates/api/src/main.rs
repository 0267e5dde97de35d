//! AdPublish - campaign publish orchestration CLI
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use std::path::PathBuf;

use adpublish_app::commands;
use adpublish_app::utils::logging::init_tracing;
use adpublish_app::AppContext;
use adpublish_infra::config;
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "adpublish", version, about = "Publish campaigns to the external ad platform")]
struct Cli {
    /// Path to a TOML or JSON config file (default: environment, then probed files)
    #[arg(long, env = "ADPUBLISH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create campaign, ad set and ads from the stored publish config
    Publish { campaign_id: String },
    /// Continue a failed publish from its last checkpoint
    ResumePublish { campaign_id: String },
    /// Pause a published campaign and all of its objects
    Pause { campaign_id: String },
    /// Reactivate a paused campaign and all of its objects
    Resume { campaign_id: String },
    /// Show the stored publish job
    Status { campaign_id: String },
    /// Check database and internal API connectivity
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal outside development.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let app_config = match &cli.config {
        Some(path) => config::load_from_file(Some(path.clone())),
        None => config::load(),
    }
    .context("failed to load configuration")?;

    init_tracing(&app_config.logging).map_err(anyhow::Error::msg)?;
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let ctx = AppContext::new(app_config).await.context("failed to initialise application")?;

    match cli.command {
        Command::Publish { campaign_id } => {
            print_json(&commands::publish_campaign(&ctx, &campaign_id).await?)
        }
        Command::ResumePublish { campaign_id } => {
            print_json(&commands::resume_publish(&ctx, &campaign_id).await?)
        }
        Command::Pause { campaign_id } => {
            print_json(&commands::pause_campaign(&ctx, &campaign_id).await?)
        }
        Command::Resume { campaign_id } => {
            print_json(&commands::resume_campaign(&ctx, &campaign_id).await?)
        }
        Command::Status { campaign_id } => {
            let view = commands::get_publish_status(&ctx, &campaign_id)
                .await?
                .with_context(|| format!("no publish job for campaign {campaign_id}"))?;
            print_json(&view)
        }
        Command::Health => {
            let status = ctx.health_check().await;
            print_json(&status)?;
            anyhow::ensure!(status.is_healthy, "one or more components are unhealthy");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
