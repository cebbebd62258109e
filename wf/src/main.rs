//! Wayfinder - conversational trip planner
//!
//! CLI entry point.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::info;

use wayfinder::cli::{Cli, Command};
use wayfinder::config::Config;
use wayfinder::{chat, Engine};

fn setup_logging(level: &str) -> Result<()> {
    // Log to a file so the chat stays clean on stdout
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wayfinder")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = fs::File::create(log_dir.join("wayfinder.log")).context("Failed to create log file")?;

    let level: tracing::Level = level.parse().unwrap_or(tracing::Level::INFO);

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Level precedence: CLI flag, then config file, then info
    let level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    setup_logging(&level).context("Failed to setup logging")?;

    info!(
        "Wayfinder loaded config: provider={}, model={}",
        config.llm.provider, config.llm.model
    );

    match cli.command {
        None | Some(Command::Chat) => chat::run_interactive(&config).await,
        Some(Command::Plans) => cmd_plans(&config).await,
        Some(Command::Show { plan_id }) => cmd_show(&config, &plan_id).await,
    }
}

/// List itineraries saved in the durable store
async fn cmd_plans(config: &Config) -> Result<()> {
    let engine = Engine::from_config(config)?;

    let plans = engine
        .reconciler()
        .list_plans()
        .await
        .map_err(|e| eyre::eyre!("Failed to list plans: {}", e))?;

    if plans.is_empty() {
        println!("No saved plans found.");
        if config.store.rest_url.is_none() {
            println!("{}", "No durable store is configured; plans only live for one session.".dimmed());
        }
        return Ok(());
    }

    for plan in plans {
        let id = plan.get("id").and_then(|v| v.as_str()).unwrap_or("?");
        let destination = plan.get("destination").and_then(|v| v.as_str()).unwrap_or("?");
        let duration = plan.get("duration").and_then(|v| v.as_str()).unwrap_or("?");
        println!("{}  {} ({})", id.cyan(), destination, duration.dimmed());
    }

    Ok(())
}

/// Show one saved itinerary
async fn cmd_show(config: &Config, plan_id: &str) -> Result<()> {
    let engine = Engine::from_config(config)?;

    let plan_id = wayfinder::itinerary::PlanId::from(plan_id);
    let itinerary = engine
        .reconciler()
        .load_itinerary(&plan_id)
        .await
        .map_err(|e| eyre::eyre!("Failed to load plan: {}", e))?;

    match itinerary {
        Some(itinerary) => {
            chat::render_itinerary(&itinerary);
            Ok(())
        }
        None => {
            println!("No plan found with id: {}", plan_id);
            Ok(())
        }
    }
}
