//! CLI argument parsing for wayfinder

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wf")]
#[command(author, version, about = "Conversational trip planner", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive planning chat (the default)
    Chat,

    /// List itineraries saved in the durable store
    Plans,

    /// Show one saved itinerary
    Show {
        /// Plan ID, e.g. plan-1724380000000
        #[arg(required = true)]
        plan_id: String,
    },
}
