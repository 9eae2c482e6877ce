pub mod run;
pub mod schema;
pub mod split;

use crate::request::Dispatch;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "writeaid")]
#[command(
    author,
    version,
    about = "Sentence-by-sentence paragraph revision orchestrator"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Revise a paragraph through the remote analysis service
    Run(RunArgs),

    /// Split a paragraph into sentences, no remote calls
    Split(SplitArgs),

    /// Print JSON Schema for config validation
    Schema,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// Path to config file
    #[arg(short, long, default_value = "writeaid.yaml")]
    pub config: PathBuf,

    /// Paragraph text to revise
    #[arg(long, conflicts_with = "request_file")]
    pub paragraph: Option<String>,

    /// JSON file holding a full revision request
    #[arg(long)]
    pub request_file: Option<PathBuf>,

    /// How sentences are routed through the remote service
    #[arg(long, value_enum, default_value_t = Dispatch::Sequential)]
    pub dispatch: Dispatch,

    /// Visitation order within a round: first-to-last or last-to-first
    #[arg(long)]
    pub direction: Option<String>,

    /// Reprocessing passes after the initial one (0 or 1)
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Persona for the initial pass
    #[arg(long)]
    pub initial_persona: Option<String>,

    /// Persona for reprocessing passes
    #[arg(long)]
    pub reprocessing_persona: Option<String>,

    /// Override max concurrent workers (parallel dispatch)
    #[arg(long)]
    pub worker_cap: Option<usize>,

    /// Override the wall-clock budget ceiling in seconds
    #[arg(long)]
    pub budget_sec: Option<u64>,

    /// Override output directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Print the full response document as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Clone)]
pub struct SplitArgs {
    /// Paragraph to segment (reads stdin when omitted)
    pub paragraph: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}
