use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use writeaid::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing - only show logs with --verbose
    let filter = if cli.verbose {
        EnvFilter::new("writeaid=debug")
    } else {
        EnvFilter::new("writeaid=warn")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run(args) => cli::run::execute(args).await?,
        Commands::Split(args) => cli::split::execute(args)?,
        Commands::Schema => cli::schema::execute()?,
    }

    Ok(())
}
