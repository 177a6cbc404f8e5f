//! sdk-runner CLI binary entry point.

use clap::Parser;
use sdk_runner::cli::{replay, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Replay(args) => {
            let config = replay::load_config(cli.config.as_deref())?;
            let result = replay::handle_replay(args, config).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.is_error() {
                std::process::exit(2);
            }
        }
        Commands::Classify(args) => {
            for (line, category) in replay::handle_classify(&args)? {
                println!("{line}\t{category}");
            }
        }
    }
    Ok(())
}
