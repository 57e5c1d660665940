mod run;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "scout-cli")]
#[command(about = "Discover social media creators by keyword")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a discovery job and print creators as JSON lines
    Run(run::RunArgs),
    /// List platforms enabled in the current configuration
    Platforms,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = scout_core::load_app_config()?;
    // Logs go to stderr so stdout stays machine-readable.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Run(args)) => run::run_job(&config, args).await,
        Some(Commands::Platforms) => {
            for platform in &config.enabled_platforms {
                println!("{platform}");
            }
            Ok(())
        }
        None => {
            println!("scout-cli: use `run` to start a discovery job or `platforms` to list platforms");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;
