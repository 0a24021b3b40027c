//! radarloop CLI - Command-line interface
//!
//! Discovers radar frames, warms the frame cache, and runs a headless
//! animated session against the configured WMS service.

mod commands;
mod error;
mod headless;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::cache::CacheAction;
use commands::config::ConfigCommands;
use commands::frames::FramesArgs;
use commands::prefetch::PrefetchArgs;
use commands::run::RunArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "radarloop")]
#[command(version = radarloop::VERSION)]
#[command(about = "Animated WMS radar frames with a persistent frame cache", long_about = None)]
struct Cli {
    /// Use this config file instead of ~/.radarloop/config.ini
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the frames the WMS service currently advertises
    Frames(FramesArgs),

    /// Download every current frame for a viewport into the cache
    Prefetch(PrefetchArgs),

    /// Run an animated session until Ctrl-C
    Run(RunArgs),

    /// Inspect or clear the frame cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        e.exit();
    }
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Frames(args) => commands::frames::run(args, config_path, cli.debug).await,
        Commands::Prefetch(args) => commands::prefetch::run(args, config_path, cli.debug).await,
        Commands::Run(args) => commands::run::run(args, config_path, cli.debug).await,
        Commands::Cache { action } => commands::cache::run(action, config_path),
        Commands::Config { command } => commands::config::run(command, config_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "radarloop",
            "run",
            "--bbox",
            "-1e7,2e6,-8e6,6e6",
            "--width",
            "800",
            "--height",
            "600",
            "--speed",
            "2",
            "--play",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.viewport.width, 800);
        assert_eq!(args.speed, Some(2));
        assert!(args.play);
    }

    #[test]
    fn test_parse_cache_key_with_global_flags() {
        let cli = Cli::try_parse_from([
            "radarloop",
            "cache",
            "key",
            "https://example.com/ows?request=GetMap&_ts=1",
            "--config",
            "/tmp/radar.ini",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/radar.ini")));
        assert!(matches!(cli.command, Commands::Cache { action: CacheAction::Key { .. } }));
    }
}
