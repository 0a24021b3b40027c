//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show`, and `config init`.

use std::path::Path;

use clap::Subcommand;
use radarloop::config::{config_file_path, ConfigFile};

use crate::error::CliError;
use crate::runner::load_config;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective settings
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);

    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => run_show(&path, config_path),
        ConfigCommands::Init { force } => run_init(&path, force),
    }
}

fn run_show(path: &Path, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let session = config.to_session_config()?;

    if path.exists() {
        println!("Configuration: {}", path.display());
    } else {
        println!("Configuration: {} (not found, using defaults)", path.display());
    }
    println!();
    println!("[radar]");
    println!("  type            = {}", config.radar.radar_type);
    println!("  wms_url         = {}", session.source.wms_url);
    println!("  layer           = {}", session.source.layer);
    println!("  fallback_url    = {}", session.fallback_url);
    println!(
        "  placement_layer = {}",
        session.placement_layer.as_deref().unwrap_or("(top)")
    );
    println!("[frames]");
    println!("  max_frames      = {}", session.max_frames);
    println!("[refresh]");
    println!("  interval        = {}s", session.refresh_interval.as_secs());
    println!("[animation]");
    println!(
        "  frame interval  = {}ms (base {}ms x speed {})",
        (session.base_unit * session.speed).as_millis(),
        session.base_unit.as_millis(),
        session.speed
    );
    println!("[prefetch]");
    println!("  debounce        = {}ms", session.debounce.as_millis());
    println!("  viewport wait   = {}s", session.viewport_timeout.as_secs());
    println!("[cache]");
    println!("  enabled         = {}", config.cache.enabled);
    println!("  directory       = {}", config.cache.directory.display());
    println!("  volatile_prefix = {}", config.cache.volatile_prefix);
    println!("[download]");
    println!("  timeout         = {}s", config.download.timeout);
    println!("[logging]");
    println!("  file            = {}", config.logging.file.display());

    Ok(())
}

fn run_init(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        println!("Configuration already exists: {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    ConfigFile::default().save_to(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
