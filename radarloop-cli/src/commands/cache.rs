//! Cache management CLI commands.

use std::path::Path;

use clap::Subcommand;
use radarloop::cache::{canonicalize, DiskFrameStore, FrameStore};

use crate::error::CliError;
use crate::runner::load_config;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Print the cache key a frame URL is stored under
    Key {
        /// Frame request URL
        url: String,
    },
    /// Show disk cache statistics
    Stats,
    /// Clear the disk cache, removing all cached frames
    Clear,
}

/// Run a cache subcommand.
pub fn run(action: CacheAction, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;

    match action {
        CacheAction::Key { url } => {
            println!("{}", canonicalize(&url, &config.cache.volatile_prefix));
            Ok(())
        }
        CacheAction::Stats => {
            let store = DiskFrameStore::new(&config.cache.directory)?;
            println!("Disk cache: {}", store.directory().display());
            if !config.cache.enabled {
                println!("  (disabled in config; sessions cache in memory only)");
            }
            println!("  Frames: {}", store.len());
            println!("  Size:   {}", format_bytes(store.size_bytes()));
            Ok(())
        }
        CacheAction::Clear => {
            let store = DiskFrameStore::new(&config.cache.directory)?;
            let (frames, bytes) = (store.len(), store.size_bytes());
            println!("Clearing disk cache at: {}", store.directory().display());
            store.clear()?;
            println!("Deleted {} frames, freed {}", frames, format_bytes(bytes));
            Ok(())
        }
    }
}

/// Format a byte count with a binary unit.
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
