//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, and construction of
//! the HTTP client and frame cache shared by the network commands.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use radarloop::cache::{CachingHttpClient, DiskFrameStore, FrameStore, MemoryFrameStore};
use radarloop::config::ConfigFile;
use radarloop::logging::{init_logging, split_log_path, LoggingGuard};
use radarloop::provider::AsyncReqwestClient;
use radarloop::session::SessionConfig;

use crate::error::CliError;

/// HTTP client with the frame cache in front of it.
pub type CachedClient = CachingHttpClient<AsyncReqwestClient>;

/// Load the config file from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load config and initialize logging.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Config file override; the default location otherwise
    /// * `debug_mode` - When true, enables debug-level logging regardless of RUST_LOG
    pub fn new(config_path: Option<&Path>, debug_mode: bool) -> Result<Self, CliError> {
        let config = load_config(config_path)?;

        let (log_dir, log_file) = split_log_path(&config.logging.file);
        let logging_guard = init_logging(&log_dir, &log_file, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("radarloop v{}", radarloop::VERSION);
        info!(
            command,
            radar = %self.config.radar.radar_type,
            "radarloop CLI starting"
        );
    }

    /// Session settings from the config file.
    pub fn session_config(&self) -> Result<SessionConfig, CliError> {
        Ok(self.config.to_session_config()?)
    }

    /// The frame store selected by `[cache]`.
    pub fn frame_store(&self) -> Result<Arc<dyn FrameStore>, CliError> {
        if self.config.cache.enabled {
            let store = DiskFrameStore::new(&self.config.cache.directory)?;
            info!(directory = %store.directory().display(), "Using disk frame cache");
            Ok(Arc::new(store))
        } else {
            info!("Disk cache disabled, caching frames in memory");
            Ok(Arc::new(MemoryFrameStore::new()))
        }
    }

    /// Create the caching HTTP client used by every network command.
    pub fn create_client(&self) -> Result<Arc<CachedClient>, CliError> {
        let http = AsyncReqwestClient::with_timeout(self.config.download.timeout)?;
        let client = CachingHttpClient::new(http, self.frame_store()?)
            .with_volatile_prefix(self.config.cache.volatile_prefix.clone());
        Ok(Arc::new(client))
    }
}
