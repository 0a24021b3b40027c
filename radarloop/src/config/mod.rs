//! User configuration for radarloop.
//!
//! Settings are read from `~/.radarloop/config.ini`; a missing file yields
//! defaults identical to the library's own. The INI is turned into a
//! [`ConfigFile`], which builds the [`SessionConfig`](crate::session::SessionConfig)
//! used by the session.
//!
//! # Example
//!
//! ```ignore
//! use radarloop::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let session_config = config.to_session_config()?;
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use defaults::{
    default_cache_directory, DEFAULT_CACHE_ENABLED, DEFAULT_DOWNLOAD_TIMEOUT_SECS,
    DEFAULT_LOG_FILE_NAME, MAX_FRAMES_LIMIT,
};
pub use settings::{
    AnimationSettings, CacheSettings, ConfigFile, DownloadSettings, FramesSettings,
    LoggingSettings, PrefetchSettings, RadarSettings, RefreshSettings,
};
