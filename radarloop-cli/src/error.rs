//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use radarloop::cache::CacheError;
use radarloop::capabilities::CapabilitiesError;
use radarloop::config::ConfigFileError;
use radarloop::provider::ProviderError;
use radarloop::session::SessionError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Bad command-line argument
    InvalidArgument(String),
    /// Failed to create the HTTP client
    HttpClient(ProviderError),
    /// Frame discovery failed
    Discovery(CapabilitiesError),
    /// Frame cache error
    Cache(CacheError),
    /// Session lifecycle error
    Session(SessionError),
    /// Failed to wait for Ctrl-C
    Signal(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Discovery(CapabilitiesError::Fetch(_))
            | CliError::Discovery(CapabilitiesError::Status { .. }) => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. No network access to the WMS server");
                eprintln!("  2. The server is down; try again later or set [radar] type = conus");
                eprintln!("  3. A custom wms_url is wrong: check it with 'radarloop config show'");
            }
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Run 'radarloop config path' to locate the configuration file.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Discovery(e) => write!(f, "Frame discovery failed: {}", e),
            CliError::Cache(e) => write!(f, "Frame cache error: {}", e),
            CliError::Session(e) => write!(f, "Radar session error: {}", e),
            CliError::Signal(e) => write!(f, "Failed to listen for Ctrl-C: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::HttpClient(e) => Some(e),
            CliError::Discovery(e) => Some(e),
            CliError::Cache(e) => Some(e),
            CliError::Session(e) => Some(e),
            CliError::Signal(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CapabilitiesError> for CliError {
    fn from(e: CapabilitiesError) -> Self {
        CliError::Discovery(e)
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        CliError::Cache(e)
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        CliError::Session(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::HttpClient(e)
    }
}
