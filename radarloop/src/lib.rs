//! Radarloop - animated WMS radar frames with a persistent frame cache
//!
//! This library discovers time-indexed radar frames from a WMS capabilities
//! document, keeps a bounded window of frame identifiers, warms a frame cache
//! for the current viewport, and drives a timer-based animation over the
//! frames while a background loop picks up newly published frames.
//!
//! # High-Level API
//!
//! The [`session`] module wires every component together behind a facade:
//!
//! ```ignore
//! use std::sync::Arc;
//! use radarloop::cache::{CachingHttpClient, MemoryFrameStore};
//! use radarloop::provider::AsyncReqwestClient;
//! use radarloop::session::{RadarSession, SessionConfig};
//! use radarloop::timer::TokioScheduler;
//! use tokio::runtime::Handle;
//!
//! let client = CachingHttpClient::new(AsyncReqwestClient::new()?, Arc::new(MemoryFrameStore::new()));
//! let session = RadarSession::new(SessionConfig::default(), Arc::new(client), host, observer,
//!     Arc::new(TokioScheduler::try_current()?), Handle::current());
//! session.initialize().await?;
//! session.play();
//! ```

pub mod animation;
pub mod cache;
pub mod capabilities;
pub mod config;
pub mod frames;
pub mod host;
pub mod logging;
pub mod prefetch;
pub mod provider;
pub mod refresh;
pub mod session;
pub mod time;
pub mod timer;
pub mod wms;

/// Version of the radarloop library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
