//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`cache`] - Cache management (key, stats, clear)
//! - [`config`] - Configuration management (path, show, init)
//! - [`frames`] - Frame discovery
//! - [`prefetch`] - Cache warming for a viewport
//! - [`run`] - Headless animated session

pub mod cache;
pub mod common;
pub mod config;
pub mod frames;
pub mod prefetch;
pub mod run;
