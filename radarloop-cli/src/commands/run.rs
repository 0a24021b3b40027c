//! Headless radar session.

use std::path::Path;
use std::sync::Arc;

use clap::Args;
use radarloop::animation::{MAX_SPEED, MIN_SPEED};
use radarloop::host::{MapHost, PlaybackObserver};
use radarloop::session::{InitOutcome, RadarSession};
use radarloop::timer::{Scheduler, TokioScheduler};
use tokio::runtime::Handle;
use tracing::info;

use super::common::ViewportArgs;
use crate::error::CliError;
use crate::headless::{ConsoleObserver, HeadlessMap};
use crate::runner::CliRunner;

/// Arguments for `radarloop run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub viewport: ViewportArgs,

    /// Playback speed multiplier (1 = fastest, 5 = slowest)
    #[arg(long)]
    pub speed: Option<u32>,

    /// Start playing as soon as frames are available
    #[arg(long)]
    pub play: bool,

    /// Show frame ages instead of UTC times
    #[arg(long)]
    pub relative: bool,
}

/// Run a session against a headless map until Ctrl-C.
pub async fn run(args: RunArgs, config_path: Option<&Path>, debug: bool) -> Result<(), CliError> {
    let viewport = args.viewport.to_viewport()?;
    if let Some(speed) = args.speed {
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(CliError::InvalidArgument(format!(
                "--speed must be between {} and {}",
                MIN_SPEED, MAX_SPEED
            )));
        }
    }

    let runner = CliRunner::new(config_path, debug)?;
    runner.log_startup("run");

    let mut session_config = runner.session_config()?;
    if let Some(speed) = args.speed {
        session_config.speed = speed;
    }
    let client = runner.create_client()?;

    let host: Arc<dyn MapHost> = Arc::new(HeadlessMap::new(viewport));
    let observer: Arc<dyn PlaybackObserver> = ConsoleObserver::new(args.relative);
    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::new(Handle::current()));

    let session = RadarSession::new(
        session_config,
        client.clone(),
        host,
        observer,
        scheduler,
        Handle::current(),
    );

    match session.initialize().await? {
        InitOutcome::Animated { frames } => {
            info!(frames, "Session running");
            if args.play {
                session.play();
            }
        }
        InitOutcome::LatestOnly => {
            println!("Only the latest image is available; nothing to animate.");
            return Ok(());
        }
        InitOutcome::Fallback => {
            println!("The WMS service is unavailable; the static fallback layer is shown.");
            return Ok(());
        }
    }

    println!("Press Ctrl-C to stop.");
    tokio::signal::ctrl_c().await.map_err(CliError::Signal)?;
    session.teardown();

    let stats = client.stats().snapshot();
    println!();
    println!(
        "Frame cache: {} hits, {} misses ({:.0}% hit rate), {} stale served",
        stats.hits,
        stats.misses,
        stats.hit_rate() * 100.0,
        stats.stale_served
    );

    Ok(())
}
