//! Cache warming command.

use std::path::Path;

use clap::Args;
use radarloop::capabilities::fetch_capabilities;
use radarloop::host::NullObserver;
use radarloop::prefetch::FramePrefetcher;

use super::common::ViewportArgs;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `radarloop prefetch`.
#[derive(Debug, Args)]
pub struct PrefetchArgs {
    #[command(flatten)]
    pub viewport: ViewportArgs,
}

/// Fetch every current frame for a viewport into the frame cache.
pub async fn run(args: PrefetchArgs, config_path: Option<&Path>, debug: bool) -> Result<(), CliError> {
    let viewport = args.viewport.to_viewport()?;
    let runner = CliRunner::new(config_path, debug)?;
    runner.log_startup("prefetch");

    let session = runner.session_config()?;
    let client = runner.create_client()?;

    let frames = fetch_capabilities(
        client.as_ref(),
        &session.source.wms_url,
        &session.source.layer,
        session.max_frames,
    )
    .await?;
    if frames.is_empty() {
        println!("No frames advertised; nothing to prefetch.");
        return Ok(());
    }

    println!("Prefetching {} frames for {}", frames.len(), viewport.key());
    let prefetcher = FramePrefetcher::new(
        client.clone(),
        session.source.wms_url.clone(),
        session.source.layer.clone(),
    );
    let report = prefetcher.prefetch(&frames, &viewport, &NullObserver).await;
    let stats = client.stats().snapshot();

    println!(
        "Done: {} fetched, {} failed, {} skipped",
        report.succeeded, report.failed, report.skipped
    );
    println!(
        "Cache: {} hits, {} stored, {} store fallbacks",
        stats.hits, stats.stores, stats.store_fallbacks
    );

    Ok(())
}
