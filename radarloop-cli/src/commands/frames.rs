//! Frame discovery command.

use std::path::Path;

use clap::Args;
use radarloop::capabilities::fetch_capabilities;
use radarloop::time::format_timestamp;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `radarloop frames`.
#[derive(Debug, Args)]
pub struct FramesArgs {
    /// Show frame ages ("12 minutes ago") instead of UTC times
    #[arg(long)]
    pub relative: bool,
}

/// Discover the current frame set and print it, oldest first.
pub async fn run(args: FramesArgs, config_path: Option<&Path>, debug: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, debug)?;
    runner.log_startup("frames");

    let session = runner.session_config()?;
    let client = runner.create_client()?;

    println!("Querying {} ({})", session.source.wms_url, session.source.layer);
    let frames = fetch_capabilities(
        client.as_ref(),
        &session.source.wms_url,
        &session.source.layer,
        session.max_frames,
    )
    .await?;

    if frames.is_empty() {
        println!("No time dimension advertised; only the latest image is available.");
        return Ok(());
    }

    let now = chrono::Utc::now();
    println!("{} frames:", frames.len());
    for (index, frame) in frames.iter().enumerate() {
        let marker = if index + 1 == frames.len() { " (newest)" } else { "" };
        println!(
            "  {:>3}  {}  {}{}",
            index,
            frame,
            format_timestamp(frame, args.relative, now),
            marker
        );
    }

    Ok(())
}
