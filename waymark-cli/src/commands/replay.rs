//! Replay command - run the pipeline over a recorded track.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use waymark::marker::{MarkerEvent, MarkerObserver};
use waymark::source::{FixSource, ReplaySource};
use waymark::tracking::TrackingController;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the replay command.
pub struct ReplayArgs {
    pub file: PathBuf,
    pub offline: bool,
    pub min_distance: Option<f64>,
    pub interval_ms: u64,
}

/// Run the replay command.
pub fn run(runner: &CliRunner, args: ReplayArgs) -> Result<(), CliError> {
    runner.log_startup("replay");

    let mut tracker_config = runner.config().tracker_config();
    if let Some(metres) = args.min_distance {
        if !metres.is_finite() || metres < 0.0 {
            return Err(CliError::Config(format!(
                "--min-distance must be a non-negative number of metres, got {}",
                metres
            )));
        }
        tracker_config = tracker_config.with_min_distance(metres);
    }
    let resolver = runner.resolver(args.offline)?;
    let interval = Duration::from_millis(args.interval_ms);

    runner.block_on(async {
        let (source, events) = ReplaySource::open(&args.file, interval)
            .await
            .map_err(|e| CliError::Recording {
                path: args.file.clone(),
                source: e,
            })?;
        let source = Arc::new(source);
        let total = source.remaining();

        let controller = Arc::new(
            TrackingController::open(tracker_config, runner.backend(), resolver, source.clone())
                .await,
        );
        let before = controller.get_all_markers().len();

        println!("Replaying {} ({} records)", args.file.display(), total);
        println!(
            "Minimum distance: {} m, resolver: {}",
            controller.config().min_distance_m,
            if args.offline { "offline" } else { runner.config().resolver.provider.as_str() }
        );
        if !controller.is_enabled() {
            println!("Tracking is disabled: fixes are read but no markers are created.");
            println!("Run `waymark toggle` to enable it.");
        }
        println!();

        let printer: Arc<dyn MarkerObserver> = Arc::new(|event: &MarkerEvent| {
            if let MarkerEvent::Added(marker) = event {
                println!("  {}  {}", marker.coordinate(), marker.display_label());
            }
        });
        controller.register_observer(printer);

        let shutdown = CancellationToken::new();
        let handler_shutdown = shutdown.clone();
        let handler_source = source.clone();
        ctrlc::set_handler(move || {
            println!();
            println!("Received shutdown signal, stopping replay...");
            handler_source.stop();
            handler_shutdown.cancel();
        })
        .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

        let handle = controller.spawn(events, shutdown);
        controller.start_tracking();
        source.wait_idle().await;
        source.close();

        handle.await.map_err(|e| CliError::Task(e.to_string()))?;
        controller.wait_for_pending_resolutions().await;

        let after = controller.get_all_markers().len();
        println!();
        println!("Markers added: {} (total {})", after.saturating_sub(before), after);
        if source.remaining() > 0 {
            println!("Stopped with {} records left", source.remaining());
        }
        Ok::<(), CliError>(())
    })
}
