//! Tracking flag commands.

use crate::error::CliError;
use crate::runner::CliRunner;

/// Flip the persisted tracking flag.
pub fn toggle(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("toggle");

    runner.block_on(async {
        let controller = runner.offline_controller().await;
        controller
            .toggle_tracking(|enabled| println!("Tracking {}", describe(enabled)))
            .await;
    });
    Ok(())
}

/// Show the persisted tracking flag and marker count.
pub fn status(runner: &CliRunner) -> Result<(), CliError> {
    runner.block_on(async {
        let controller = runner.offline_controller().await;
        controller
            .load_tracking_status(|enabled| println!("Tracking: {}", describe(enabled)))
            .await;
        println!("Markers:  {}", controller.get_all_markers().len());
        println!("Data:     {}", runner.data_dir().display());
    });
    Ok(())
}

fn describe(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}
