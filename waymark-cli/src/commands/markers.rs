//! Marker listing and removal.

use waymark::geo::{map_region, DEFAULT_REGION_RADIUS_KM};
use waymark::marker::{Marker, MarkerStore};

use crate::error::CliError;
use crate::runner::CliRunner;

/// List persisted markers.
pub fn list(runner: &CliRunner) -> Result<(), CliError> {
    let markers = runner.block_on(async { MarkerStore::load(runner.backend()).await.get_all() });

    if markers.is_empty() {
        println!("No markers saved in {}", runner.data_dir().display());
        return Ok(());
    }

    println!("Markers ({})", markers.len());
    println!("=======");
    for line in format_markers(&markers) {
        println!("{}", line);
    }

    if let Some(latest) = markers.last() {
        let region = map_region(latest.coordinate(), DEFAULT_REGION_RADIUS_KM);
        println!();
        println!(
            "Map region around latest: center {}, span {:.5}° x {:.5}°",
            region.center, region.latitude_delta, region.longitude_delta
        );
    }
    Ok(())
}

/// Delete every marker.
pub fn clear(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("clear");

    let removed = runner.block_on(async {
        let controller = runner.offline_controller().await;
        let count = controller.get_all_markers().len();
        controller.clear_all_markers().await;
        count
    });

    println!("Removed {} markers", removed);
    Ok(())
}

/// One numbered line per marker.
fn format_markers(markers: &[Marker]) -> Vec<String> {
    let width = markers.len().to_string().len();
    markers
        .iter()
        .enumerate()
        .map(|(index, marker)| {
            format!(
                "{:>width$}. {}  {}",
                index + 1,
                marker.coordinate(),
                marker.display_label(),
                width = width
            )
        })
        .collect()
}
