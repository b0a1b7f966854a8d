//! Turning a classified layout into importable setups.
//!
//! Track-grouped layouts become [`TrackImportGroup`]s: each recognized track folder
//! is mapped to its canonical key, every setup below it is parsed, and the first
//! valid setup decides the car the whole group is filed under. Flat layouts carry
//! no structural hint, so each valid file simply becomes a [`BatchImportItem`]
//! awaiting a track choice.
//!
//! Files that fail to parse are dropped here and never reach the commit stage.

use crate::models::catalog::TrackCatalog;
use crate::models::setup::{
    BatchImportItem, SetupDocument, TrackImportGroup, TrackImportItem, VirtualFile,
};
use crate::services::tree::TreeNode;

fn parse_setup(file: &VirtualFile) -> Option<SetupDocument> {
    match SetupDocument::parse(&file.content) {
        Ok(setup) => Some(setup),
        Err(e) => {
            tracing::debug!("Skipping {}: {}", file.path, e);
            None
        }
    }
}

/// Build one import group per recognized track folder.
///
/// Groups with no valid setup are omitted, as are folders the catalog does not
/// know.
pub fn build_track_import_groups(
    tracks: Vec<(String, TreeNode)>,
    catalog: &TrackCatalog,
) -> Vec<TrackImportGroup> {
    let mut groups = Vec::new();

    for (folder_name, node) in tracks {
        let Some(track_key) = catalog.resolve(&folder_name) else {
            tracing::debug!("Folder {} is not a known track", folder_name);
            continue;
        };

        let items: Vec<TrackImportItem> = node
            .into_files()
            .into_iter()
            .filter_map(|file| {
                parse_setup(&file).map(|setup| TrackImportItem {
                    file_name: file.name,
                    setup,
                })
            })
            .collect();

        let Some(car_name) = items.first().map(|item| item.setup.car_name().to_string()) else {
            tracing::info!("No valid setups under track folder {}", folder_name);
            continue;
        };

        tracing::debug!(
            "Track folder {} -> {} ({} setup(s) for {})",
            folder_name,
            track_key,
            items.len(),
            car_name
        );
        groups.push(TrackImportGroup {
            track_key: track_key.to_string(),
            car_name,
            items,
        });
    }

    groups
}

/// Parse flat-layout files into batch items with no track assigned.
pub fn build_batch_import_items(files: Vec<VirtualFile>) -> Vec<BatchImportItem> {
    files
        .into_iter()
        .filter_map(|file| {
            parse_setup(&file).map(|setup| BatchImportItem {
                file_name: file.name,
                setup,
                track: None,
            })
        })
        .collect()
}
