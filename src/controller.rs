// Import Controller - Bridges a front end with the setup import pipeline
//
// This module contains the ImportController which coordinates between:
// - StateManager (dialog state observed by the front end)
// - The import services (reader, classifier, reconciler, commit)
// - SetupStore (the on-disk setup hierarchy)
//
// It handles:
// - Running an import and opening the matching confirmation dialog
// - Recording the user's track choices for flat imports
// - Saving confirmed imports with a re-entrancy guard

use crate::models::{TrackCatalog, VirtualFile};
use crate::services::{
    CommitError, CommitReport, ImportEntry, Layout, SetupStore, TreeNode,
    build_batch_import_items, build_track_import_groups, classify, collect_virtual_files,
    commit_batch_import, commit_track_import,
};
use crate::state::StateManager;
use std::sync::Arc;

/// What an import call found, for the front end to act on
///
/// The empty and rejected variants map to user notifications; the opened
/// variants mean a confirmation dialog is now showing in [`StateManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// No usable setup file was found
    Empty,

    /// The input's folder structure was not recognized
    Unrecognized,

    /// Track folders were found but none held a valid setup
    NoTrackGroups,

    /// A flat import awaits per-file track choices
    BatchImportOpened { items: usize },

    /// A track-grouped import awaits confirmation
    TrackImportOpened { groups: usize, files: usize },
}

/// Result of a save request that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(CommitReport),

    /// A save for the same dialog was already running; nothing was done
    AlreadySaving,
}

/// Controller that wires a front end to the import pipeline
///
/// # Example
/// ```ignore
/// let controller = ImportController::new(
///     Arc::new(StateManager::new()),
///     SetupStore::new(setups_dir),
///     Arc::new(config_manager.load_track_catalog()?),
/// );
///
/// match controller.handle_import(&entries).await {
///     ImportOutcome::BatchImportOpened { .. } => {
///         controller.set_all_tracks("spa");
///         controller.save_batch_import().await?;
///     }
///     ImportOutcome::TrackImportOpened { .. } => {
///         controller.save_track_import().await?;
///     }
///     other => tracing::info!("Nothing imported: {:?}", other),
/// }
/// ```
pub struct ImportController {
    /// Shared dialog state
    state_manager: Arc<StateManager>,

    /// Where confirmed setups are written
    store: SetupStore,

    /// Track lookup shared with the classifier and reconciler
    catalog: Arc<TrackCatalog>,
}

impl ImportController {
    pub fn new(
        state_manager: Arc<StateManager>,
        store: SetupStore,
        catalog: Arc<TrackCatalog>,
    ) -> Self {
        Self {
            state_manager,
            store,
            catalog,
        }
    }

    pub fn state_manager(&self) -> &Arc<StateManager> {
        &self.state_manager
    }

    pub fn store(&self) -> &SetupStore {
        &self.store
    }

    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    /// Read, classify and reconcile `entries`, opening the matching dialog.
    pub async fn handle_import(&self, entries: &[ImportEntry]) -> ImportOutcome {
        let files = collect_virtual_files(entries).await;
        if files.is_empty() {
            tracing::info!("Import found no setup files");
            return ImportOutcome::Empty;
        }

        let layout = classify(TreeNode::build(files), &self.catalog);
        tracing::info!("Import layout classified as {}", layout.name());

        match layout {
            Layout::Flat(files) => self.open_flat_import(files),
            Layout::TrackGrouped(tracks) => {
                let groups = build_track_import_groups(tracks, &self.catalog);
                if groups.is_empty() {
                    return ImportOutcome::NoTrackGroups;
                }

                let files = groups.iter().map(|group| group.items.len()).sum();
                let outcome = ImportOutcome::TrackImportOpened {
                    groups: groups.len(),
                    files,
                };
                self.state_manager.open_track_import(groups);
                outcome
            }
            Layout::Unrecognized => ImportOutcome::Unrecognized,
        }
    }

    fn open_flat_import(&self, files: Vec<VirtualFile>) -> ImportOutcome {
        let items = build_batch_import_items(files);
        if items.is_empty() {
            return ImportOutcome::Empty;
        }

        let outcome = ImportOutcome::BatchImportOpened { items: items.len() };
        self.state_manager.open_batch_import(items);
        outcome
    }

    /// Canonical key for a user-supplied track, by key or by catalog id.
    fn canonical_track(&self, track: &str) -> Option<String> {
        if let Some(record) = self.catalog.get(track) {
            return Some(record.key.clone());
        }
        self.catalog.resolve(track).map(str::to_string)
    }

    /// Record the user's track choice for one flat item.
    ///
    /// # Returns
    /// `false` if the index is out of range or the track is not in the catalog
    pub fn set_item_track(&self, index: usize, track: Option<&str>) -> bool {
        let track = match track {
            Some(track) => match self.canonical_track(track) {
                Some(key) => Some(key),
                None => {
                    tracing::warn!("Unknown track selected: {}", track);
                    return false;
                }
            },
            None => None,
        };
        self.state_manager.set_item_track(index, track)
    }

    /// Apply one track to every flat item.
    ///
    /// # Returns
    /// `false` if the track is not in the catalog
    pub fn set_all_tracks(&self, track: &str) -> bool {
        let Some(key) = self.canonical_track(track) else {
            tracing::warn!("Unknown track selected: {}", track);
            return false;
        };
        self.state_manager.set_all_tracks(&key);
        true
    }

    /// Save the confirmed flat import.
    ///
    /// On success the dialog is closed and reset. On failure it stays open with
    /// its items so the user can fix the selection or retry.
    pub async fn save_batch_import(&self) -> Result<SaveOutcome, CommitError> {
        if !self.state_manager.try_begin_batch_save() {
            tracing::debug!("Batch import save already in progress");
            return Ok(SaveOutcome::AlreadySaving);
        }

        let items = self.state_manager.read(|state| state.batch_import_items.clone());
        match commit_batch_import(&self.store, &items).await {
            Ok(report) => {
                self.state_manager.close_batch_import();
                Ok(SaveOutcome::Saved(report))
            }
            Err(e) => {
                self.state_manager.finish_batch_save();
                Err(e)
            }
        }
    }

    /// Save the confirmed track groups.
    ///
    /// Member setups are stamped with their group's car name as part of the commit.
    pub async fn save_track_import(&self) -> Result<SaveOutcome, CommitError> {
        if !self.state_manager.try_begin_track_save() {
            tracing::debug!("Track import save already in progress");
            return Ok(SaveOutcome::AlreadySaving);
        }

        let mut groups = self.state_manager.read(|state| state.track_import_groups.clone());
        match commit_track_import(&self.store, &mut groups).await {
            Ok(report) => {
                self.state_manager.close_track_import();
                Ok(SaveOutcome::Saved(report))
            }
            Err(e) => {
                self.state_manager.finish_track_save();
                Err(e)
            }
        }
    }

    pub fn close_batch_import_dialog(&self) {
        self.state_manager.close_batch_import();
    }

    pub fn close_track_import_dialog(&self) {
        self.state_manager.close_track_import();
    }
}
