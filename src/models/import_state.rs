use crate::models::setup::{BatchImportItem, TrackImportGroup};

/// UI-observable state of the setup import dialogs.
///
/// A host front end renders two confirmation dialogs from this:
/// - the batch dialog for flat imports, where the user assigns a track per file
/// - the track dialog for track-grouped imports, which only needs confirmation
///
/// # Thread Safety
///
/// `ImportState` is wrapped in `Arc<RwLock<ImportState>>` by
/// [`crate::state::StateManager`]. Mutate it through
/// [`update()`](crate::state::StateManager::update) so change events are emitted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportState {
    // Flat import dialog
    pub batch_import_open: bool,
    pub batch_import_items: Vec<BatchImportItem>,
    pub batch_import_saving: bool,

    // Track-grouped import dialog
    pub track_import_confirm_open: bool,
    pub track_import_groups: Vec<TrackImportGroup>,
    pub track_import_saving: bool,
}

impl ImportState {
    pub fn open_batch_import(&mut self, items: Vec<BatchImportItem>) {
        self.batch_import_items = items;
        self.batch_import_open = true;
    }

    /// Close the batch dialog and drop its items.
    pub fn reset_batch_import(&mut self) {
        self.batch_import_open = false;
        self.batch_import_items.clear();
        self.batch_import_saving = false;
    }

    pub fn open_track_import(&mut self, groups: Vec<TrackImportGroup>) {
        self.track_import_groups = groups;
        self.track_import_confirm_open = true;
    }

    /// Close the track dialog and drop its groups.
    pub fn reset_track_import(&mut self) {
        self.track_import_confirm_open = false;
        self.track_import_groups.clear();
        self.track_import_saving = false;
    }

    /// Number of flat items still waiting for a track choice.
    pub fn unassigned_items(&self) -> usize {
        self.batch_import_items
            .iter()
            .filter(|item| item.track.is_none())
            .count()
    }

    /// Total setup files across all pending track groups.
    pub fn track_import_file_count(&self) -> usize {
        self.track_import_groups
            .iter()
            .map(|group| group.items.len())
            .sum()
    }

    pub fn is_saving(&self) -> bool {
        self.batch_import_saving || self.track_import_saving
    }
}
