// State management module
//
// This module provides the StateManager which wraps ImportState with thread-safe access
// using Arc<RwLock<T>> and emits change events for front-end updates.

use crate::models::{BatchImportItem, ImportState, TrackImportGroup};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// These events are emitted to notify interested parties (primarily the front end)
/// about dialog state changes without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The flat import dialog has opened with new items
    BatchImportOpened { items: usize },

    /// The flat import dialog has closed
    BatchImportClosed,

    /// Track choices (or the item list) changed while the dialog is open
    BatchItemsChanged { unassigned: usize },

    /// A flat import save started or finished
    BatchImportSaving { saving: bool },

    /// The track import confirmation has opened with new groups
    TrackImportOpened { groups: usize, files: usize },

    /// The groups were replaced while the confirmation is open
    TrackGroupsChanged { groups: usize, files: usize },

    /// The track import confirmation has closed
    TrackImportClosed,

    /// A track import save started or finished
    TrackImportSaving { saving: bool },

    /// State has been reset
    StateReset,
}

/// Thread-safe state manager with event emission
///
/// This is the central state management component that:
/// - Provides thread-safe access to [`ImportState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Guards against starting the same save twice
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Usage
///
/// Always use `StateManager` instead of accessing [`ImportState`] directly:
/// - [`read()`](Self::read) for reading state
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
pub struct StateManager {
    /// The import state protected by RwLock for thread-safe access
    state: Arc<RwLock<ImportState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(ImportState::default())),
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state
    pub fn snapshot(&self) -> ImportState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let open = state_manager.read(|state| state.batch_import_open);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ImportState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// This is the primary way to modify state. It:
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Returns
    /// A vector of StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut ImportState),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Detect what changed between two states and generate events
    fn detect_changes(old: &ImportState, new: &ImportState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.batch_import_open != new.batch_import_open {
            if new.batch_import_open {
                changes.push(StateChange::BatchImportOpened {
                    items: new.batch_import_items.len(),
                });
            } else {
                changes.push(StateChange::BatchImportClosed);
            }
        } else if new.batch_import_open && old.batch_import_items != new.batch_import_items {
            changes.push(StateChange::BatchItemsChanged {
                unassigned: new.unassigned_items(),
            });
        }

        if old.batch_import_saving != new.batch_import_saving {
            changes.push(StateChange::BatchImportSaving {
                saving: new.batch_import_saving,
            });
        }

        if old.track_import_confirm_open != new.track_import_confirm_open {
            if new.track_import_confirm_open {
                changes.push(StateChange::TrackImportOpened {
                    groups: new.track_import_groups.len(),
                    files: new.track_import_file_count(),
                });
            } else {
                changes.push(StateChange::TrackImportClosed);
            }
        } else if new.track_import_confirm_open
            && old.track_import_groups != new.track_import_groups
        {
            changes.push(StateChange::TrackGroupsChanged {
                groups: new.track_import_groups.len(),
                files: new.track_import_file_count(),
            });
        }

        if old.track_import_saving != new.track_import_saving {
            changes.push(StateChange::TrackImportSaving {
                saving: new.track_import_saving,
            });
        }

        changes
    }

    // Convenience methods for common state updates

    /// Show the flat import dialog with freshly parsed items
    pub fn open_batch_import(&self, items: Vec<BatchImportItem>) -> Vec<StateChange> {
        self.update(|state| state.open_batch_import(items))
    }

    /// Close the flat import dialog and discard its items
    pub fn close_batch_import(&self) -> Vec<StateChange> {
        self.update(ImportState::reset_batch_import)
    }

    /// Assign (or clear) the track of one flat item
    ///
    /// # Returns
    /// `false` if `index` is out of range
    pub fn set_item_track(&self, index: usize, track: Option<String>) -> bool {
        let mut found = false;
        self.update(|state| {
            if let Some(item) = state.batch_import_items.get_mut(index) {
                item.track = track;
                found = true;
            }
        });
        found
    }

    /// Assign the same track to every flat item
    pub fn set_all_tracks(&self, track: &str) -> Vec<StateChange> {
        self.update(|state| {
            for item in &mut state.batch_import_items {
                item.track = Some(track.to_string());
            }
        })
    }

    /// Show the track import confirmation with reconciled groups
    pub fn open_track_import(&self, groups: Vec<TrackImportGroup>) -> Vec<StateChange> {
        self.update(|state| state.open_track_import(groups))
    }

    /// Close the track import confirmation and discard its groups
    pub fn close_track_import(&self) -> Vec<StateChange> {
        self.update(ImportState::reset_track_import)
    }

    /// Mark a flat import save as running
    ///
    /// # Returns
    /// `false` if a save was already running; the flag is left untouched then
    pub fn try_begin_batch_save(&self) -> bool {
        let mut acquired = false;
        self.update(|state| {
            if !state.batch_import_saving {
                state.batch_import_saving = true;
                acquired = true;
            }
        });
        acquired
    }

    pub fn finish_batch_save(&self) -> Vec<StateChange> {
        self.update(|state| state.batch_import_saving = false)
    }

    /// Mark a track import save as running
    ///
    /// # Returns
    /// `false` if a save was already running; the flag is left untouched then
    pub fn try_begin_track_save(&self) -> bool {
        let mut acquired = false;
        self.update(|state| {
            if !state.track_import_saving {
                state.track_import_saving = true;
                acquired = true;
            }
        });
        acquired
    }

    pub fn finish_track_save(&self) -> Vec<StateChange> {
        self.update(|state| state.track_import_saving = false)
    }

    /// Reset both dialogs
    pub fn reset(&self) -> Vec<StateChange> {
        let mut changes = self.update(|state| *state = ImportState::default());

        let reset_event = StateChange::StateReset;
        let _ = self.state_tx.send(reset_event.clone());
        changes.push(reset_event);

        changes
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across tasks
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
