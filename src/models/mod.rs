//! Data models for the setup companion.
//!
//! This module contains the core data structures used throughout the application:
//! - [`VirtualFile`], [`SetupDocument`], [`BatchImportItem`], [`TrackImportGroup`]: the
//!   artifacts flowing through the setup import pipeline
//! - [`TrackCatalog`]: read-only lookup from track folder names to canonical track keys
//! - [`ImportState`]: the dialog state a front end renders while an import awaits
//!   confirmation
//! - [`UserConfig`]: user preferences loaded from `Companion Config.yaml`
//!
//! # Architecture Note
//!
//! Pipeline artifacts are plain owned values created once per import call. The
//! catalog is built once at startup and shared behind an `Arc`.

pub mod catalog;
pub mod config;
pub mod import_state;
pub mod setup;

pub use catalog::{TrackCatalog, TrackCatalogFile, TrackRecord};
pub use config::{CompanionSettings, UserConfig};
pub use import_state::ImportState;
pub use setup::{
    BatchImportItem, SetupDocument, SetupParseError, TrackImportGroup, TrackImportItem,
    VirtualFile, ensure_json_file_name,
};
