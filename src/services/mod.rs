//! Services module - the setup import pipeline.
//!
//! Data flows strictly downstream through these stages:
//!
//! - [`source`]: turns loose files, dropped folders and zip archives into a flat list
//!   of [`VirtualFile`](crate::models::VirtualFile)s, skipping OS noise and non-JSON
//!   entries
//! - [`tree`]: rebuilds the folder hierarchy and classifies it as flat,
//!   track-grouped, or unrecognized
//! - [`reconcile`]: maps track folders to canonical track keys and picks the car each
//!   group is filed under
//! - [`setup_store`]: resolves `<car>/<track>` directories on disk case-insensitively
//!   and reads/writes setup files
//! - [`commit`]: validates a confirmed import and writes it sequentially
//!
//! # Design Philosophy
//!
//! The services are framework-agnostic: no dialog or notification code lives here.
//! Structural outcomes are returned as values and the caller decides how to present
//! them. All file I/O goes through tokio so a front end's event loop is never
//! blocked.
//!
//! # Usage Example
//!
//! ```ignore
//! use setup_companion::services::{classify, collect_virtual_files, Layout, TreeNode};
//!
//! let files = collect_virtual_files(&entries).await;
//! match classify(TreeNode::build(files), &catalog) {
//!     Layout::Flat(files) => { /* ask the user for tracks */ }
//!     Layout::TrackGrouped(tracks) => { /* build_track_import_groups(tracks, &catalog) */ }
//!     Layout::Unrecognized => { /* tell the user */ }
//! }
//! ```

pub mod commit;
pub mod reconcile;
pub mod setup_store;
pub mod source;
pub mod tree;

pub use commit::{CommitError, CommitReport, commit_batch_import, commit_track_import};
pub use reconcile::{build_batch_import_items, build_track_import_groups};
pub use setup_store::{SetupFile, SetupStore, SetupStoreError, WriteMode};
pub use source::{
    EntrySource, ImportEntry, collect_directory_entries, collect_virtual_files,
    should_use_batch_import,
};
pub use tree::{Layout, TreeNode, classify};
