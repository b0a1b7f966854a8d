// Setup Companion - Import and manage Assetto Corsa Competizione car setups
//
// This is the library crate containing the import pipeline and its state.
// The binary crate (main.rs) provides a command-line front end.

pub mod config;
pub mod controller;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use controller::{ImportController, ImportOutcome, SaveOutcome};
pub use models::{ImportState, TrackCatalog, UserConfig};
pub use services::{CommitError, ImportEntry, SetupStore};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
