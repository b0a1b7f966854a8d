use crate::models::setup::{BatchImportItem, TrackImportGroup, ensure_json_file_name};
use crate::services::setup_store::{SetupStore, SetupStoreError, WriteMode, validate_name};
use camino::Utf8PathBuf;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur while committing a confirmed import
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("Nothing to import")]
    Empty,

    #[error("No track selected for {file_name}")]
    MissingTrack { file_name: String },

    #[error(transparent)]
    InvalidTarget(SetupStoreError),

    #[error("Failed to serialize {file_name}: {source}")]
    Serialize {
        file_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {file_name} to {car}/{track} ({committed} file(s) already committed): {source}")]
    Write {
        file_name: String,
        car: String,
        track: String,
        committed: usize,
        #[source]
        source: SetupStoreError,
    },
}

impl CommitError {
    /// True for failures detected before any file was touched.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, CommitError::Write { .. })
    }
}

/// Files written by a successful commit, in write order.
///
/// A path written more than once in the same commit is listed once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub written: Vec<Utf8PathBuf>,
}

impl CommitReport {
    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}

/// A fully validated write, ready to hand to the store
struct PendingWrite {
    car: String,
    track: String,
    file_name: String,
    content: String,
}

impl PendingWrite {
    fn new(car: &str, track: &str, file_name: &str, content: String) -> Result<Self, CommitError> {
        let file_name = ensure_json_file_name(file_name);
        validate_name("car", car).map_err(CommitError::InvalidTarget)?;
        validate_name("track", track).map_err(CommitError::InvalidTarget)?;
        validate_name("file", &file_name).map_err(CommitError::InvalidTarget)?;
        Ok(Self {
            car: car.to_string(),
            track: track.to_string(),
            file_name,
            content,
        })
    }
}

fn serialize(
    setup: &crate::models::setup::SetupDocument,
    file_name: &str,
) -> Result<String, CommitError> {
    setup.to_json().map_err(|source| CommitError::Serialize {
        file_name: file_name.to_string(),
        source,
    })
}

/// Warn about writes that land on the same file; the later one wins.
///
/// Car and track directories are resolved case-insensitively, so they are
/// compared that way here too.
fn warn_on_collisions(writes: &[PendingWrite]) {
    let mut seen = HashSet::new();
    for write in writes {
        let target = (
            write.car.to_lowercase(),
            write.track.to_lowercase(),
            write.file_name.as_str(),
        );
        if !seen.insert(target) {
            tracing::warn!(
                "{} is imported more than once for {}/{}; the last copy is kept",
                write.file_name,
                write.car,
                write.track
            );
        }
    }
}

/// Write every pending file in order, stopping at the first failure.
///
/// Files written before a failure stay on disk.
async fn write_all(
    store: &SetupStore,
    writes: Vec<PendingWrite>,
) -> Result<CommitReport, CommitError> {
    warn_on_collisions(&writes);
    let mut report = CommitReport::default();

    for write in writes {
        let result = store
            .setup_file(
                &write.car,
                &write.track,
                &write.file_name,
                &write.content,
                WriteMode::Overwrite,
            )
            .await;

        match result {
            Ok(file) => {
                if !report.written.contains(&file.path) {
                    report.written.push(file.path);
                }
            }
            Err(source) => {
                tracing::error!(
                    "Import stopped at {} after {} file(s): {}",
                    write.file_name,
                    report.len(),
                    source
                );
                return Err(CommitError::Write {
                    file_name: write.file_name,
                    car: write.car,
                    track: write.track,
                    committed: report.len(),
                    source,
                });
            }
        }
    }

    tracing::info!("Committed {} setup file(s)", report.len());
    Ok(report)
}

/// Commit a confirmed flat import.
///
/// Every item must carry a track. Each setup is filed under its own `carName`;
/// no car name is rewritten here.
pub async fn commit_batch_import(
    store: &SetupStore,
    items: &[BatchImportItem],
) -> Result<CommitReport, CommitError> {
    if items.is_empty() {
        return Err(CommitError::Empty);
    }

    let mut writes = Vec::with_capacity(items.len());
    for item in items {
        let Some(track) = item.track.as_deref() else {
            return Err(CommitError::MissingTrack {
                file_name: item.file_name.clone(),
            });
        };
        let content = serialize(&item.setup, &item.file_name)?;
        writes.push(PendingWrite::new(
            item.setup.car_name(),
            track,
            &item.file_name,
            content,
        )?);
    }

    write_all(store, writes).await
}

/// Commit confirmed track groups.
///
/// Every member setup is stamped with its group's car name before writing, so a
/// group always lands in exactly one car/track directory. The groups are only
/// stamped once every target has been validated.
pub async fn commit_track_import(
    store: &SetupStore,
    groups: &mut [TrackImportGroup],
) -> Result<CommitReport, CommitError> {
    if groups.iter().all(|group| group.items.is_empty()) {
        return Err(CommitError::Empty);
    }

    let mut writes = Vec::new();
    for group in groups.iter() {
        for item in &group.items {
            let mut stamped = item.setup.clone();
            stamped.set_car_name(&group.car_name);
            let content = serialize(&stamped, &item.file_name)?;
            writes.push(PendingWrite::new(
                &group.car_name,
                &group.track_key,
                &item.file_name,
                content,
            )?);
        }
    }

    for group in groups.iter_mut() {
        for item in &mut group.items {
            item.setup.set_car_name(&group.car_name);
        }
    }

    write_all(store, writes).await
}
