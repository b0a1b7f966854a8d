//! Import source reading: loose files, dropped directories and zip archives.
//!
//! Everything a user hands to the importer is first described as an [`ImportEntry`]
//! (a relative path plus where its bytes live). [`collect_virtual_files`] then turns
//! those entries into a flat list of [`VirtualFile`]s, opening zip archives and
//! dropping anything that is not a `.json` file or that lives under OS metadata
//! folders (`__MACOSX`, dot-directories).
//!
//! Unreadable entries are skipped with a log line; they never abort the import.

use crate::models::setup::{VirtualFile, is_json_file_name, is_zip_file_name};
use camino::{Utf8Path, Utf8PathBuf};
use std::future::Future;
use std::io::{Cursor, Read};
use std::pin::Pin;
use zip::ZipArchive;

/// Folder macOS adds to archives for resource forks
const RESOURCE_FORK_DIR: &str = "__MACOSX";

/// Where an entry's bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySource {
    Disk(Utf8PathBuf),
    Memory(Vec<u8>),
}

/// One user-provided input, before sniffing.
///
/// `path` is the path relative to whatever the user dropped or picked; for a loose
/// file it is just the file name, for a file inside a dropped folder it starts
/// with that folder's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub path: String,
    pub source: EntrySource,
}

impl ImportEntry {
    /// A loose file picked from disk; its relative path is its file name.
    pub fn from_disk(path: impl Into<Utf8PathBuf>) -> Self {
        let path = path.into();
        let relative = path.file_name().unwrap_or(path.as_str()).to_string();
        Self {
            path: relative,
            source: EntrySource::Disk(path),
        }
    }

    pub fn from_disk_with_path(relative: impl Into<String>, path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: relative.into(),
            source: EntrySource::Disk(path.into()),
        }
    }

    pub fn in_memory(relative: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: relative.into(),
            source: EntrySource::Memory(bytes.into()),
        }
    }

    /// Leaf name of the entry's relative path
    pub fn name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .find(|part| !part.is_empty())
            .unwrap_or(&self.path)
    }

    async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            EntrySource::Disk(path) => tokio::fs::read(path).await,
            EntrySource::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Convert backslashes to forward slashes and strip leading slashes.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches('/').to_string()
}

/// Whether any segment of `path` is an OS metadata folder or a dot-entry.
pub fn is_ignored_path(path: &str) -> bool {
    normalize_path(path)
        .split('/')
        .filter(|part| !part.is_empty())
        .any(|part| part == RESOURCE_FORK_DIR || part.starts_with('.'))
}

/// Whether a set of inputs needs the multi-file import flow.
///
/// A single loose file at the top level can be handled as a plain single-setup
/// import; several files, any archive, or anything nested inside a folder cannot.
pub fn should_use_batch_import(entries: &[ImportEntry]) -> bool {
    if entries.len() > 1 {
        return true;
    }
    entries
        .iter()
        .any(|entry| is_zip_file_name(entry.name()) || normalize_path(&entry.path).contains('/'))
}

/// Read every usable setup candidate out of `entries`, in input order.
pub async fn collect_virtual_files(entries: &[ImportEntry]) -> Vec<VirtualFile> {
    let mut collected = Vec::new();

    for entry in entries {
        let name = entry.name();
        let is_zip = is_zip_file_name(name);
        if !is_zip && !is_json_file_name(name) {
            tracing::debug!("Skipping unsupported import entry: {}", entry.path);
            continue;
        }

        if is_ignored_path(&entry.path) {
            tracing::debug!("Skipping ignored import entry: {}", entry.path);
            continue;
        }

        let bytes = match entry.read_bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to read import entry {}: {}", entry.path, e);
                continue;
            }
        };

        if is_zip {
            collected.extend(extract_zip_files(&bytes, &entry.path));
            continue;
        }

        match String::from_utf8(bytes) {
            Ok(content) => collected.push(VirtualFile {
                path: normalize_path(&entry.path),
                name: name.to_string(),
                content,
            }),
            Err(_) => tracing::warn!("Import entry is not UTF-8 text: {}", entry.path),
        }
    }

    tracing::debug!(
        "Collected {} setup candidate(s) from {} import entr(ies)",
        collected.len(),
        entries.len()
    );
    collected
}

/// Extract every `.json` entry of a zip archive held in memory.
///
/// Entry paths are relative to the archive root. Directory entries, non-JSON
/// files and ignored paths are dropped; an unreadable archive yields nothing.
pub fn extract_zip_files(bytes: &[u8], label: &str) -> Vec<VirtualFile> {
    let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
        Ok(archive) => archive,
        Err(e) => {
            tracing::warn!("Failed to open zip archive {}: {}", label, e);
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to read entry #{} of {}: {}", index, label, e);
                continue;
            }
        };

        let entry_name = entry.name().to_string();
        if entry.is_dir() || !is_json_file_name(&entry_name) || is_ignored_path(&entry_name) {
            continue;
        }

        let mut content = String::new();
        if let Err(e) = entry.read_to_string(&mut content) {
            tracing::warn!("Failed to extract {} from {}: {}", entry_name, label, e);
            continue;
        }

        files.push(VirtualFile::new(normalize_path(&entry_name), content));
    }

    files
}

/// Walk a dropped file or folder on disk, depth-first.
///
/// Paths are relative to the parent of `root`, so dropping `Setups/` yields entries
/// like `Setups/spa/race.json`. Siblings are visited in name order. Entries that
/// cannot be inspected are skipped, and symlinks below `root` are never followed.
pub async fn collect_directory_entries(root: &Utf8Path) -> Vec<ImportEntry> {
    let root = match tokio::fs::canonicalize(root).await {
        Ok(path) => match Utf8PathBuf::from_path_buf(path) {
            Ok(path) => path,
            Err(path) => {
                tracing::warn!("Skipping non UTF-8 path: {}", path.display());
                return Vec::new();
            }
        },
        Err(e) => {
            tracing::warn!("Failed to resolve import path {}: {}", root, e);
            return Vec::new();
        }
    };

    collect_entry(root, String::new()).await
}

fn collect_entry(
    path: Utf8PathBuf,
    base: String,
) -> Pin<Box<dyn Future<Output = Vec<ImportEntry>> + Send>> {
    Box::pin(async move {
        let Some(name) = path.file_name().map(str::to_string) else {
            return Vec::new();
        };
        if is_ignored_path(&name) {
            return Vec::new();
        }

        let metadata = match tokio::fs::symlink_metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("Failed to inspect {}: {}", path, e);
                return Vec::new();
            }
        };

        // A link back to an ancestor would repeat the walk indefinitely.
        if metadata.file_type().is_symlink() {
            tracing::debug!("Skipping symlink {}", path);
            return Vec::new();
        }

        if metadata.is_file() {
            return vec![ImportEntry::from_disk_with_path(format!("{base}{name}"), path)];
        }
        if !metadata.is_dir() {
            return Vec::new();
        }

        let mut children = Vec::new();
        let mut dir = match tokio::fs::read_dir(&path).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!("Failed to read directory {}: {}", path, e);
                return Vec::new();
            }
        };
        loop {
            match dir.next_entry().await {
                Ok(Some(child)) => match Utf8PathBuf::from_path_buf(child.path()) {
                    Ok(child_path) => children.push(child_path),
                    Err(child_path) => {
                        tracing::warn!("Skipping non UTF-8 path: {}", child_path.display());
                    }
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Failed to list directory {}: {}", path, e);
                    break;
                }
            }
        }
        children.sort();

        let prefix = format!("{base}{name}/");
        let mut results = Vec::new();
        for child in children {
            results.extend(collect_entry(child, prefix.clone()).await);
        }
        results
    })
}
