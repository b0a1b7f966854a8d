//! On-disk setup hierarchy: `<root>/<car>/<track>/<file>.json`.
//!
//! Directory names are matched case-insensitively but stored as found: whatever
//! casing already exists on disk is reused, and a new directory is only created
//! (with the caller's spelling) when no case-insensitive match exists. Two
//! siblings differing only by case are never produced here.

use camino::{Utf8Path, Utf8PathBuf};
use std::io::ErrorKind;
use thiserror::Error;

/// Errors raised while resolving or touching the setup hierarchy
#[derive(Error, Debug)]
pub enum SetupStoreError {
    #[error("Invalid {kind} name: {name:?}")]
    InvalidName { kind: &'static str, name: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SetupStoreError {
    fn io(path: &Utf8Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// How [`SetupStore::setup_file`] treats an existing file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Return existing content untouched; write `value` only if the file is absent.
    ReadOrInitialize,

    /// Always write `value`, replacing any existing content.
    Overwrite,
}

/// Result of a [`SetupStore::setup_file`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupFile {
    pub path: Utf8PathBuf,
    pub content: String,
}

/// Reject names that would escape their parent directory.
pub fn validate_name(kind: &'static str, name: &str) -> Result<(), SetupStoreError> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if invalid {
        return Err(SetupStoreError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Find the real name of a subdirectory of `parent` matching `target` in any case.
///
/// When several siblings match, the lexicographically smallest wins so the result
/// does not depend on directory listing order. A missing `parent` yields `None`.
pub async fn find_case_insensitive(
    parent: &Utf8Path,
    target: &str,
) -> Result<Option<String>, SetupStoreError> {
    let mut dir = match tokio::fs::read_dir(parent).await {
        Ok(dir) => dir,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(SetupStoreError::io(parent, e)),
    };

    let lower_target = target.to_lowercase();
    let mut found: Option<String> = None;

    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| SetupStoreError::io(parent, e))?
    {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.to_lowercase() != lower_target {
            continue;
        }
        let is_dir = entry
            .file_type()
            .await
            .map(|file_type| file_type.is_dir())
            .unwrap_or(false);
        if is_dir && found.as_ref().is_none_or(|current| name < *current) {
            found = Some(name);
        }
    }

    Ok(found)
}

/// Resolve `name` under `parent`, creating it when no case-insensitive match exists.
pub async fn resolve_dir(
    parent: &Utf8Path,
    kind: &'static str,
    name: &str,
) -> Result<Utf8PathBuf, SetupStoreError> {
    validate_name(kind, name)?;

    if let Some(existing) = find_case_insensitive(parent, name).await? {
        return Ok(parent.join(existing));
    }

    let path = parent.join(name);
    tokio::fs::create_dir_all(&path)
        .await
        .map_err(|e| SetupStoreError::io(&path, e))?;
    tracing::debug!("Created {} directory {}", kind, path);
    Ok(path)
}

/// The simulator's setup hierarchy rooted at one directory.
#[derive(Debug, Clone)]
pub struct SetupStore {
    root: Utf8PathBuf,
}

impl SetupStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<Documents>/Assetto Corsa Competizione/Setups`, where the simulator keeps them.
    pub fn default_root() -> Option<Utf8PathBuf> {
        let dirs = directories::UserDirs::new()?;
        let documents = dirs
            .document_dir()
            .map(|dir| dir.to_path_buf())
            .unwrap_or_else(|| dirs.home_dir().join("Documents"));
        let documents = Utf8PathBuf::from_path_buf(documents).ok()?;
        Some(documents.join("Assetto Corsa Competizione").join("Setups"))
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Resolve (creating as needed) the directory for a car/track pair.
    pub async fn resolve_track_dir(
        &self,
        car: &str,
        track: &str,
    ) -> Result<Utf8PathBuf, SetupStoreError> {
        let car_dir = resolve_dir(&self.root, "car", car).await?;
        resolve_dir(&car_dir, "track", track).await
    }

    /// Read, initialize, or overwrite one setup file.
    ///
    /// With [`WriteMode::ReadOrInitialize`] an existing file's content is returned as
    /// is and `value` is only written when the file does not exist yet. With
    /// [`WriteMode::Overwrite`] `value` is always written. Either way the returned
    /// content is what is on disk afterwards.
    pub async fn setup_file(
        &self,
        car: &str,
        track: &str,
        file_name: &str,
        value: &str,
        mode: WriteMode,
    ) -> Result<SetupFile, SetupStoreError> {
        validate_name("file", file_name)?;
        let path = self.resolve_track_dir(car, track).await?.join(file_name);

        if mode == WriteMode::ReadOrInitialize {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => return Ok(SetupFile { path, content }),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(SetupStoreError::io(&path, e)),
            }
        }

        tokio::fs::write(&path, value)
            .await
            .map_err(|e| SetupStoreError::io(&path, e))?;
        tracing::debug!("Wrote setup {}", path);

        Ok(SetupFile {
            path,
            content: value.to_string(),
        })
    }

    /// Names of the `.json` setups stored for a car/track pair, sorted.
    ///
    /// An absent root yields an empty list and creates nothing; otherwise the car
    /// and track directories are resolved and created if needed.
    pub async fn list_setups(
        &self,
        car: &str,
        track: &str,
    ) -> Result<Vec<String>, SetupStoreError> {
        if !tokio::fs::try_exists(&self.root)
            .await
            .map_err(|e| SetupStoreError::io(&self.root, e))?
        {
            return Ok(Vec::new());
        }

        let track_dir = self.resolve_track_dir(car, track).await?;
        let mut dir = tokio::fs::read_dir(&track_dir)
            .await
            .map_err(|e| SetupStoreError::io(&track_dir, e))?;

        let mut setups = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| SetupStoreError::io(&track_dir, e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let is_file = entry
                .file_type()
                .await
                .map(|file_type| file_type.is_file())
                .unwrap_or(false);
            if is_file && crate::models::setup::is_json_file_name(&name) {
                setups.push(name);
            }
        }

        setups.sort();
        Ok(setups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (SetupStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().join("Setups")).unwrap();
        (SetupStore::new(root), temp_dir)
    }

    fn dir_names(path: &Utf8Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(path)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("car", "bmw_m4_gt3").is_ok());
        assert!(validate_name("file", "Race 1.json").is_ok());
        assert!(validate_name("car", "").is_err());
        assert!(validate_name("car", "..").is_err());
        assert!(validate_name("car", "a/b").is_err());
        assert!(validate_name("track", "a\\b").is_err());
    }

    #[tokio::test]
    async fn test_find_case_insensitive_ignores_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        std::fs::write(root.join("spa"), "not a dir").unwrap();
        std::fs::create_dir(root.join("Monza")).unwrap();

        assert_eq!(find_case_insensitive(&root, "SPA").await.unwrap(), None);
        assert_eq!(
            find_case_insensitive(&root, "monza").await.unwrap(),
            Some("Monza".to_string())
        );
        assert_eq!(
            find_case_insensitive(&root.join("missing"), "x").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_resolve_track_dir_reuses_existing_casing() {
        let (store, _temp_dir) = create_test_store();
        std::fs::create_dir_all(store.root().join("BMW_M4_GT3").join("Spa")).unwrap();

        let dir = store.resolve_track_dir("bmw_m4_gt3", "SPA").await.unwrap();

        assert_eq!(dir, store.root().join("BMW_M4_GT3").join("Spa"));
        assert_eq!(dir_names(store.root()), vec!["BMW_M4_GT3"]);
    }

    #[tokio::test]
    async fn test_resolve_track_dir_creates_missing() {
        let (store, _temp_dir) = create_test_store();

        let dir = store.resolve_track_dir("gt3_x", "spa").await.unwrap();

        assert!(dir.is_dir());
        assert_eq!(dir, store.root().join("gt3_x").join("spa"));
    }

    #[tokio::test]
    async fn test_setup_file_initializes_then_reads() {
        let (store, _temp_dir) = create_test_store();

        let first = store
            .setup_file("gt3_x", "spa", "a.json", "first", WriteMode::ReadOrInitialize)
            .await
            .unwrap();
        assert_eq!(first.content, "first");

        let second = store
            .setup_file("gt3_x", "spa", "a.json", "second", WriteMode::ReadOrInitialize)
            .await
            .unwrap();
        assert_eq!(second.content, "first");
        assert_eq!(std::fs::read_to_string(&second.path).unwrap(), "first");
    }

    #[tokio::test]
    async fn test_setup_file_overwrite() {
        let (store, _temp_dir) = create_test_store();
        store
            .setup_file("gt3_x", "spa", "a.json", "old", WriteMode::ReadOrInitialize)
            .await
            .unwrap();

        let written = store
            .setup_file("GT3_X", "Spa", "a.json", "new", WriteMode::Overwrite)
            .await
            .unwrap();

        assert_eq!(written.content, "new");
        assert_eq!(written.path, store.root().join("gt3_x").join("spa").join("a.json"));
        assert_eq!(std::fs::read_to_string(&written.path).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_setup_file_rejects_traversal() {
        let (store, _temp_dir) = create_test_store();

        let result = store
            .setup_file("../escape", "spa", "a.json", "{}", WriteMode::Overwrite)
            .await;

        assert!(matches!(result, Err(SetupStoreError::InvalidName { kind: "car", .. })));
        assert!(!store.root().exists());
    }

    #[tokio::test]
    async fn test_list_setups() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.list_setups("gt3_x", "spa").await.unwrap().is_empty());
        assert!(!store.root().exists());

        let dir = store.resolve_track_dir("gt3_x", "spa").await.unwrap();
        std::fs::write(dir.join("b.json"), "{}").unwrap();
        std::fs::write(dir.join("a.JSON"), "{}").unwrap();
        std::fs::write(dir.join("notes.txt"), "").unwrap();
        std::fs::create_dir(dir.join("old.json")).unwrap();

        let setups = store.list_setups("GT3_X", "SPA").await.unwrap();
        assert_eq!(setups, vec!["a.JSON", "b.json"]);
    }
}
