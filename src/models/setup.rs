use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// JSON field that identifies which car a setup belongs to.
pub const CAR_NAME_FIELD: &str = "carName";

/// A configuration file recovered from an import source.
///
/// The source may have been a loose file, an entry inside a zip archive, or a file
/// found while walking a dropped directory. `path` is always forward-slash separated
/// and relative, `name` is its leaf segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFile {
    pub path: String,
    pub name: String,
    pub content: String,
}

impl VirtualFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self {
            path,
            name,
            content: content.into(),
        }
    }
}

/// Reasons a file is not accepted as a setup
#[derive(Error, Debug)]
pub enum SetupParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("setup is not a JSON object")]
    NotAnObject,

    #[error("setup has no carName field")]
    MissingCarName,
}

/// Parsed content of a setup file.
///
/// The document is kept as an ordered JSON object so unknown fields survive a
/// parse/serialize cycle untouched. Construction guarantees a non-empty string
/// `carName`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetupDocument(Map<String, Value>);

impl SetupDocument {
    /// Parse raw file content into a setup document.
    ///
    /// A leading UTF-8 byte order mark is ignored.
    pub fn parse(content: &str) -> Result<Self, SetupParseError> {
        let content = content.trim_start_matches('\u{feff}');
        let Value::Object(fields) = serde_json::from_str::<Value>(content)? else {
            return Err(SetupParseError::NotAnObject);
        };

        // Only a non-empty string names a car directory; numbers and other
        // truthy values are rejected on purpose.
        match fields.get(CAR_NAME_FIELD) {
            Some(Value::String(car)) if !car.is_empty() => Ok(Self(fields)),
            _ => Err(SetupParseError::MissingCarName),
        }
    }

    pub fn car_name(&self) -> &str {
        self.0
            .get(CAR_NAME_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Overwrite the car identifier in place, keeping the field's position.
    pub fn set_car_name(&mut self, car_name: &str) {
        self.0
            .insert(CAR_NAME_FIELD.to_string(), Value::String(car_name.to_string()));
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Serialize to compact JSON text, the on-disk representation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }
}

/// One file of a flat import; the user must pick `track` before it can be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchImportItem {
    pub file_name: String,
    pub setup: SetupDocument,
    pub track: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackImportItem {
    pub file_name: String,
    pub setup: SetupDocument,
}

/// All setups found under one recognized track folder, bound to a single car.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackImportGroup {
    pub track_key: String,
    pub car_name: String,
    pub items: Vec<TrackImportItem>,
}

/// Append `.json` unless the name already ends with it (any case).
pub fn ensure_json_file_name(name: &str) -> String {
    if is_json_file_name(name) {
        name.to_string()
    } else {
        format!("{name}.json")
    }
}

pub fn is_json_file_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".json")
}

pub fn is_zip_file_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".zip")
}
