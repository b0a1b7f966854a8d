use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One track known to the simulator.
///
/// `id` is what setup folders are named after; `key` is the canonical identifier
/// used for the on-disk track directory. Display names are carried for front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub key: String,
    pub id: String,
    pub full_name: String,
    pub short_name: String,
}

/// On-disk form of the catalog (`Track Catalog.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackCatalogFile {
    #[serde(rename = "Tracks", default)]
    pub tracks: Vec<TrackRecord>,
}

/// Read-only lookup from folder names to canonical track keys.
///
/// The lower-cased id index is built once here; callers share the catalog behind
/// an `Arc` instead of consulting a global table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TrackCatalogFile", into = "TrackCatalogFile")]
pub struct TrackCatalog {
    tracks: Vec<TrackRecord>,
    by_id: IndexMap<String, String>,
}

impl TrackCatalog {
    pub fn new(tracks: Vec<TrackRecord>) -> Self {
        // Later records win on duplicate ids.
        let by_id = tracks
            .iter()
            .map(|track| (track.id.to_lowercase(), track.key.clone()))
            .collect();
        Self { tracks, by_id }
    }

    /// Canonical key for a folder name, compared case-insensitively
    pub fn resolve(&self, folder_name: &str) -> Option<&str> {
        self.by_id
            .get(&folder_name.to_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, folder_name: &str) -> bool {
        self.resolve(folder_name).is_some()
    }

    /// Look up a record by its canonical key (exact match).
    pub fn get(&self, key: &str) -> Option<&TrackRecord> {
        self.tracks.iter().find(|track| track.key == key)
    }

    pub fn tracks(&self) -> &[TrackRecord] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl From<TrackCatalogFile> for TrackCatalog {
    fn from(file: TrackCatalogFile) -> Self {
        Self::new(file.tracks)
    }
}

impl From<TrackCatalog> for TrackCatalogFile {
    fn from(catalog: TrackCatalog) -> Self {
        Self {
            tracks: catalog.tracks,
        }
    }
}

/// Tracks shipped with the simulator: (key, full name, short name)
const BUILTIN_TRACKS: &[(&str, &str, &str)] = &[
    ("monza", "Autodromo Nazionale di Monza", "Monza"),
    ("zolder", "Circuit Zolder", "Zolder"),
    ("brands_hatch", "Brands Hatch Circuit", "Brands Hatch"),
    ("silverstone", "Silverstone Circuit", "Silverstone"),
    ("paul_ricard", "Circuit Paul Ricard", "Paul Ricard"),
    ("misano", "Misano World Circuit Marco Simoncelli", "Misano"),
    ("spa", "Circuit de Spa-Francorchamps", "Spa"),
    ("nurburgring", "Nürburgring", "Nürburgring"),
    ("barcelona", "Circuit de Barcelona-Catalunya", "Barcelona"),
    ("hungaroring", "Hungaroring", "Hungaroring"),
    ("zandvoort", "Circuit Zandvoort", "Zandvoort"),
    ("kyalami", "Kyalami Grand Prix Circuit", "Kyalami"),
    ("mount_panorama", "Mount Panorama Circuit", "Bathurst"),
    ("suzuka", "Suzuka International Racing Course", "Suzuka"),
    ("laguna_seca", "WeatherTech Raceway Laguna Seca", "Laguna Seca"),
    ("imola", "Autodromo Internazionale Enzo e Dino Ferrari", "Imola"),
    ("oulton_park", "Oulton Park", "Oulton Park"),
    ("donington", "Donington Park", "Donington"),
    ("snetterton", "Snetterton Circuit", "Snetterton"),
    ("cota", "Circuit of the Americas", "COTA"),
    ("indianapolis", "Indianapolis Motor Speedway", "Indianapolis"),
    ("watkins_glen", "Watkins Glen International", "Watkins Glen"),
    ("valencia", "Circuit Ricardo Tormo", "Valencia"),
    ("red_bull_ring", "Red Bull Ring", "Red Bull Ring"),
    ("nurburgring_24h", "Nürburgring Nordschleife 24h", "Nordschleife"),
];

impl Default for TrackCatalog {
    fn default() -> Self {
        Self::new(
            BUILTIN_TRACKS
                .iter()
                .map(|(key, full_name, short_name)| TrackRecord {
                    key: key.to_string(),
                    id: key.to_string(),
                    full_name: full_name.to_string(),
                    short_name: short_name.to_string(),
                })
                .collect(),
        )
    }
}
