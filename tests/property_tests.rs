//! Property tests for the import pipeline
//!
//! - Resolving a directory name in any case reuses the existing directory
//! - Classification never reports track folders when files sit at the root
//! - Track-grouped results only ever contain catalog tracks

use camino::Utf8PathBuf;
use proptest::prelude::*;
use setup_companion::models::VirtualFile;
use setup_companion::services::{Layout, SetupStore, TreeNode, classify};
use setup_companion::TrackCatalog;
use tempfile::TempDir;

/// A name plus one case flip per character
fn name_and_variant() -> impl Strategy<Value = (String, String)> {
    "[a-z][a-z0-9_]{0,11}".prop_flat_map(|name| {
        let len = name.len();
        (
            Just(name),
            proptest::collection::vec(any::<bool>(), len),
        )
            .prop_map(|(name, flips)| {
                let variant = name
                    .chars()
                    .zip(flips)
                    .map(|(c, flip)| if flip { c.to_ascii_uppercase() } else { c })
                    .collect();
                (name, variant)
            })
    })
}

/// Segment pool mixing catalog tracks (in several casings) with other folders
fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("spa".to_string()),
        Just("Monza".to_string()),
        Just("ZANDVOORT".to_string()),
        Just("wrapper".to_string()),
        Just("misc".to_string()),
        Just("gt3".to_string()),
    ]
}

fn setup_path() -> impl Strategy<Value = String> {
    (proptest::collection::vec(segment(), 0..4), "[a-z]{1,6}").prop_map(|(dirs, file)| {
        let mut path = dirs.join("/");
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(&file);
        path.push_str(".json");
        path
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn resolving_any_case_reuses_existing_directory(
        (car, car_variant) in name_and_variant(),
        (track, track_variant) in name_and_variant(),
    ) {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().join("Setups")).unwrap();
        let existing = root.join(car.to_uppercase()).join(&track);
        std::fs::create_dir_all(&existing).unwrap();
        let store = SetupStore::new(root.clone());

        let resolved = runtime()
            .block_on(store.resolve_track_dir(&car_variant, &track_variant))
            .unwrap();

        prop_assert_eq!(&resolved, &existing);
        prop_assert_eq!(std::fs::read_dir(&root).unwrap().count(), 1);
        prop_assert_eq!(std::fs::read_dir(root.join(car.to_uppercase())).unwrap().count(), 1);
    }

    #[test]
    fn classification_respects_root_files(paths in proptest::collection::vec(setup_path(), 1..12)) {
        let catalog = TrackCatalog::default();
        let root_files = paths.iter().filter(|path| !path.contains('/')).count();
        let files: Vec<VirtualFile> = paths
            .iter()
            .map(|path| VirtualFile::new(path.as_str(), "{}"))
            .collect();
        let total = files.len();

        let layout = classify(TreeNode::build(files), &catalog);

        match layout {
            Layout::Flat(files) => {
                prop_assert!(!files.is_empty());
                if root_files > 0 {
                    prop_assert_eq!(files.len(), root_files);
                }
            }
            Layout::TrackGrouped(tracks) => {
                prop_assert_eq!(root_files, 0);
                prop_assert!(!tracks.is_empty());
                for (name, node) in &tracks {
                    prop_assert!(catalog.contains(name));
                    prop_assert!(node.file_count() > 0);
                }
                prop_assert!(tracks.iter().map(|(_, n)| n.file_count()).sum::<usize>() <= total);
            }
            Layout::Unrecognized => prop_assert_eq!(root_files, 0),
        }
    }
}
