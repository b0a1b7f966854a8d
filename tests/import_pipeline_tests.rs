//! End-to-end tests for the setup import pipeline
//!
//! These tests drive ImportController from raw import entries to files on disk:
//! - Flat imports keep each setup's own car name
//! - Track-grouped archives are reconciled and stamped with one car name
//! - Unrecognized structures never write anything
//! - Re-importing the same files overwrites instead of accumulating

use camino::{Utf8Path, Utf8PathBuf};
use setup_companion::services::{collect_directory_entries, collect_virtual_files};
use setup_companion::{
    ImportController, ImportEntry, ImportOutcome, SaveOutcome, SetupStore, StateManager,
    TrackCatalog,
};
use std::io::{Cursor, Write};
use std::sync::Arc;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn create_test_controller() -> (ImportController, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().join("Setups")).unwrap();
    let controller = ImportController::new(
        Arc::new(StateManager::new()),
        SetupStore::new(root),
        Arc::new(TrackCatalog::default()),
    );
    (controller, temp_dir)
}

fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Every file under `root`, as sorted forward-slash relative paths.
fn files_on_disk(root: &Utf8Path) -> Vec<String> {
    fn walk(dir: &Utf8Path, prefix: &str, out: &mut Vec<String>) {
        let Ok(entries) = dir.read_dir_utf8() else {
            return;
        };
        for entry in entries {
            let entry = entry.unwrap();
            let name = format!("{prefix}{}", entry.file_name());
            if entry.path().is_dir() {
                walk(entry.path(), &format!("{name}/"), out);
            } else {
                out.push(name);
            }
        }
    }

    let mut out = Vec::new();
    walk(root, "", &mut out);
    out.sort();
    out
}

#[tokio::test]
async fn test_flat_import_keeps_each_car_name() {
    let (controller, _temp_dir) = create_test_controller();
    let entries = vec![
        ImportEntry::in_memory("s1.json", r#"{"carName":"gt3_x"}"#),
        ImportEntry::in_memory("s2.json", r#"{"carName":"gt3_y"}"#),
    ];

    let outcome = controller.handle_import(&entries).await;
    assert_eq!(outcome, ImportOutcome::BatchImportOpened { items: 2 });

    assert!(controller.set_all_tracks("spa"));
    let saved = controller.save_batch_import().await.unwrap();

    assert!(matches!(saved, SaveOutcome::Saved(ref report) if report.len() == 2));
    assert_eq!(
        files_on_disk(controller.store().root()),
        vec!["gt3_x/spa/s1.json", "gt3_y/spa/s2.json"]
    );

    let state = controller.state_manager().snapshot();
    assert!(!state.batch_import_open);
    assert!(state.batch_import_items.is_empty());
    assert!(!state.batch_import_saving);
}

#[tokio::test]
async fn test_track_grouped_zip_import() {
    let (controller, _temp_dir) = create_test_controller();
    let archive = build_zip(&[
        ("spa/a.json", r#"{"carName":"gt3_x"}"#),
        ("spa/b.json", r#"{"carName":"gt3_x"}"#),
    ]);

    let outcome = controller
        .handle_import(&[ImportEntry::in_memory("pack.zip", archive)])
        .await;
    assert_eq!(
        outcome,
        ImportOutcome::TrackImportOpened {
            groups: 1,
            files: 2
        }
    );

    let groups = controller
        .state_manager()
        .read(|state| state.track_import_groups.clone());
    assert_eq!(groups[0].track_key, "spa");
    assert_eq!(groups[0].car_name, "gt3_x");
    let names: Vec<&str> = groups[0]
        .items
        .iter()
        .map(|item| item.file_name.as_str())
        .collect();
    assert_eq!(names, vec!["a.json", "b.json"]);

    controller.save_track_import().await.unwrap();

    assert_eq!(
        files_on_disk(controller.store().root()),
        vec!["gt3_x/spa/a.json", "gt3_x/spa/b.json"]
    );
    assert!(!controller.state_manager().read(|s| s.track_import_confirm_open));
}

#[tokio::test]
async fn test_unrecognized_structure_writes_nothing() {
    let (controller, _temp_dir) = create_test_controller();
    let archive = build_zip(&[
        ("random1/a.json", r#"{"carName":"gt3_x"}"#),
        ("random2/b.json", r#"{"carName":"gt3_x"}"#),
    ]);

    let outcome = controller
        .handle_import(&[ImportEntry::in_memory("pack.zip", archive)])
        .await;

    assert_eq!(outcome, ImportOutcome::Unrecognized);
    let state = controller.state_manager().snapshot();
    assert!(!state.batch_import_open);
    assert!(!state.track_import_confirm_open);
    assert!(!controller.store().root().exists());
}

#[tokio::test]
async fn test_flat_reimport_is_idempotent() {
    let (controller, _temp_dir) = create_test_controller();
    let entries = vec![
        ImportEntry::in_memory("race.json", r#"{"carName":"gt3_x","tyres":{"pressure":27.5}}"#),
        ImportEntry::in_memory("quali.json", r#"{"carName":"gt3_x","fuel":12}"#),
    ];
    let root = controller.store().root().to_path_buf();

    let mut snapshots = Vec::new();
    for _ in 0..2 {
        controller.handle_import(&entries).await;
        assert!(controller.set_all_tracks("monza"));
        controller.save_batch_import().await.unwrap();

        let contents: Vec<(String, String)> = files_on_disk(&root)
            .into_iter()
            .map(|path| {
                let content = std::fs::read_to_string(root.join(&path)).unwrap();
                (path, content)
            })
            .collect();
        snapshots.push(contents);
    }

    assert_eq!(snapshots[0].len(), 2);
    assert_eq!(snapshots[0], snapshots[1]);
}

#[tokio::test]
async fn test_archive_flattening_skips_os_noise() {
    let archive = build_zip(&[
        ("A/", ""),
        ("A/B/", ""),
        ("A/B/setup.json", r#"{"carName":"gt3_x"}"#),
        ("C.json", r#"{"carName":"gt3_y"}"#),
        ("__MACOSX/", ""),
        ("__MACOSX/A/B/._setup.json", "junk"),
        ("readme.txt", "not a setup"),
    ]);

    let files = collect_virtual_files(&[ImportEntry::in_memory("pack.zip", archive)]).await;

    let paths: Vec<&str> = files.iter().map(|file| file.path.as_str()).collect();
    assert_eq!(paths, vec!["A/B/setup.json", "C.json"]);
    assert_eq!(files[0].name, "setup.json");
}

#[tokio::test]
async fn test_group_car_name_is_stamped_on_commit() {
    let (controller, _temp_dir) = create_test_controller();
    let entries = vec![
        ImportEntry::in_memory("Pack/Monza/a.json", r#"{"carName":"gt3_x","n":1}"#),
        ImportEntry::in_memory("Pack/Monza/b.json", r#"{"carName":"gt3_other","n":2}"#),
        ImportEntry::in_memory("Pack/Monza/broken.json", "{ not json"),
        ImportEntry::in_memory("Pack/Zandvoort/wet/c.json", r#"{"carName":"gt4_z"}"#),
        ImportEntry::in_memory("Pack/notes/d.json", r#"{"carName":"gt3_x"}"#),
    ];

    let outcome = controller.handle_import(&entries).await;
    assert_eq!(
        outcome,
        ImportOutcome::TrackImportOpened {
            groups: 2,
            files: 3
        }
    );

    let groups = controller
        .state_manager()
        .read(|state| state.track_import_groups.clone());
    assert!(groups.iter().all(|group| !group.items.is_empty()));

    controller.save_track_import().await.unwrap();

    let root = controller.store().root();
    assert_eq!(
        files_on_disk(root),
        vec!["gt3_x/monza/a.json", "gt3_x/monza/b.json", "gt4_z/zandvoort/c.json"]
    );
    let stamped = std::fs::read_to_string(root.join("gt3_x/monza/b.json")).unwrap();
    assert_eq!(stamped, r#"{"carName":"gt3_x","n":2}"#);
}

#[tokio::test]
async fn test_missing_track_keeps_flat_dialog_open() {
    let (controller, _temp_dir) = create_test_controller();
    let entries = vec![
        ImportEntry::in_memory("s1.json", r#"{"carName":"gt3_x"}"#),
        ImportEntry::in_memory("s2.json", r#"{"carName":"gt3_y"}"#),
    ];
    controller.handle_import(&entries).await;
    assert!(controller.set_item_track(0, Some("spa")));

    let err = controller.save_batch_import().await.unwrap_err();

    assert!(err.is_precondition());
    assert!(!controller.store().root().exists());
    let state = controller.state_manager().snapshot();
    assert!(state.batch_import_open);
    assert_eq!(state.unassigned_items(), 1);

    assert!(controller.set_item_track(1, Some("spa")));
    assert!(controller.save_batch_import().await.is_ok());
}

#[tokio::test]
async fn test_existing_directories_are_reused_in_any_case() {
    let (controller, _temp_dir) = create_test_controller();
    let root = controller.store().root().to_path_buf();
    std::fs::create_dir_all(root.join("GT3_X").join("Spa")).unwrap();

    controller
        .handle_import(&[ImportEntry::in_memory("s1.json", r#"{"carName":"gt3_x"}"#)])
        .await;
    controller.set_all_tracks("spa");
    controller.save_batch_import().await.unwrap();

    assert_eq!(files_on_disk(&root), vec!["GT3_X/Spa/s1.json"]);
}

#[tokio::test]
async fn test_dropped_folder_import() {
    let (controller, temp_dir) = create_test_controller();
    let dropped = Utf8PathBuf::try_from(temp_dir.path().join("Shared Setups")).unwrap();
    std::fs::create_dir_all(dropped.join("spa")).unwrap();
    std::fs::create_dir_all(dropped.join(".git")).unwrap();
    std::fs::write(dropped.join("spa").join("race.json"), r#"{"carName":"gt3_x"}"#).unwrap();
    std::fs::write(dropped.join(".git").join("x.json"), r#"{"carName":"gt3_x"}"#).unwrap();

    let entries = collect_directory_entries(&dropped).await;
    let outcome = controller.handle_import(&entries).await;

    assert_eq!(
        outcome,
        ImportOutcome::TrackImportOpened {
            groups: 1,
            files: 1
        }
    );
    controller.save_track_import().await.unwrap();
    assert!(controller.store().root().join("gt3_x/spa/race.json").is_file());
}
