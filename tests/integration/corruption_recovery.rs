//! Backup fallback when the primary settings file is damaged or missing

use super::test_utils::RecordingProvider;
use stowage::store::persistence::backup_path;
use stowage::{SettingsStore, StoreError};
use tempfile::TempDir;

fn write_settings(path: &std::path::Path, port: i64) {
    let mut store = SettingsStore::new(path, RecordingProvider::default());
    store.set_int("port", port);
    store.save().unwrap();
}

#[test]
fn test_corrupt_primary_recovers_from_backup() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.dat");

    write_settings(&path, 6881);
    // Second save moves the first file's content into the backup
    write_settings(&path, 6881);

    std::fs::write(&path, b"\x00\x01\x02 definitely not settings").unwrap();

    let mut store = SettingsStore::new(&path, RecordingProvider::default());
    store.register_int_key("port");
    store.load().unwrap();
    assert_eq!(store.get_int("port"), 6881);
}

#[test]
fn test_truncated_primary_recovers_from_backup() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.dat");

    write_settings(&path, 6881);
    write_settings(&path, 6881);

    // Chop the primary mid-value
    let full = std::fs::read(&path).unwrap();
    std::fs::write(&path, &full[..full.len() / 2]).unwrap();

    let mut store = SettingsStore::new(&path, RecordingProvider::default());
    store.register_int_key("port");
    store.load().unwrap();
    assert_eq!(store.get_int("port"), 6881);
}

#[test]
fn test_missing_primary_falls_back_to_backup() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.dat");

    write_settings(&path, 7000);
    write_settings(&path, 7000);
    std::fs::remove_file(&path).unwrap();
    assert!(backup_path(&path).exists());

    let mut store = SettingsStore::new(&path, RecordingProvider::default());
    store.register_int_key("port");
    store.load().unwrap();
    assert_eq!(store.get_int("port"), 7000);
}

#[test]
fn test_both_files_corrupt_surfaces_primary_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.dat");

    std::fs::write(&path, b"junk").unwrap();
    std::fs::write(backup_path(&path), b"more junk").unwrap();

    let mut store = SettingsStore::new(&path, RecordingProvider::default());
    let err = store.load().unwrap_err();
    match err {
        StoreError::Malformed { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("expected Malformed, got {other}"),
    }
}

#[test]
fn test_no_file_at_all_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.dat");

    let mut store = SettingsStore::new(&path, RecordingProvider::default());
    let err = store.load().unwrap_err();
    assert!(err.is_not_found());
}
