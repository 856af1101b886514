//! Crash-safety simulation around the atomic write protocol

use super::test_utils::RecordingProvider;
use stowage::SettingsStore;
use tempfile::TempDir;

/// A crash after the temporary file was written but before the rename must
/// leave the original settings file untouched and loadable.
#[test]
fn test_interrupted_save_leaves_original_intact() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.dat");

    let mut store = SettingsStore::new(&path, RecordingProvider::default());
    store.set_int("port", 6881);
    store.save().unwrap();
    let original = std::fs::read(&path).unwrap();

    // Simulate the interrupted save: a stray temp file next to the target
    let tmp = {
        let mut name = path.as_os_str().to_os_string();
        name.push(".tmp");
        std::path::PathBuf::from(name)
    };
    std::fs::write(&tmp, b"half-written garbage").unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), original);

    let mut fresh = SettingsStore::new(&path, RecordingProvider::default());
    fresh.register_int_key("port");
    fresh.load().unwrap();
    assert_eq!(fresh.get_int("port"), 6881);
}

/// A later successful save replaces the stray temp file.
#[test]
fn test_save_overwrites_stale_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.dat");

    let tmp = {
        let mut name = path.as_os_str().to_os_string();
        name.push(".tmp");
        std::path::PathBuf::from(name)
    };
    std::fs::write(&tmp, b"stale").unwrap();

    let mut store = SettingsStore::new(&path, RecordingProvider::default());
    store.set_int("port", 1234);
    store.save().unwrap();

    assert!(!tmp.exists());
    let mut fresh = SettingsStore::new(&path, RecordingProvider::default());
    fresh.register_int_key("port");
    fresh.load().unwrap();
    assert_eq!(fresh.get_int("port"), 1234);
}
