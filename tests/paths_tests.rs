// Integration tests for storage locations and file naming

use anyhow::Result;
use chrono::{Local, TimeZone};
use tempfile::TempDir;
use voice_journal::{DirectoryPaths, FileNameProvider, PathProvider, StorageLocation, TimestampFileNames};

#[test]
fn test_directories_created_on_demand() -> Result<()> {
    let temp = TempDir::new()?;
    let cache = temp.path().join("cache");
    let internal = temp.path().join("nested").join("files");
    let paths = DirectoryPaths::new(cache.clone(), internal.clone(), None);

    assert_eq!(paths.dir(StorageLocation::Cache)?, cache);
    assert!(cache.is_dir());
    assert_eq!(paths.dir(StorageLocation::Internal)?, internal);
    assert!(internal.is_dir());

    Ok(())
}

#[test]
fn test_external_falls_back_to_internal() -> Result<()> {
    let temp = TempDir::new()?;
    let internal = temp.path().join("files");

    let unset = DirectoryPaths::new(temp.path().join("cache"), internal.clone(), None);
    assert_eq!(unset.dir(StorageLocation::External)?, internal);

    // A regular file where the external directory should be
    let blocker = temp.path().join("sdcard");
    std::fs::write(&blocker, b"not a directory")?;
    let broken = DirectoryPaths::new(
        temp.path().join("cache"),
        internal.clone(),
        Some(blocker.join("journal")),
    );
    assert_eq!(broken.dir(StorageLocation::External)?, internal);

    let external = temp.path().join("shared");
    let mounted = DirectoryPaths::new(temp.path().join("cache"), internal, Some(external.clone()));
    assert_eq!(mounted.dir(StorageLocation::External)?, external);

    Ok(())
}

#[test]
fn test_file_names_carry_timestamp_and_suffix() {
    let names = TimestampFileNames::new("ej", "mp4");
    let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap();

    let name = names.name_at(at);
    assert!(name.starts_with("ej_20240309_070502_"), "unexpected name {name}");
    assert!(name.ends_with(".mp4"));

    let suffix = &name["ej_20240309_070502_".len()..name.len() - ".mp4".len()];
    assert_eq!(suffix.len(), 8);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_file_names_are_unique() {
    let names = TimestampFileNames::default();
    assert_eq!(names.extension(), "mp4");

    let first = names.new_audio_file_name();
    let second = names.new_audio_file_name();
    assert_ne!(first, second);
}
