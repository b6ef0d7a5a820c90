//! End-to-end admin workflow over each persistent backend.
//!
//! A workflow imports, commits and saves; a second workflow opened on the
//! same storage must see exactly what was saved.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use asir_core::config::{StorageConfig, StorageKind};
use asir_core::SeededRandom;
use asir_services::{
    open_backend, AdminWorkflow, Category, GovernorateRepository, LoadStatus, MockMapsImporter,
    NoopEnhancer,
};
use tempfile::TempDir;

fn importer(seed: u64) -> Arc<MockMapsImporter> {
    Arc::new(
        MockMapsImporter::new()
            .with_random(Arc::new(SeededRandom::new(seed)))
            .with_latency(Duration::ZERO),
    )
}

fn open(kind: StorageKind, dir: &TempDir) -> AdminWorkflow {
    let config = StorageConfig {
        backend: kind,
        ..StorageConfig::default()
    };
    let backend = open_backend(&config, dir.path()).unwrap();
    let repository = GovernorateRepository::with_key(backend, config.key);
    AdminWorkflow::open(repository, importer(7), Arc::new(NoopEnhancer)).unwrap()
}

async fn import_commit_save_reopen(kind: StorageKind) {
    let dir = TempDir::new().unwrap();

    let first = open(kind, &dir);
    assert_eq!(first.load_status(), LoadStatus::Seeded);

    first.import(Category::Hotel).await.unwrap();
    first.enhance().await.unwrap();
    assert_eq!(first.commit().unwrap(), 3);
    first.delete_place("p1").unwrap();
    first.select("tanomah").unwrap();
    first.import(Category::TouristSite).await.unwrap();
    first.commit().unwrap();
    first.save().unwrap();

    let second = open(kind, &dir);
    assert_eq!(second.load_status(), LoadStatus::Existing);
    assert_eq!(second.governorates(), first.governorates());

    let abha = second.selected().unwrap();
    assert_eq!(abha.id, "abha");
    assert_eq!(abha.places.len(), 4);
    assert!(abha.place("p1").is_none());
    assert!(abha.places[1..].iter().all(|p| !p.is_manual));
}

#[tokio::test]
async fn test_file_backend_round_trip() {
    import_commit_save_reopen(StorageKind::File).await;
}

#[tokio::test]
async fn test_sqlite_backend_round_trip() {
    import_commit_save_reopen(StorageKind::Sqlite).await;
}

#[tokio::test]
async fn test_unsaved_changes_are_lost_on_reopen() {
    let dir = TempDir::new().unwrap();

    let first = open(StorageKind::File, &dir);
    first.import(Category::Cafe).await.unwrap();
    first.commit().unwrap();
    assert!(first.has_unsaved_changes());

    let second = open(StorageKind::File, &dir);
    assert_eq!(second.selected().unwrap().places.len(), 2);
}

#[tokio::test]
async fn test_corrupt_file_is_recovered_on_open() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("asir_explorer_db_v3.json"), "{oops").unwrap();

    let workflow = open(StorageKind::File, &dir);
    assert_eq!(workflow.load_status(), LoadStatus::RecoveredFromCorruption);
    assert_eq!(workflow.governorates().len(), 4);

    let backup = dir.path().join("asir_explorer_db_v3.corrupt.json");
    assert_eq!(std::fs::read_to_string(backup).unwrap(), "{oops");
}

#[tokio::test]
async fn test_second_corruption_keeps_first_backup() {
    let dir = TempDir::new().unwrap();
    let main = dir.path().join("asir_explorer_db_v3.json");

    std::fs::write(&main, "{oops").unwrap();
    open(StorageKind::File, &dir);
    std::fs::write(&main, "[1, 2").unwrap();
    let workflow = open(StorageKind::File, &dir);
    assert_eq!(workflow.load_status(), LoadStatus::RecoveredFromCorruption);

    let read = |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap();
    assert_eq!(read("asir_explorer_db_v3.corrupt.json"), "{oops");
    assert_eq!(read("asir_explorer_db_v3.corrupt.1.json"), "[1, 2");
}
