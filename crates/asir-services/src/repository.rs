//! Governorate repository over a single namespaced key.
//!
//! The persisted value is always the complete JSON-encoded governorate list.
//! There are no partial writes and no merging with other writers; the last
//! `save` wins.

use parking_lot::Mutex;

use crate::model::Governorate;
use crate::seed::seed_governorates;
use crate::store_backend::{StorageBackend, StoreError, StoreResult};

/// Default storage key.
pub const DEFAULT_STORAGE_KEY: &str = "asir_explorer_db_v3";

/// How `load_with_status` obtained its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The stored list was read as-is.
    Existing,
    /// Nothing was stored; the seed was written and returned.
    Seeded,
    /// The stored blob was unreadable; it was moved aside and the seed written.
    RecoveredFromCorruption,
}

/// Loads and saves the governorate list through an injected backend.
pub struct GovernorateRepository {
    backend: Mutex<Box<dyn StorageBackend>>,
    key: String,
}

impl GovernorateRepository {
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(backend: Box<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            backend: Mutex::new(backend),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key for the `n`th copy of an unreadable blob: `<key>.corrupt`, then
    /// `<key>.corrupt.1`, `<key>.corrupt.2`, ...
    pub fn corrupt_backup_key(&self, n: usize) -> String {
        match n {
            0 => format!("{}.corrupt", self.key),
            n => format!("{}.corrupt.{}", self.key, n),
        }
    }

    /// Keys of every backup written so far, oldest first.
    pub fn corrupt_backup_keys(&self) -> StoreResult<Vec<String>> {
        let backend = self.backend.lock();
        let mut keys = Vec::new();
        loop {
            let key = self.corrupt_backup_key(keys.len());
            if backend.read(&key)?.is_none() {
                return Ok(keys);
            }
            keys.push(key);
        }
    }

    fn next_backup_key(&self, backend: &dyn StorageBackend) -> StoreResult<String> {
        let mut n = 0;
        loop {
            let key = self.corrupt_backup_key(n);
            if backend.read(&key)?.is_none() {
                return Ok(key);
            }
            n += 1;
        }
    }

    /// Load the list, seeding an empty store and recovering from a corrupt one.
    ///
    /// Only backend failures are returned as errors.
    pub fn load(&self) -> StoreResult<Vec<Governorate>> {
        self.load_with_status().map(|(list, _)| list)
    }

    /// Like [`load`](Self::load), also reporting how the list was obtained.
    pub fn load_with_status(&self) -> StoreResult<(Vec<Governorate>, LoadStatus)> {
        let backend = self.backend.lock();

        let Some(raw) = backend.read(&self.key)? else {
            let seed = seed_governorates();
            backend.write(&self.key, &encode(&seed)?)?;
            tracing::info!("Store empty, wrote seed with {} governorates", seed.len());
            return Ok((seed, LoadStatus::Seeded));
        };

        match decode(&raw) {
            Ok(list) => {
                tracing::debug!("Loaded {} governorates", list.len());
                Ok((list, LoadStatus::Existing))
            }
            Err(err) => {
                tracing::warn!(
                    "Stored directory under {} is unreadable ({}); restoring seed",
                    self.key,
                    err
                );
                let backup = self.next_backup_key(backend.as_ref())?;
                backend.write(&backup, &raw)?;
                tracing::warn!("Unreadable blob kept under {}", backup);
                let seed = seed_governorates();
                backend.write(&self.key, &encode(&seed)?)?;
                Ok((seed, LoadStatus::RecoveredFromCorruption))
            }
        }
    }

    /// Strict load: seeds an empty store but returns `StoreError::Corrupt`
    /// instead of recovering.
    pub fn try_load(&self) -> StoreResult<Vec<Governorate>> {
        let backend = self.backend.lock();
        match backend.read(&self.key)? {
            Some(raw) => decode(&raw),
            None => {
                let seed = seed_governorates();
                backend.write(&self.key, &encode(&seed)?)?;
                Ok(seed)
            }
        }
    }

    /// Overwrite the stored list.
    pub fn save(&self, list: &[Governorate]) -> StoreResult<()> {
        let encoded = encode(list)?;
        self.backend.lock().write(&self.key, &encoded)?;
        tracing::debug!("Saved {} governorates", list.len());
        Ok(())
    }

    /// Full load followed by a linear scan. Unknown ids are `None`.
    pub fn get_by_id(&self, id: &str) -> StoreResult<Option<Governorate>> {
        Ok(self.load()?.into_iter().find(|g| g.id == id))
    }

    /// Clear the store. The next `load` writes the seed again.
    pub fn reset(&self) -> StoreResult<()> {
        self.backend.lock().remove(&self.key)?;
        tracing::info!("Cleared stored directory under {}", self.key);
        Ok(())
    }
}

impl std::fmt::Debug for GovernorateRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernorateRepository")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

fn encode(list: &[Governorate]) -> StoreResult<String> {
    serde_json::to_string(list).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode(raw: &str) -> StoreResult<Vec<Governorate>> {
    serde_json::from_str(raw).map_err(|e| StoreError::corrupt(e.to_string()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::model::{Category, Place};
    use crate::store_backend::MemoryBackend;

    fn repo() -> (GovernorateRepository, MemoryBackend) {
        let backend = MemoryBackend::new();
        (GovernorateRepository::new(Box::new(backend.clone())), backend)
    }

    fn imported(id: &str) -> Place {
        Place {
            id: id.to_string(),
            name: "Boudl Abha".to_string(),
            category: Category::Hotel,
            rating: 4.23,
            short_title: "Popular Location".to_string(),
            description: Some("Comfortable stay in the mountains.".to_string()),
            image_url: "https://picsum.photos/400/300?random=7".to_string(),
            google_maps_url: "https://www.google.com/maps/search/?api=1&query=Boudl".to_string(),
            is_manual: false,
        }
    }

    #[test]
    fn test_empty_store_returns_and_writes_seed() {
        let (repo, backend) = repo();
        let (list, status) = repo.load_with_status().unwrap();
        assert_eq!(status, LoadStatus::Seeded);
        assert_eq!(list, seed_governorates());
        assert!(backend.read(DEFAULT_STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_second_load_is_stable() {
        let (repo, backend) = repo();
        let first = repo.load().unwrap();
        let raw_after_first = backend.read(DEFAULT_STORAGE_KEY).unwrap();

        let (second, status) = repo.load_with_status().unwrap();
        assert_eq!(status, LoadStatus::Existing);
        assert_eq!(first, second);
        assert_eq!(backend.read(DEFAULT_STORAGE_KEY).unwrap(), raw_after_first);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let (repo, _) = repo();
        let mut list = repo.load().unwrap();
        list[1].places.push(imported("imported_1_0"));
        list[0].places.remove(0);

        repo.save(&list).unwrap();
        assert_eq!(repo.load().unwrap(), list);
    }

    #[test]
    fn test_get_by_id() {
        let (repo, _) = repo();
        let abha = repo.get_by_id("abha").unwrap().unwrap();
        assert_eq!(abha.name, "Abha");
        assert!(repo.get_by_id("unknown").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_blob_recovers_to_seed() {
        let (repo, backend) = repo();
        backend.write(DEFAULT_STORAGE_KEY, "{not json").unwrap();

        let (list, status) = repo.load_with_status().unwrap();
        assert_eq!(status, LoadStatus::RecoveredFromCorruption);
        assert_eq!(list, seed_governorates());
        assert_eq!(
            backend.read(&repo.corrupt_backup_key(0)).unwrap().as_deref(),
            Some("{not json")
        );
        // the seed now sits under the main key
        assert_eq!(repo.load_with_status().unwrap().1, LoadStatus::Existing);
    }

    #[test]
    fn test_repeated_corruption_keeps_every_backup() {
        let (repo, backend) = repo();
        backend.write(DEFAULT_STORAGE_KEY, "first bad").unwrap();
        repo.load().unwrap();
        backend.write(DEFAULT_STORAGE_KEY, "second bad").unwrap();
        repo.load().unwrap();

        let keys = repo.corrupt_backup_keys().unwrap();
        assert_eq!(
            keys,
            vec![
                "asir_explorer_db_v3.corrupt".to_string(),
                "asir_explorer_db_v3.corrupt.1".to_string()
            ]
        );
        assert_eq!(backend.read(&keys[0]).unwrap().as_deref(), Some("first bad"));
        assert_eq!(backend.read(&keys[1]).unwrap().as_deref(), Some("second bad"));
    }

    #[test]
    fn test_schema_mismatch_is_corruption() {
        let (repo, backend) = repo();
        backend
            .write(DEFAULT_STORAGE_KEY, r#"[{"id":"abha","name":"Abha"}]"#)
            .unwrap();

        assert!(matches!(repo.try_load(), Err(StoreError::Corrupt(_))));
        // strict load leaves the blob alone
        assert!(repo.corrupt_backup_keys().unwrap().is_empty());
    }

    #[test]
    fn test_try_load_seeds_empty_store() {
        let (repo, _) = repo();
        assert_eq!(repo.try_load().unwrap(), seed_governorates());
    }

    #[test]
    fn test_reset_reseeds() {
        let (repo, _) = repo();
        repo.save(&[]).unwrap();
        assert!(repo.load().unwrap().is_empty());

        repo.reset().unwrap();
        let (list, status) = repo.load_with_status().unwrap();
        assert_eq!(status, LoadStatus::Seeded);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_custom_key() {
        let backend = MemoryBackend::new();
        let repo = GovernorateRepository::with_key(Box::new(backend.clone()), "custom");
        repo.load().unwrap();
        assert!(backend.read("custom").unwrap().is_some());
        assert!(backend.read(DEFAULT_STORAGE_KEY).unwrap().is_none());
    }
}
