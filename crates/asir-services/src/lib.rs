//! Data layer for Asir Explorer: the governorate directory, its persistent
//! store, the mock maps importer, AI description polish, and the admin import
//! workflow that ties them together.

pub mod catalog;
pub mod directory;
pub mod enhancer;
pub mod import;
pub mod model;
pub mod repository;
pub mod retry;
pub mod seed;
pub mod store_backend;
pub mod workflow;

pub use directory::DirectoryError;
pub use enhancer::{
    DescriptionEnhancer, Enhancement, EnhancementStatus, GeminiEnhancer, NoopEnhancer,
};
pub use import::{MockMapsImporter, PlaceImporter};
pub use model::{Category, Governorate, Place};
pub use repository::{GovernorateRepository, LoadStatus};
pub use store_backend::{
    open_backend, FileBackend, MemoryBackend, SqliteBackend, StorageBackend, StoreError,
    StoreResult,
};
pub use workflow::{AdminWorkflow, ImportStage, WorkflowError};
