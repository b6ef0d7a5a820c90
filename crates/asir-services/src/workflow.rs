//! Admin import workflow.
//!
//! Idle -> Importing -> Staged -> (Enhancing -> Staged)* -> commit -> Idle.
//! Commit and delete edit the in-memory list; `save` persists it.

use std::sync::Arc;

use asir_core::error::{AppError, ImportError};
use parking_lot::Mutex;
use thiserror::Error;

use crate::directory::{append_places, find_governorate, remove_place, DirectoryError};
use crate::enhancer::{DescriptionEnhancer, Enhancement};
use crate::import::PlaceImporter;
use crate::model::{Category, Governorate, Place};
use crate::repository::{GovernorateRepository, LoadStatus};
use crate::store_backend::StoreError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Another admin action is still running")]
    Busy,

    #[error("No governorate selected")]
    NoSelection,

    #[error("Unknown governorate: {0}")]
    UnknownGovernorate(String),

    #[error("Nothing staged")]
    NothingStaged,

    #[error(transparent)]
    ImportFailed(#[from] ImportError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::ImportFailed(e) => AppError::Import(e),
            WorkflowError::Store(e) => e.into(),
            WorkflowError::Busy => AppError::Import(ImportError::InProgress),
            other => AppError::Other(anyhow::Error::new(other)),
        }
    }
}

/// Where the staging area is in the import cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ImportStage {
    #[default]
    Idle,
    Importing,
    Staged(Vec<Place>),
    /// Enhancement in flight; holds the list being enhanced.
    Enhancing(Vec<Place>),
}

impl ImportStage {
    pub fn is_busy(&self) -> bool {
        matches!(self, ImportStage::Importing | ImportStage::Enhancing(_))
    }

    pub fn staged(&self) -> &[Place] {
        match self {
            ImportStage::Staged(places) | ImportStage::Enhancing(places) => places,
            ImportStage::Idle | ImportStage::Importing => &[],
        }
    }
}

struct WorkflowState {
    governorates: Vec<Governorate>,
    selected: Option<String>,
    stage: ImportStage,
    dirty: bool,
}

impl WorkflowState {
    fn selected_governorate(&self) -> Result<&Governorate, WorkflowError> {
        let id = self.selected.as_deref().ok_or(WorkflowError::NoSelection)?;
        find_governorate(&self.governorates, id)
            .ok_or_else(|| WorkflowError::UnknownGovernorate(id.to_string()))
    }

    fn ensure_idle_or_staged(&self) -> Result<(), WorkflowError> {
        if self.stage.is_busy() {
            return Err(WorkflowError::Busy);
        }
        Ok(())
    }
}

/// Puts the stage back if an in-flight import or enhance is dropped or
/// unwinds before it finishes.
struct StageGuard<'a> {
    state: &'a Mutex<WorkflowState>,
    restore: Option<ImportStage>,
}

impl<'a> StageGuard<'a> {
    fn new(state: &'a Mutex<WorkflowState>, restore: ImportStage) -> Self {
        Self {
            state,
            restore: Some(restore),
        }
    }

    /// Normal completion: set the final stage and disarm.
    fn finish(mut self, stage: ImportStage) {
        self.restore = None;
        self.state.lock().stage = stage;
    }
}

impl Drop for StageGuard<'_> {
    fn drop(&mut self) {
        if let Some(stage) = self.restore.take() {
            tracing::warn!("Admin action interrupted, staging restored");
            self.state.lock().stage = stage;
        }
    }
}

/// Drives the admin dashboard: selection, staging, commit, delete and save.
///
/// Methods take `&self`; the state lock is never held across an await, so a
/// second action started while one is in flight sees `Busy`.
pub struct AdminWorkflow {
    repository: GovernorateRepository,
    importer: Arc<dyn PlaceImporter>,
    enhancer: Arc<dyn DescriptionEnhancer>,
    load_status: LoadStatus,
    state: Mutex<WorkflowState>,
}

impl AdminWorkflow {
    /// Load the directory and select the first governorate.
    pub fn open(
        repository: GovernorateRepository,
        importer: Arc<dyn PlaceImporter>,
        enhancer: Arc<dyn DescriptionEnhancer>,
    ) -> Result<Self, WorkflowError> {
        let (governorates, load_status) = repository.load_with_status()?;
        if load_status == LoadStatus::RecoveredFromCorruption {
            tracing::warn!("Stored directory was unreadable; the seed list was restored");
        }
        let selected = governorates.first().map(|g| g.id.clone());
        tracing::info!(
            "Admin workflow opened with {} governorates ({:?})",
            governorates.len(),
            load_status
        );

        Ok(Self {
            repository,
            importer,
            enhancer,
            load_status,
            state: Mutex::new(WorkflowState {
                governorates,
                selected,
                stage: ImportStage::Idle,
                dirty: false,
            }),
        })
    }

    pub fn load_status(&self) -> LoadStatus {
        self.load_status
    }

    pub fn governorates(&self) -> Vec<Governorate> {
        self.state.lock().governorates.clone()
    }

    pub fn selected(&self) -> Option<Governorate> {
        self.state.lock().selected_governorate().ok().cloned()
    }

    /// Switch governorate. Anything staged for the previous one is dropped.
    pub fn select(&self, id: &str) -> Result<(), WorkflowError> {
        let mut state = self.state.lock();
        state.ensure_idle_or_staged()?;
        if find_governorate(&state.governorates, id).is_none() {
            return Err(WorkflowError::UnknownGovernorate(id.to_string()));
        }
        if state.selected.as_deref() != Some(id) {
            state.selected = Some(id.to_string());
            state.stage = ImportStage::Idle;
        }
        Ok(())
    }

    pub fn stage(&self) -> ImportStage {
        self.state.lock().stage.clone()
    }

    pub fn staged_places(&self) -> Vec<Place> {
        self.state.lock().stage.staged().to_vec()
    }

    pub fn is_busy(&self) -> bool {
        self.state.lock().stage.is_busy()
    }

    /// True when the in-memory list differs from what was last saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.state.lock().dirty
    }

    /// Import a batch for the selected governorate into staging, replacing
    /// anything already staged. On failure staging is left empty.
    pub async fn import(&self, category: Category) -> Result<Vec<Place>, WorkflowError> {
        let (region, guard) = {
            let mut state = self.state.lock();
            state.ensure_idle_or_staged()?;
            let region = state.selected_governorate()?.name.clone();
            state.stage = ImportStage::Importing;
            (region, StageGuard::new(&self.state, ImportStage::Idle))
        };

        match self.importer.import(&region, category).await {
            Ok(places) => {
                tracing::info!("Staged {} {} places for {}", places.len(), category, region);
                guard.finish(ImportStage::Staged(places.clone()));
                Ok(places)
            }
            Err(e) => {
                tracing::error!("Import for {} failed: {}", region, e);
                guard.finish(ImportStage::Idle);
                Err(WorkflowError::ImportFailed(e))
            }
        }
    }

    /// Run the enhancer over the staged list. The staged list is replaced by
    /// whatever the enhancer returns, which is the original on failure.
    pub async fn enhance(&self) -> Result<Enhancement, WorkflowError> {
        let (places, region, guard) = {
            let mut state = self.state.lock();
            let places = match &state.stage {
                ImportStage::Staged(places) if !places.is_empty() => places.clone(),
                ImportStage::Importing | ImportStage::Enhancing(_) => {
                    return Err(WorkflowError::Busy)
                }
                ImportStage::Idle | ImportStage::Staged(_) => {
                    return Err(WorkflowError::NothingStaged)
                }
            };
            let region = state.selected_governorate()?.name.clone();
            state.stage = ImportStage::Enhancing(places.clone());
            let guard = StageGuard::new(&self.state, ImportStage::Staged(places.clone()));
            (places, region, guard)
        };

        let enhancement = self.enhancer.enhance(&places, &region).await;
        if let Some(e) = enhancement.error() {
            tracing::warn!("Descriptions left unchanged: {}", e);
        }

        guard.finish(ImportStage::Staged(enhancement.places.clone()));
        Ok(enhancement)
    }

    /// Append the staged list to the selected governorate.
    ///
    /// On an id collision nothing is appended and staging is kept.
    pub fn commit(&self) -> Result<usize, WorkflowError> {
        let mut state = self.state.lock();
        let places = match &state.stage {
            ImportStage::Staged(places) => places.clone(),
            ImportStage::Importing | ImportStage::Enhancing(_) => {
                return Err(WorkflowError::Busy)
            }
            ImportStage::Idle => return Err(WorkflowError::NothingStaged),
        };
        let id = state.selected_governorate()?.id.clone();

        let added = append_places(&mut state.governorates, &id, places)?;
        state.stage = ImportStage::Idle;
        state.dirty = true;
        tracing::info!("{} places added to {}", added, id);
        Ok(added)
    }

    pub fn discard_staging(&self) -> Result<(), WorkflowError> {
        let mut state = self.state.lock();
        state.ensure_idle_or_staged()?;
        state.stage = ImportStage::Idle;
        Ok(())
    }

    /// Remove a committed place from the selected governorate.
    pub fn delete_place(&self, place_id: &str) -> Result<Place, WorkflowError> {
        let mut state = self.state.lock();
        let id = state.selected_governorate()?.id.clone();
        let removed = remove_place(&mut state.governorates, &id, place_id)?;
        state.dirty = true;
        Ok(removed)
    }

    /// Persist the whole in-memory list.
    pub fn save(&self) -> Result<(), WorkflowError> {
        let mut state = self.state.lock();
        self.repository.save(&state.governorates)?;
        state.dirty = false;
        tracing::info!("All changes saved");
        Ok(())
    }

    /// Visitor introduction for the selected governorate.
    pub async fn region_summary(&self) -> Result<String, WorkflowError> {
        let region = self.state.lock().selected_governorate()?.name.clone();
        Ok(self.enhancer.summarize(&region).await)
    }
}

impl std::fmt::Debug for AdminWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AdminWorkflow")
            .field("repository", &self.repository)
            .field("selected", &state.selected)
            .field("stage", &state.stage)
            .finish_non_exhaustive()
    }
}
