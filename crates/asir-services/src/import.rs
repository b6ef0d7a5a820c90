//! Simulated maps import.
//!
//! Picks curated names for a region/category when the catalog has them,
//! otherwise generic placeholders, and wraps each in a fresh `Place` with a
//! real maps search link.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use asir_core::error::ImportError;
use asir_core::random::{shuffle, RandomSource, ThreadRandom};
use async_trait::async_trait;

use crate::catalog::catalog_names;
use crate::model::{Category, Place};

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";
const DEFAULT_LATENCY: Duration = Duration::from_millis(1200);
const DEFAULT_BATCH_SIZE: usize = 3;
const MIN_RATING: f64 = 3.8;
const RATING_SPAN: f64 = 1.2;

/// Source of freshly imported places.
#[async_trait]
pub trait PlaceImporter: Send + Sync {
    /// Produce a batch of places for `region` (display name) and `category`.
    ///
    /// Callers must not apply a partial result on error.
    async fn import(&self, region: &str, category: Category) -> Result<Vec<Place>, ImportError>;
}

/// Maps search link for a free-text query, percent-encoded.
pub fn maps_search_url(query: &str) -> String {
    format!("{}{}", MAPS_SEARCH_URL, urlencoding::encode(query))
}

/// Stand-in for a maps provider backed by the curated catalog.
#[derive(Clone)]
pub struct MockMapsImporter {
    rng: Arc<dyn RandomSource>,
    latency: Duration,
    batch_size: usize,
    /// Last batch stamp; shared by clones so their ids never overlap.
    last_stamp: Arc<AtomicI64>,
}

impl MockMapsImporter {
    pub fn new() -> Self {
        Self {
            rng: Arc::new(ThreadRandom),
            latency: DEFAULT_LATENCY,
            batch_size: DEFAULT_BATCH_SIZE,
            last_stamp: Arc::new(AtomicI64::new(0)),
        }
    }

    pub fn with_random(mut self, rng: Arc<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Current unix millis, bumped past the previous batch when two batches
    /// land in the same millisecond.
    fn next_stamp(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let previous = self
            .last_stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }

    /// Build the batch without the simulated delay.
    pub fn generate(&self, region: &str, category: Category) -> Vec<Place> {
        let stamp = self.next_stamp();
        let candidates = catalog_names(region, category);

        if candidates.is_empty() {
            tracing::debug!("No catalog entry for {} / {}, using placeholders", region, category);
            return (0..self.batch_size)
                .map(|i| {
                    let name = format!("Best {} Spot {}", category, i + 1);
                    let query = format!("{} in {} Saudi Arabia", category, region);
                    self.build_place(stamp, i, name, category, "Top Rated", &query)
                })
                .collect();
        }

        let mut picked = candidates.to_vec();
        shuffle(self.rng.as_ref(), &mut picked);
        picked.truncate(self.batch_size);

        picked
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let query = format!("{} {} Saudi Arabia", name, region);
                self.build_place(stamp, i, name.to_string(), category, "Popular Location", &query)
            })
            .collect()
    }

    fn build_place(
        &self,
        stamp: i64,
        index: usize,
        name: String,
        category: Category,
        short_title: &str,
        query: &str,
    ) -> Place {
        Place {
            id: format!("imported_{}_{}", stamp, index),
            name,
            category,
            rating: MIN_RATING + self.rng.next_f64() * RATING_SPAN,
            short_title: short_title.to_string(),
            description: None,
            image_url: format!("https://picsum.photos/400/300?random={}", stamp + index as i64),
            google_maps_url: maps_search_url(query),
            is_manual: false,
        }
    }
}

impl Default for MockMapsImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockMapsImporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockMapsImporter")
            .field("latency", &self.latency)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PlaceImporter for MockMapsImporter {
    #[tracing::instrument(skip(self), level = "info")]
    async fn import(&self, region: &str, category: Category) -> Result<Vec<Place>, ImportError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let places = self.generate(region, category);
        tracing::info!("Imported {} places", places.len());
        Ok(places)
    }
}
