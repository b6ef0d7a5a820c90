//! Regional weather for Asir Explorer
//!
//! Simulates a weather provider: one synthetic reading per governorate,
//! recomputed on every lookup and never persisted.

pub mod provider;
pub mod types;

pub use provider::{base_temperature, MockWeatherProvider, DEFAULT_BASE_TEMP};
pub use types::*;
