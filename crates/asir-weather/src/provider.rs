use std::sync::Arc;
use std::time::Duration;

use asir_core::{RandomSource, ThreadRandom};

use crate::types::{WeatherCondition, WeatherData, WeatherMap};

/// Base used for any governorate missing from the table
pub const DEFAULT_BASE_TEMP: i32 = 25;

const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// Typical temperature per governorate id
pub fn base_temperature(id: &str) -> i32 {
    match id {
        "abha" => 22,
        "khamis" => 26,
        "rijal-alma" => 28,
        "tanomah" => 19,
        "namas" => 18,
        "mahayil" => 32,
        _ => DEFAULT_BASE_TEMP,
    }
}

/// Simulated weather API.
///
/// Each reading is `floor(base + r*5 - 2)` with a uniformly drawn condition.
/// Lookups always succeed.
#[derive(Clone)]
pub struct MockWeatherProvider {
    rng: Arc<dyn RandomSource>,
    latency: Duration,
}

impl MockWeatherProvider {
    pub fn new() -> Self {
        Self {
            rng: Arc::new(ThreadRandom),
            latency: DEFAULT_LATENCY,
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

    /// Fetch one reading per requested governorate id.
    ///
    /// Repeated ids collapse into a single entry.
    #[tracing::instrument(skip_all, level = "debug")]
    pub async fn fetch<I, S>(&self, ids: I) -> WeatherMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: Vec<String> = ids.into_iter().map(|id| id.as_ref().to_string()).collect();

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut result = WeatherMap::with_capacity(ids.len());
        for id in ids {
            if result.contains_key(&id) {
                continue;
            }
            let reading = self.reading_for(&id);
            tracing::debug!("Weather for {}: {}° {}", id, reading.temp, reading.condition);
            result.insert(id, reading);
        }
        result
    }

    fn reading_for(&self, id: &str) -> WeatherData {
        let base = f64::from(base_temperature(id));
        let temp = (base + self.rng.next_f64() * 5.0 - 2.0).floor() as i32;
        let condition = WeatherCondition::ALL[self.rng.index_below(WeatherCondition::ALL.len())];
        WeatherData::new(temp, condition)
    }
}

impl Default for MockWeatherProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockWeatherProvider")
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asir_core::SequenceRandom;

    fn provider(values: Vec<f64>) -> MockWeatherProvider {
        MockWeatherProvider::new()
            .with_random(Arc::new(SequenceRandom::new(values)))
            .with_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_one_entry_per_id() {
        let weather = MockWeatherProvider::new()
            .with_latency(Duration::ZERO)
            .fetch(["abha", "unknown-id"])
            .await;

        assert_eq!(weather.len(), 2);
        let unknown = &weather["unknown-id"];
        assert!((23..=27).contains(&unknown.temp), "temp {}", unknown.temp);
    }

    #[tokio::test]
    async fn test_known_base_with_jitter_bounds() {
        // r = 0 gives base - 2, r -> 1 gives base + 2
        let low = provider(vec![0.0, 0.0]).fetch(["abha"]).await;
        assert_eq!(low["abha"].temp, 20);

        let high = provider(vec![0.9999, 0.0]).fetch(["mahayil"]).await;
        assert_eq!(high["mahayil"].temp, 34);
    }

    #[tokio::test]
    async fn test_condition_and_icon_from_draw() {
        // temp draw, then condition draw (0.8 * 4 = 3 -> Light Rain)
        let weather = provider(vec![0.5, 0.8]).fetch(["tanomah"]).await;
        let reading = &weather["tanomah"];
        assert_eq!(reading.temp, 19);
        assert_eq!(reading.condition, "Light Rain");
        assert_eq!(reading.icon, "🌧️");
    }

    #[tokio::test]
    async fn test_duplicate_ids_collapse() {
        let weather = provider(vec![0.5]).fetch(vec!["abha", "abha"]).await;
        assert_eq!(weather.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_request() {
        let weather = provider(vec![0.5]).fetch(Vec::<String>::new()).await;
        assert!(weather.is_empty());
    }

    #[test]
    fn test_base_table() {
        assert_eq!(base_temperature("khamis"), 26);
        assert_eq!(base_temperature("rijal-alma"), 28);
        assert_eq!(base_temperature("nowhere"), DEFAULT_BASE_TEMP);
    }
}
