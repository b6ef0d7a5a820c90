use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Conditions the mock provider can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherCondition {
    #[serde(rename = "Sunny")]
    Sunny,
    #[serde(rename = "Partly Cloudy")]
    PartlyCloudy,
    #[serde(rename = "Cloudy")]
    Cloudy,
    #[serde(rename = "Light Rain")]
    LightRain,
}

impl WeatherCondition {
    /// Every condition, in the order the provider draws from
    pub const ALL: [WeatherCondition; 4] = [
        Self::Sunny,
        Self::PartlyCloudy,
        Self::Cloudy,
        Self::LightRain,
    ];

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sunny => "Sunny",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::LightRain => "Light Rain",
        }
    }

    /// Glyph shown next to the temperature
    pub fn icon(&self) -> &'static str {
        icon_for_label(self.label())
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Rain wins over cloud; anything else is sunny.
pub fn icon_for_label(label: &str) -> &'static str {
    if label.contains("Rain") {
        "🌧️"
    } else if label.contains("Cloud") {
        "⛅"
    } else {
        "☀️"
    }
}

/// A single synthetic reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherData {
    /// Whole degrees Celsius
    pub temp: i32,
    pub condition: String,
    pub icon: String,
}

impl WeatherData {
    pub fn new(temp: i32, condition: WeatherCondition) -> Self {
        Self {
            temp,
            condition: condition.label().to_string(),
            icon: condition.icon().to_string(),
        }
    }
}

/// Governorate id -> reading
pub type WeatherMap = HashMap<String, WeatherData>;
