use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user-supplied point on the globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// New York City, the dashboard's initial position.
    pub const NEW_YORK: Coordinate = Coordinate { latitude: 40.7128, longitude: -74.0060 };

    pub fn new(latitude: f64, longitude: f64) -> anyhow::Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(anyhow::anyhow!(
                "Latitude {latitude} is out of range. Allowed range: -90.0 .. 90.0."
            ));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(anyhow::anyhow!(
                "Longitude {longitude} is out of range. Allowed range: -180.0 .. 180.0."
            ));
        }

        Ok(Self { latitude, longitude })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gas {
    Co2,
    Co,
    Ch4,
}

impl Gas {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gas::Co2 => "co2",
            Gas::Co => "co",
            Gas::Ch4 => "ch4",
        }
    }

    /// Display label used in tables and chart legends.
    pub fn label(&self) -> &'static str {
        match self {
            Gas::Co2 => "CO2",
            Gas::Co => "CO",
            Gas::Ch4 => "CH4",
        }
    }

    pub const fn all() -> &'static [Gas] {
        &[Gas::Co2, Gas::Co, Gas::Ch4]
    }
}

impl std::fmt::Display for Gas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Gas {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "co2" => Ok(Gas::Co2),
            "co" => Ok(Gas::Co),
            "ch4" => Ok(Gas::Ch4),
            _ => Err(anyhow::anyhow!(
                "Unknown gas '{value}'. Supported gases: co2, co, ch4."
            )),
        }
    }
}

/// The three independent gas toggles. CO2 is on by default, matching the
/// dashboard's initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSelection {
    pub co2: bool,
    pub co: bool,
    pub ch4: bool,
}

impl Default for GasSelection {
    fn default() -> Self {
        Self { co2: true, co: false, ch4: false }
    }
}

impl GasSelection {
    pub fn none() -> Self {
        Self { co2: false, co: false, ch4: false }
    }

    pub fn is_enabled(&self, gas: Gas) -> bool {
        match gas {
            Gas::Co2 => self.co2,
            Gas::Co => self.co,
            Gas::Ch4 => self.ch4,
        }
    }

    pub fn enable(&mut self, gas: Gas) {
        match gas {
            Gas::Co2 => self.co2 = true,
            Gas::Co => self.co = true,
            Gas::Ch4 => self.ch4 = true,
        }
    }

    /// Enabled gases in canonical order.
    pub fn enabled(&self) -> Vec<Gas> {
        Gas::all().iter().copied().filter(|g| self.is_enabled(*g)).collect()
    }
}

/// One model input vector: the same (lat, lon) for every forecast day, plus
/// the ordinal day-of-year (1..=366) derived from a real calendar date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub latitude: f64,
    pub longitude: f64,
    pub day_of_year: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One predicted value per forecast day, index-aligned with the feature rows
/// that produced it.
pub type PredictionSeries = Vec<PredictionPoint>;

/// Point-in-time pollutant snapshot: component name (e.g. "co", "no2") to
/// concentration in μg/m³.
pub type AirQualityReading = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub components: BTreeMap<String, f64>,
}

pub type AirQualityForecast = Vec<ForecastPoint>;

/// Predicted and remote-forecast CO values, both truncated to the shorter
/// length and aligned by index position.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSeries {
    pub predicted: Vec<f64>,
    pub forecast: Vec<f64>,
}

impl ComparisonSeries {
    pub fn len(&self) -> usize {
        self.predicted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicted.is_empty()
    }
}
