use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;

use crate::{
    client::AirQualitySource,
    compare::{CoComparison, co_comparison},
    forecast::{FORECAST_HORIZON_DAYS, generate},
    gateway::ModelGateway,
    model::{AirQualityForecast, AirQualityReading, Coordinate, Gas, GasSelection, PredictionSeries},
};

/// Everything the user can change between render cycles.
#[derive(Debug, Clone)]
pub struct DashboardInputs {
    pub coord: Coordinate,
    pub gases: GasSelection,
    pub start_date: NaiveDate,
}

impl Default for DashboardInputs {
    fn default() -> Self {
        Self {
            coord: Coordinate::NEW_YORK,
            gases: GasSelection::default(),
            start_date: Utc::now().date_naive(),
        }
    }
}

/// Output of one render cycle, ready for presentation.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub predictions: BTreeMap<Gas, PredictionSeries>,
    pub current: Option<AirQualityReading>,
    pub forecast: Option<AirQualityForecast>,
    pub co_comparison: CoComparison,
}

/// Run one full render cycle: predictions for every enabled gas, the two
/// remote fetches, and the CO comparison.
///
/// Everything is recomputed from scratch on every call; nothing is cached
/// across cycles. The two remote calls run sequentially, in a fixed order,
/// after model inference.
pub async fn render(
    inputs: &DashboardInputs,
    gateway: &ModelGateway,
    source: &dyn AirQualitySource,
) -> DashboardSnapshot {
    let predictions = generate(
        gateway,
        inputs.coord,
        inputs.start_date,
        FORECAST_HORIZON_DAYS,
        &inputs.gases,
    );

    let current = source.current(inputs.coord).await;
    let forecast = source.forecast(inputs.coord).await;

    let co_comparison =
        co_comparison(inputs.gases.co, predictions.get(&Gas::Co), forecast.as_ref());

    DashboardSnapshot { predictions, current, forecast, co_comparison }
}
