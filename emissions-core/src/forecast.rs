use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::{
    gateway::ModelGateway,
    model::{Coordinate, FeatureRow, Gas, GasSelection, PredictionPoint, PredictionSeries},
};

/// Number of future days the dashboard predicts.
pub const FORECAST_HORIZON_DAYS: u32 = 60;

/// Consecutive calendar dates starting at `start` (inclusive).
pub fn forecast_dates(start: NaiveDate, horizon_days: u32) -> Vec<NaiveDate> {
    (0..horizon_days).map(|i| start + Duration::days(i64::from(i))).collect()
}

/// Ordinal day-of-year, 1..=365 (366 in leap years).
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// One feature row per date, sharing the same coordinate on every row.
pub fn feature_rows(coord: Coordinate, dates: &[NaiveDate]) -> Vec<FeatureRow> {
    dates
        .iter()
        .map(|date| FeatureRow {
            latitude: coord.latitude,
            longitude: coord.longitude,
            day_of_year: day_of_year(*date),
        })
        .collect()
}

/// Run one batch prediction per enabled gas over the full horizon.
///
/// Gases that are not enabled are omitted from the result entirely; there
/// are no placeholder series. Disabling all gases yields an empty map.
pub fn generate(
    gateway: &ModelGateway,
    coord: Coordinate,
    start: NaiveDate,
    horizon_days: u32,
    selection: &GasSelection,
) -> BTreeMap<Gas, PredictionSeries> {
    let dates = forecast_dates(start, horizon_days);
    let rows = feature_rows(coord, &dates);

    let mut predictions = BTreeMap::new();
    for gas in selection.enabled() {
        let values = gateway.predict(gas, &rows);

        let series: PredictionSeries = dates
            .iter()
            .zip(values)
            .map(|(date, value)| PredictionPoint { date: *date, value })
            .collect();

        predictions.insert(gas, series);
    }

    predictions
}
