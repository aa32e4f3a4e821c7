use crate::model::{AirQualityForecast, ComparisonSeries, PredictionSeries};

/// Pollutant component key carrying carbon monoxide in API payloads.
pub const CO_COMPONENT: &str = "co";

/// Outcome of the predicted-vs-forecast CO comparison.
///
/// `CoDisabled` and `ForecastUnavailable` are distinct on purpose: the
/// first asks the user to flip a toggle, the second reports degraded
/// remote data. They must not be conflated in the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum CoComparison {
    Ready(ComparisonSeries),
    CoDisabled,
    ForecastUnavailable,
}

/// Truncate both series to the shorter length.
///
/// Alignment is by index position only: predicted day `i` is compared
/// against forecast entry `i`, even though the underlying timestamps may
/// not coincide. This mirrors the dashboard's behavior; no timestamp
/// reconciliation is attempted.
pub fn compare(predicted: &[f64], forecast: &[f64]) -> ComparisonSeries {
    let len = predicted.len().min(forecast.len());

    ComparisonSeries {
        predicted: predicted[..len].to_vec(),
        forecast: forecast[..len].to_vec(),
    }
}

/// Build the CO comparison for one render cycle.
pub fn co_comparison(
    co_enabled: bool,
    predicted_co: Option<&PredictionSeries>,
    forecast: Option<&AirQualityForecast>,
) -> CoComparison {
    let Some(forecast) = forecast else {
        return CoComparison::ForecastUnavailable;
    };

    if !co_enabled {
        return CoComparison::CoDisabled;
    }
    let Some(predicted) = predicted_co else {
        return CoComparison::CoDisabled;
    };

    let predicted_values: Vec<f64> = predicted.iter().map(|p| p.value).collect();
    let forecast_values: Vec<f64> = forecast
        .iter()
        .filter_map(|point| point.components.get(CO_COMPONENT).copied())
        .collect();

    CoComparison::Ready(compare(&predicted_values, &forecast_values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForecastPoint, PredictionPoint};
    use chrono::{DateTime, NaiveDate, Utc};
    use std::collections::BTreeMap;

    fn prediction(values: &[f64]) -> PredictionSeries {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| PredictionPoint {
                date: start + chrono::Duration::days(i as i64),
                value: *v,
            })
            .collect()
    }

    fn forecast(co_values: &[f64]) -> AirQualityForecast {
        co_values
            .iter()
            .enumerate()
            .map(|(i, v)| ForecastPoint {
                timestamp: DateTime::from_timestamp(1_700_000_000 + i as i64 * 10_800, 0)
                    .unwrap_or_else(Utc::now),
                components: BTreeMap::from([(CO_COMPONENT.to_string(), *v)]),
            })
            .collect()
    }

    #[test]
    fn compare_truncates_to_shorter_length() {
        let series = compare(&[1.0, 2.0, 3.0], &[10.0, 20.0]);
        assert_eq!(series.predicted, vec![1.0, 2.0]);
        assert_eq!(series.forecast, vec![10.0, 20.0]);
    }

    #[test]
    fn compare_with_empty_side_yields_empty_series() {
        let series = compare(&[], &[1.0]);
        assert!(series.is_empty());
        assert!(series.forecast.is_empty());
    }

    #[test]
    fn disabled_co_is_distinct_from_missing_forecast() {
        let fc = forecast(&[1.0]);

        let out = co_comparison(false, None, Some(&fc));
        assert_eq!(out, CoComparison::CoDisabled);

        let out = co_comparison(true, Some(&prediction(&[1.0])), None);
        assert_eq!(out, CoComparison::ForecastUnavailable);
    }

    #[test]
    fn missing_forecast_wins_over_disabled_toggle() {
        // Without forecast data there is nothing to compare against,
        // whatever the toggle says.
        let out = co_comparison(false, None, None);
        assert_eq!(out, CoComparison::ForecastUnavailable);
    }

    #[test]
    fn ready_comparison_pairs_values_by_index() {
        let pred = prediction(&[1.0, 2.0, 3.0]);
        let fc = forecast(&[10.0, 20.0]);

        let CoComparison::Ready(series) = co_comparison(true, Some(&pred), Some(&fc)) else {
            panic!("expected a ready comparison");
        };

        assert_eq!(series.predicted, vec![1.0, 2.0]);
        assert_eq!(series.forecast, vec![10.0, 20.0]);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn forecast_entries_without_co_component_are_skipped() {
        let pred = prediction(&[1.0, 2.0]);
        let mut fc = forecast(&[10.0, 20.0]);
        fc[0].components.clear();

        let CoComparison::Ready(series) = co_comparison(true, Some(&pred), Some(&fc)) else {
            panic!("expected a ready comparison");
        };

        assert_eq!(series.forecast, vec![20.0]);
    }
}
