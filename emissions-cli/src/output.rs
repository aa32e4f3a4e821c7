//! Text rendering of a dashboard snapshot.
//!
//! Stands in for the original dashboard's charts: a prediction table, an
//! ASCII bar chart of current components, the forecast CO series, and the
//! predicted-vs-forecast CO comparison.

use emissions_core::{
    AirQualityForecast, AirQualityReading, CoComparison, ComparisonSeries, DashboardInputs,
    DashboardSnapshot, Gas, PredictionSeries,
};
use std::collections::BTreeMap;

const BAR_WIDTH: usize = 40;

pub fn render_snapshot(inputs: &DashboardInputs, snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();

    out.push_str("Greenhouse gas predictions for the next 60 days\n");
    out.push_str("===============================================\n\n");

    out.push_str(&prediction_table(&snapshot.predictions));
    out.push('\n');

    out.push_str("Real-time air quality\n---------------------\n");
    match &snapshot.current {
        Some(reading) => out.push_str(&component_bars(reading)),
        None => out.push_str(
            "Real-time air quality data is currently unavailable. \
             Please check your internet connection or try again later.\n",
        ),
    }
    out.push('\n');

    out.push_str("Air quality forecast (CO)\n-------------------------\n");
    match &snapshot.forecast {
        Some(forecast) => {
            out.push_str(&forecast_co_table(forecast));
            out.push('\n');
            out.push_str("Predicted vs forecast CO\n------------------------\n");
            match &snapshot.co_comparison {
                CoComparison::Ready(series) => out.push_str(&comparison_table(series)),
                CoComparison::CoDisabled => out.push_str(
                    "Enable CO (--gases co2,co) to see the comparison between \
                     predicted and forecast CO values.\n",
                ),
                // Unreachable while forecast data is present; nothing to add.
                CoComparison::ForecastUnavailable => {}
            }
        }
        None => out.push_str(
            "Air quality forecast data is currently unavailable. \
             Please check your internet connection or try again later.\n",
        ),
    }
    out.push('\n');

    out.push_str(&format!(
        "Location: {:.4}, {:.4}\n\n",
        inputs.coord.latitude, inputs.coord.longitude
    ));

    out.push_str(
        "Predictions come from models trained on synthetic data based on \
         real-world patterns.\nDisclaimer: real-world gas concentrations may \
         vary significantly from these predictions.\n",
    );

    out
}

fn prediction_table(predictions: &BTreeMap<Gas, PredictionSeries>) -> String {
    let mut out = String::new();

    if predictions.is_empty() {
        out.push_str("No gases enabled. Use --gases to pick at least one of co2, co, ch4.\n");
        return out;
    }

    out.push_str(&format!("{:<12}", "Date"));
    for gas in predictions.keys() {
        out.push_str(&format!("{:>12}", gas.label()));
    }
    out.push('\n');

    // All series share the same date sequence; take it from the first.
    let dates: Vec<_> = predictions
        .values()
        .next()
        .map(|series| series.iter().map(|p| p.date).collect())
        .unwrap_or_default();

    for (i, date) in dates.iter().enumerate() {
        out.push_str(&format!("{:<12}", date.format("%Y-%m-%d")));
        for series in predictions.values() {
            out.push_str(&format!("{:>12.4}", series[i].value));
        }
        out.push('\n');
    }

    out
}

fn component_bars(reading: &AirQualityReading) -> String {
    let mut out = String::new();

    let max = reading.values().copied().fold(0.0_f64, f64::max);

    for (name, value) in reading {
        let bar_len = if max > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{name:<6} {value:>10.2} μg/m³  {}\n",
            "#".repeat(bar_len)
        ));
    }

    out
}

fn forecast_co_table(forecast: &AirQualityForecast) -> String {
    let mut out = String::new();

    for point in forecast {
        match point.components.get("co") {
            Some(co) => out.push_str(&format!(
                "{}  {co:>10.2} μg/m³\n",
                point.timestamp.format("%Y-%m-%d %H:%M UTC")
            )),
            None => continue,
        }
    }

    if out.is_empty() {
        out.push_str("Forecast contained no CO readings.\n");
    }

    out
}

fn comparison_table(series: &ComparisonSeries) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:<8}{:>14}{:>14}\n",
        "Point", "Predicted CO", "Forecast CO"
    ));
    for (i, (predicted, forecast)) in
        series.predicted.iter().zip(&series.forecast).enumerate()
    {
        out.push_str(&format!("{i:<8}{predicted:>14.2}{forecast:>14.2}\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use emissions_core::PredictionPoint;

    #[test]
    fn prediction_table_has_one_row_per_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let series = vec![
            PredictionPoint { date, value: 410.5 },
            PredictionPoint { date: date.succ_opt().unwrap(), value: 411.0 },
        ];
        let predictions = BTreeMap::from([(Gas::Co2, series)]);

        let table = prediction_table(&predictions);
        assert!(table.contains("CO2"));
        assert!(table.contains("2024-03-01"));
        assert!(table.contains("2024-03-02"));
        assert_eq!(table.lines().count(), 3);
    }

    #[test]
    fn empty_predictions_print_a_hint() {
        let table = prediction_table(&BTreeMap::new());
        assert!(table.contains("No gases enabled"));
    }

    #[test]
    fn component_bars_scale_to_the_largest_value() {
        let reading = AirQualityReading::from([
            ("co".to_string(), 100.0),
            ("no2".to_string(), 50.0),
        ]);

        let bars = component_bars(&reading);
        let co_line = bars.lines().find(|l| l.starts_with("co ")).unwrap();
        let no2_line = bars.lines().find(|l| l.starts_with("no2")).unwrap();

        assert_eq!(co_line.matches('#').count(), BAR_WIDTH);
        assert_eq!(no2_line.matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn comparison_table_pairs_rows_by_index() {
        let series = ComparisonSeries {
            predicted: vec![1.0, 2.0],
            forecast: vec![10.0, 20.0],
        };

        let table = comparison_table(&series);
        assert!(table.contains("Predicted CO"));
        assert_eq!(table.lines().count(), 3);
    }
}
