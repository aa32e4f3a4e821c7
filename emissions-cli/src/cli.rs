use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use emissions_core::{
    AirQualityClient, Config, Coordinate, DashboardInputs, Gas, GasSelection, ModelGateway, render,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "emissions", version, about = "Greenhouse-gas emissions dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key used for air quality data.
    Configure,

    /// Predict gas concentrations for a location and show air quality data.
    Show {
        /// Latitude in degrees, -90.0 .. 90.0.
        #[arg(long, default_value_t = 40.7128)]
        lat: f64,

        /// Longitude in degrees, -180.0 .. 180.0.
        #[arg(long, default_value_t = -74.0060)]
        lon: f64,

        /// Comma-separated gases to predict: co2, co, ch4.
        #[arg(long, default_value = "co2", value_delimiter = ',')]
        gases: Vec<String>,

        /// Start date (YYYY-MM-DD); if absent, means today.
        #[arg(long)]
        date: Option<String>,

        /// Directory holding the model artifacts; overrides the config.
        #[arg(long)]
        models: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon, gases, date, models } => {
                show(lat, lon, &gases, date.as_deref(), models).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("OpenWeatherMap API key:")
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(
    lat: f64,
    lon: f64,
    gases: &[String],
    date: Option<&str>,
    models: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = Config::load()?;

    let coord = Coordinate::new(lat, lon)?;
    let gases = parse_gases(gases)?;
    let start_date = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{s}'. Expected format: YYYY-MM-DD."))?,
        None => Utc::now().date_naive(),
    };

    let model_dir = models.unwrap_or_else(|| config.model_dir());
    let gateway = ModelGateway::load(&model_dir).with_context(|| {
        format!("Failed to load model artifacts from {}", model_dir.display())
    })?;

    let client = AirQualityClient::from_config(&config)?;

    let inputs = DashboardInputs { coord, gases, start_date };
    let snapshot = render(&inputs, &gateway, &client).await;

    print!("{}", output::render_snapshot(&inputs, &snapshot));
    Ok(())
}

fn parse_gases(names: &[String]) -> anyhow::Result<GasSelection> {
    let mut selection = GasSelection::none();
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            continue;
        }
        selection.enable(Gas::try_from(trimmed)?);
    }
    Ok(selection)
}
