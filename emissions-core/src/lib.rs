//! Core library for the `emissions` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The gateway over pre-trained per-gas regression models
//! - The air quality client for the OpenWeatherMap air pollution API
//! - The forecast generator and the predicted-vs-forecast comparison
//!
//! It is used by `emissions-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod compare;
pub mod config;
pub mod forecast;
pub mod gateway;
pub mod model;
pub mod pipeline;

pub use client::{AirQualityClient, AirQualitySource, StaticAirQualitySource};
pub use compare::{CoComparison, co_comparison, compare};
pub use config::Config;
pub use forecast::{FORECAST_HORIZON_DAYS, generate};
pub use gateway::{GatewayError, LinearModel, ModelGateway, Regressor};
pub use model::{
    AirQualityForecast, AirQualityReading, ComparisonSeries, Coordinate, FeatureRow, ForecastPoint,
    Gas, GasSelection, PredictionPoint, PredictionSeries,
};
pub use pipeline::{DashboardInputs, DashboardSnapshot, render};
