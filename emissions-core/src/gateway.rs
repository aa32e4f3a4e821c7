use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::info;

use crate::model::{FeatureRow, Gas};

/// A pre-trained regression model: one output per input row.
///
/// The gateway deliberately performs no validation of feature ranges;
/// out-of-range lat/lon or day-of-year values are passed through to the
/// model unchecked, exactly as the training pipeline documents.
pub trait Regressor: Send + Sync + Debug {
    fn predict(&self, rows: &[FeatureRow]) -> Vec<f64>;
}

/// Failure to bring up a model artifact. This is fatal: the process cannot
/// serve predictions without all three models.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to read model artifact {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Linear regressor over (latitude, longitude, day-of-year), deserialized
/// from a JSON artifact produced by the training pipeline. The artifact
/// format is owned by that pipeline; this side only exercises the predict
/// capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub weights: [f64; 3],
    pub intercept: f64,
}

impl Regressor for LinearModel {
    fn predict(&self, rows: &[FeatureRow]) -> Vec<f64> {
        rows.iter()
            .map(|row| {
                self.weights[0] * row.latitude
                    + self.weights[1] * row.longitude
                    + self.weights[2] * f64::from(row.day_of_year)
                    + self.intercept
            })
            .collect()
    }
}

/// Holds the three loaded per-gas models for the lifetime of the process.
/// Read-only after load; inference is a stateless call.
#[derive(Debug)]
pub struct ModelGateway {
    co2: Box<dyn Regressor>,
    co: Box<dyn Regressor>,
    ch4: Box<dyn Regressor>,
}

impl ModelGateway {
    /// Load the three per-gas artifacts from `dir` at startup.
    pub fn load(dir: &Path) -> Result<Self, GatewayError> {
        let gateway = Self {
            co2: Box::new(load_artifact(dir, Gas::Co2)?),
            co: Box::new(load_artifact(dir, Gas::Co)?),
            ch4: Box::new(load_artifact(dir, Gas::Ch4)?),
        };

        info!(dir = %dir.display(), "loaded model artifacts for co2, co, ch4");
        Ok(gateway)
    }

    /// Assemble a gateway from arbitrary regressors. Lets callers swap in
    /// stubs without touching the pipeline logic.
    pub fn from_models(
        co2: Box<dyn Regressor>,
        co: Box<dyn Regressor>,
        ch4: Box<dyn Regressor>,
    ) -> Self {
        Self { co2, co, ch4 }
    }

    pub fn model(&self, gas: Gas) -> &dyn Regressor {
        match gas {
            Gas::Co2 => self.co2.as_ref(),
            Gas::Co => self.co.as_ref(),
            Gas::Ch4 => self.ch4.as_ref(),
        }
    }

    /// Batch prediction for one gas: one output per input row.
    pub fn predict(&self, gas: Gas, rows: &[FeatureRow]) -> Vec<f64> {
        self.model(gas).predict(rows)
    }
}

/// Artifact file name for a gas, e.g. `greenhouse_gas_model_co2.json`.
pub fn artifact_file_name(gas: Gas) -> String {
    format!("greenhouse_gas_model_{gas}.json")
}

fn load_artifact(dir: &Path, gas: Gas) -> Result<LinearModel, GatewayError> {
    let path = dir.join(artifact_file_name(gas));

    let contents = fs::read_to_string(&path)
        .map_err(|source| GatewayError::Read { path: path.clone(), source })?;

    serde_json::from_str(&contents).map_err(|source| GatewayError::Parse { path, source })
}
