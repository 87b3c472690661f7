//! Run configuration for the cut and selection stages.
//!
//! Every field has a default matching the published pipeline, so an empty
//! JSON object is a valid configuration file.

use super::constants::{
    BIRTHLINE_INTERCEPT, BIRTHLINE_SLOPE, DEFAULT_CRITICAL_DELTA_PROB, LOG_TEMPERATURE_FLOOR,
    SOLAR_TEMPERATURE_K,
};
use crate::domain::{SedError, SedResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CutThresholds {
    pub log_temperature_floor: f64,
    pub birthline_slope: f64,
    pub birthline_intercept: f64,
    pub solar_temperature: f64,
}

impl Default for CutThresholds {
    fn default() -> Self {
        Self {
            log_temperature_floor: LOG_TEMPERATURE_FLOOR,
            birthline_slope: BIRTHLINE_SLOPE,
            birthline_intercept: BIRTHLINE_INTERCEPT,
            solar_temperature: SOLAR_TEMPERATURE_K,
        }
    }
}

impl CutThresholds {
    pub fn temperature_floor(&self) -> f64 {
        10f64.powf(self.log_temperature_floor)
    }

    /// Minimum allowed log10 luminosity at `log_temperature`.
    pub fn birthline_log_luminosity(&self, log_temperature: f64) -> f64 {
        self.birthline_slope * log_temperature + self.birthline_intercept
    }

    pub fn validate(&self) -> SedResult<()> {
        for (name, value) in [
            ("logTemperatureFloor", self.log_temperature_floor),
            ("birthlineSlope", self.birthline_slope),
            ("birthlineIntercept", self.birthline_intercept),
        ] {
            if !value.is_finite() {
                return Err(SedError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if !(self.solar_temperature.is_finite() && self.solar_temperature > 0.0) {
            return Err(SedError::InvalidConfig(format!(
                "solarTemperature must be finite and > 0, got {}",
                self.solar_temperature
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectionConfig {
    /// Delta-chi-squared allowance per data point (Robitaille 2017, eq. 20).
    pub critical_delta_prob: f64,
    /// Treat files carrying neither family marker as `sp_s_i_01`.
    pub assume_disk_only_without_markers: bool,
    pub thresholds: CutThresholds,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            critical_delta_prob: DEFAULT_CRITICAL_DELTA_PROB,
            assume_disk_only_without_markers: false,
            thresholds: CutThresholds::default(),
        }
    }
}

impl SelectionConfig {
    pub fn validate(&self) -> SedResult<()> {
        validate_critical_delta_prob(self.critical_delta_prob)?;
        self.thresholds.validate()
    }
}

pub fn validate_critical_delta_prob(value: f64) -> SedResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SedError::InvalidConfig(format!(
            "critical delta probability must be finite and > 0, got {value}"
        )))
    }
}

pub fn load_selection_config(path: impl AsRef<Path>) -> SedResult<SelectionConfig> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| SedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: SelectionConfig =
        serde_json::from_str(&source).map_err(|source| SedError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}
