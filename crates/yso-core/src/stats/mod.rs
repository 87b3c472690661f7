//! Simple and chi-squared-weighted parameter means per source.

mod merge;

pub use merge::{DEFAULT_MERGE_PARAMETERS, MergedStatRow, merge_regimes};

use crate::domain::{ModelFamily, Parameter, Regime, SedError, SedResult};
use crate::extract::{CandidateTable, SourceModelSet};
use crate::numerics::{likelihood_weights, stable_mean, stable_weighted_sum};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::debug;

/// Anything that carries one source's candidates and can describe itself.
pub trait CandidateSource {
    fn name(&self) -> &str;
    fn candidates(&self) -> &CandidateTable;
    fn metadata(&self) -> StatMetadata;
}

/// Pass-through columns copied onto every statistics row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatMetadata {
    pub n_data: u32,
    pub n_fits: Option<usize>,
    pub n_good: Option<usize>,
    pub family: Option<ModelFamily>,
    pub regime: Option<Regime>,
}

impl CandidateSource for SourceModelSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn candidates(&self) -> &CandidateTable {
        &self.candidates
    }

    fn metadata(&self) -> StatMetadata {
        StatMetadata {
            n_data: self.n_data,
            n_fits: Some(self.n_fits),
            ..StatMetadata::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterMeans {
    pub avg: f64,
    pub w_avg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedStatRow {
    pub name: String,
    pub metadata: StatMetadata,
    pub means: BTreeMap<Parameter, ParameterMeans>,
}

impl WeightedStatRow {
    pub fn means(&self, parameter: Parameter) -> Option<ParameterMeans> {
        self.means.get(&parameter).copied()
    }
}

/// Flat layout: `name`, metadata, then `<param>_avg` / `<param>_w_avg` pairs.
impl Serialize for WeightedStatRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("n_data", &self.metadata.n_data)?;
        if let Some(n_fits) = self.metadata.n_fits {
            map.serialize_entry("n_fits", &n_fits)?;
        }
        if let Some(n_good) = self.metadata.n_good {
            map.serialize_entry("n_good", &n_good)?;
        }
        if let Some(family) = self.metadata.family {
            map.serialize_entry("family", &family)?;
        }
        if let Some(regime) = self.metadata.regime {
            map.serialize_entry("regime", &regime)?;
        }
        for (parameter, means) in &self.means {
            map.serialize_entry(&format!("{parameter}_avg"), &means.avg)?;
            map.serialize_entry(&format!("{parameter}_w_avg"), &means.w_avg)?;
        }
        map.end()
    }
}

/// Simple mean of `values` and its mean weighted by `exp(-chi2 / 2)`.
pub fn parameter_means(chi2: &[f64], values: &[f64]) -> SedResult<ParameterMeans> {
    let weights = likelihood_weights(chi2).ok_or_else(|| {
        SedError::Computation(format!(
            "cannot normalize likelihood weights over {} chi-squared values",
            chi2.len()
        ))
    })?;
    means_with_weights(&weights, values)
}

fn means_with_weights(weights: &[f64], values: &[f64]) -> SedResult<ParameterMeans> {
    let mismatch = || {
        SedError::InvalidInput(format!(
            "{} parameter values for {} chi-squared values",
            values.len(),
            weights.len()
        ))
    };
    let avg = stable_mean(values).ok_or_else(mismatch)?;
    let w_avg = stable_weighted_sum(values, weights).ok_or_else(mismatch)?;
    // Weights sum to 1 only up to rounding; keep both means inside the data range.
    match value_bounds(values) {
        Some((low, high)) => Ok(ParameterMeans {
            avg: clamp_finite(avg, low, high),
            w_avg: clamp_finite(w_avg, low, high),
        }),
        None => Ok(ParameterMeans { avg, w_avg }),
    }
}

/// Smallest and largest non-NaN value.
fn value_bounds(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|value| !value.is_nan())
        .fold(None, |bounds, value| match bounds {
            None => Some((value, value)),
            Some((low, high)) => Some((low.min(value), high.max(value))),
        })
}

fn clamp_finite(mean: f64, low: f64, high: f64) -> f64 {
    if mean.is_nan() { mean } else { mean.clamp(low, high) }
}

pub fn weighted_stats<S: CandidateSource>(
    sources: &[S],
    parameter: Parameter,
) -> SedResult<Vec<WeightedStatRow>> {
    multi_param_weighted_stats(sources, &[parameter])
}

/// One row per source with a `(avg, w_avg)` pair for each of `parameters`.
pub fn multi_param_weighted_stats<S: CandidateSource>(
    sources: &[S],
    parameters: &[Parameter],
) -> SedResult<Vec<WeightedStatRow>> {
    sources
        .iter()
        .map(|source| source_stats(source, parameters))
        .collect()
}

pub fn source_stats<S: CandidateSource + ?Sized>(
    source: &S,
    parameters: &[Parameter],
) -> SedResult<WeightedStatRow> {
    let candidates = source.candidates();
    let chi2 = candidates.column(Parameter::Chi2).unwrap_or(&[]);
    let weights = likelihood_weights(chi2).ok_or_else(|| {
        SedError::Computation(format!(
            "source '{}': cannot normalize likelihood weights over {} candidates",
            source.name(),
            chi2.len()
        ))
    })?;

    let mut means = BTreeMap::new();
    for &parameter in parameters {
        // Families carry different columns; a source without one simply has no means for it.
        let Some(values) = candidates.column(parameter) else {
            debug!(source = source.name(), %parameter, "no column for parameter; skipping");
            continue;
        };
        means.insert(parameter, means_with_weights(&weights, values)?);
    }

    Ok(WeightedStatRow {
        name: source.name().to_string(),
        metadata: source.metadata(),
        means,
    })
}
