//! Physical-plausibility filtering of parsed candidates.

mod luminosity;

pub use luminosity::{luminosity_column, stellar_luminosity};

use crate::common::CutThresholds;
use crate::domain::{Parameter, SedError, SedResult};
use crate::extract::{ModelSet, SourceModelSet};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// The source header was followed by no candidate lines.
    NoCandidates,
    TemperatureFloor,
    Birthline,
}

impl Display for RemovalReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NoCandidates => "no_candidates",
            Self::TemperatureFloor => "temperature_floor",
            Self::Birthline => "birthline",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedSource {
    pub name: String,
    pub reason: RemovalReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutOutcome {
    pub set: ModelSet,
    pub removed: Vec<RemovedSource>,
}

/// Runs the temperature floor, luminosity derivation and birthline cut.
///
/// Every surviving source has at least one candidate and a `lum` column.
pub fn apply_physical_cuts(set: ModelSet, thresholds: &CutThresholds) -> SedResult<CutOutcome> {
    thresholds.validate()?;
    let ModelSet {
        path,
        family,
        sources,
    } = set;

    let mut kept = Vec::with_capacity(sources.len());
    let mut removed = Vec::new();
    for mut source in sources {
        match cut_source(&mut source, thresholds)? {
            Some(reason) => {
                info!(
                    path = %path.display(),
                    source = %source.name,
                    reason = %reason,
                    "removed source with no plausible candidates"
                );
                removed.push(RemovedSource {
                    name: source.name,
                    reason,
                });
            }
            None => kept.push(source),
        }
    }

    let set = ModelSet {
        path,
        family,
        sources: kept,
    };
    debug!(
        path = %set.path.display(),
        kept = set.sources.len(),
        removed = removed.len(),
        candidates = set.candidate_count(),
        "applied physical cuts"
    );
    Ok(CutOutcome { set, removed })
}

fn cut_source(
    source: &mut SourceModelSet,
    thresholds: &CutThresholds,
) -> SedResult<Option<RemovalReason>> {
    if source.candidates.is_empty() {
        return Ok(Some(RemovalReason::NoCandidates));
    }
    apply_temperature_floor(source, thresholds.temperature_floor())?;
    if source.candidates.is_empty() {
        return Ok(Some(RemovalReason::TemperatureFloor));
    }
    derive_luminosity(source, thresholds.solar_temperature)?;
    apply_birthline(source, thresholds)?;
    if source.candidates.is_empty() {
        return Ok(Some(RemovalReason::Birthline));
    }
    Ok(None)
}

fn required_column<'a>(source: &'a SourceModelSet, parameter: Parameter) -> SedResult<&'a [f64]> {
    source.candidates.column(parameter).ok_or_else(|| {
        SedError::InvalidInput(format!(
            "source '{}' has no `{parameter}` column",
            source.name
        ))
    })
}

/// Drops candidates cooler than `floor` kelvin; returns the number removed.
pub fn apply_temperature_floor(source: &mut SourceModelSet, floor: f64) -> SedResult<usize> {
    let keep: Vec<bool> = required_column(source, Parameter::StarTemperature)?
        .iter()
        .map(|&temperature| temperature >= floor)
        .collect();
    source.retain_mask(&keep)
}

/// Appends the `lum` column derived from star radius and temperature.
pub fn derive_luminosity(source: &mut SourceModelSet, solar_temperature: f64) -> SedResult<()> {
    let radii = required_column(source, Parameter::StarRadius)?;
    let temperatures = required_column(source, Parameter::StarTemperature)?;
    let luminosities = luminosity_column(radii, temperatures, solar_temperature)
        .ok_or_else(|| {
            SedError::InvalidInput(format!(
                "source '{}' has misaligned radius and temperature columns",
                source.name
            ))
        })?;
    source
        .candidates
        .insert_column(Parameter::Luminosity, luminosities)
}

/// Drops candidates below the birthline; needs the `lum` column.
pub fn apply_birthline(source: &mut SourceModelSet, thresholds: &CutThresholds) -> SedResult<usize> {
    let temperatures = required_column(source, Parameter::StarTemperature)?;
    let luminosities = required_column(source, Parameter::Luminosity)?;
    let keep: Vec<bool> = temperatures
        .iter()
        .zip(luminosities)
        .map(|(&temperature, &luminosity)| {
            luminosity.log10() >= thresholds.birthline_log_luminosity(temperature.log10())
        })
        .collect();
    source.retain_mask(&keep)
}

#[cfg(test)]
mod tests {
    use super::{
        RemovalReason, apply_birthline, apply_physical_cuts, apply_temperature_floor,
        derive_luminosity,
    };
    use crate::common::CutThresholds;
    use crate::domain::{ModelFamily, Parameter};
    use crate::extract::{CandidateTable, ModelSet, SourceModelSet};
    use std::collections::BTreeMap;

    fn source(name: &str, chi2: &[f64], radius: &[f64], temperature: &[f64]) -> SourceModelSet {
        let table = CandidateTable::from_columns(BTreeMap::from([
            (Parameter::Chi2, chi2.to_vec()),
            (Parameter::StarRadius, radius.to_vec()),
            (Parameter::StarTemperature, temperature.to_vec()),
        ]))
        .expect("columns should align");
        SourceModelSet::new(name.to_string(), 6, chi2.len() as u32, table)
    }

    fn set(sources: Vec<SourceModelSet>) -> ModelSet {
        ModelSet {
            path: "pars.txt".into(),
            family: Some(ModelFamily::DiskInnerHole),
            sources,
        }
    }

    #[test]
    fn temperature_floor_uses_log_threshold() {
        let floor = CutThresholds::default().temperature_floor();
        let mut s = source("A", &[1.0, 2.0, 3.0], &[1.0; 3], &[3000.0, 3981.1, 3981.0]);
        let removed = apply_temperature_floor(&mut s, floor).expect("cut should apply");
        assert_eq!(removed, 2);
        assert_eq!(s.chi2(), &[2.0]);
        assert_eq!(s.n_fits, 1);
    }

    #[test]
    fn birthline_drops_underluminous_candidates() {
        let thresholds = CutThresholds::default();
        // log L limit at T = 5000 K is 5.5 * 3.699 - 20.7 = -0.356.
        let mut s = source("A", &[1.0, 2.0], &[1.0, 0.1], &[5000.0, 5000.0]);
        derive_luminosity(&mut s, thresholds.solar_temperature).expect("lum should derive");
        let removed = apply_birthline(&mut s, &thresholds).expect("cut should apply");
        assert_eq!(removed, 1);
        assert_eq!(s.chi2(), &[1.0]);
    }

    #[test]
    fn emptied_sources_are_reported_with_reason() {
        let outcome = apply_physical_cuts(
            set(vec![
                source("cold", &[1.0, 2.0], &[1.0, 1.0], &[3000.0, 2000.0]),
                source("faint", &[1.0], &[0.01], &[5000.0]),
                source("kept", &[1.0, 5.0], &[2.0, 2.0], &[3000.0, 6000.0]),
                source("bare", &[], &[], &[]),
            ]),
            &CutThresholds::default(),
        )
        .expect("cuts should apply");

        let removed: Vec<(&str, RemovalReason)> = outcome
            .removed
            .iter()
            .map(|r| (r.name.as_str(), r.reason))
            .collect();
        assert_eq!(
            removed,
            vec![
                ("cold", RemovalReason::TemperatureFloor),
                ("faint", RemovalReason::Birthline),
                ("bare", RemovalReason::NoCandidates),
            ]
        );
        assert_eq!(outcome.set.sources.len(), 1);
        let kept = &outcome.set.sources[0];
        assert_eq!(kept.n_fits, 1);
        assert_eq!(kept.init_n_fits, 2);
        assert_eq!(kept.chi2(), &[5.0]);
        let lum = kept.candidates.column(Parameter::Luminosity).expect("lum column");
        assert!((lum[0] - 4.0 * (6000.0f64 / 5772.0).powi(4)).abs() < 1.0e-12);
    }

    #[test]
    fn cuts_never_increase_candidate_counts() {
        let input = set(vec![
            source("a", &[1.0, 2.0, 3.0], &[1.0, 0.5, 3.0], &[4500.0, 3500.0, 9000.0]),
            source("b", &[4.0, 5.0], &[0.2, 1.5], &[4100.0, 4200.0]),
        ]);
        let before: Vec<usize> = input.sources.iter().map(|s| s.candidates.len()).collect();
        let outcome = apply_physical_cuts(input.clone(), &CutThresholds::default())
            .expect("cuts should apply");
        for kept in &outcome.set.sources {
            let index = input
                .sources
                .iter()
                .position(|s| s.name == kept.name)
                .expect("kept source should exist in input");
            assert!(kept.candidates.len() <= before[index]);
            assert!(!kept.candidates.is_empty());
        }
    }
}
