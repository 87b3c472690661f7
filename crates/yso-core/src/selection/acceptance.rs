use crate::common::validate_critical_delta_prob;
use crate::domain::{ModelFamily, SedError, SedResult};
use crate::extract::{ModelSet, SourceModelSet};
use crate::numerics::finite_min;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// A source's candidates within the delta-chi-squared window of its best fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedSource {
    #[serde(flatten)]
    pub source: SourceModelSet,
    pub family: ModelFamily,
    pub best_chi2: f64,
    pub n_good: usize,
    /// Fraction of the family's grid that is statistically acceptable.
    pub p_dm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedSet {
    pub path: PathBuf,
    pub family: Option<ModelFamily>,
    pub sources: Vec<AcceptedSource>,
}

/// Keeps candidates with `chi2 - best_chi2 <= critical_delta_prob * n_data`
/// and scores each source by `n_good / grid_size`.
pub fn accept(set: ModelSet, critical_delta_prob: f64) -> SedResult<AcceptedSet> {
    validate_critical_delta_prob(critical_delta_prob)?;
    let ModelSet {
        path,
        family,
        sources,
    } = set;

    let Some(family) = family else {
        if sources.is_empty() {
            return Ok(AcceptedSet {
                path,
                family: None,
                sources: Vec::new(),
            });
        }
        return Err(SedError::InvalidInput(format!(
            "'{}' has sources but no model family",
            path.display()
        )));
    };

    let mut accepted = Vec::with_capacity(sources.len());
    for source in sources {
        match accept_source(source, family, critical_delta_prob)? {
            Some(source) => accepted.push(source),
            None => debug!(path = %path.display(), "skipped source without finite chi-squared"),
        }
    }

    Ok(AcceptedSet {
        path,
        family: Some(family),
        sources: accepted,
    })
}

/// `None` when the source has no finite chi-squared to anchor the window.
pub fn accept_source(
    mut source: SourceModelSet,
    family: ModelFamily,
    critical_delta_prob: f64,
) -> SedResult<Option<AcceptedSource>> {
    let chi2 = source.chi2();
    let Some(best_chi2) = finite_min(chi2) else {
        return Ok(None);
    };
    if chi2.first().is_some_and(|&first| first != best_chi2) {
        warn!(
            source = %source.name,
            first = chi2[0],
            best = best_chi2,
            "chi-squared column is not sorted ascending; using its minimum"
        );
    }

    let window = critical_delta_prob * f64::from(source.n_data);
    let keep: Vec<bool> = chi2.iter().map(|&value| value - best_chi2 <= window).collect();
    source.retain_mask(&keep)?;

    let n_good = source.candidates.len();
    Ok(Some(AcceptedSource {
        source,
        family,
        best_chi2,
        n_good,
        p_dm: n_good as f64 / family.grid_size() as f64,
    }))
}
