use super::acceptance::AcceptedSource;
use crate::domain::Regime;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Final pick for one source: the winning family's record and its regime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionRow {
    #[serde(flatten)]
    pub accepted: AcceptedSource,
    pub regime: Regime,
}

impl SelectionRow {
    pub fn name(&self) -> &str {
        &self.accepted.source.name
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RegimeSelection {
    pub rows: Vec<SelectionRow>,
    /// Requested identifiers with no result in either regime.
    pub omitted: Vec<String>,
}

fn index_by_name(rows: Vec<AcceptedSource>) -> HashMap<String, AcceptedSource> {
    let mut by_name = HashMap::with_capacity(rows.len());
    for row in rows {
        by_name.entry(row.source.name.clone()).or_insert(row);
    }
    by_name
}

/// Prefers the survey result whenever one exists, regardless of chi-squared;
/// falls back to the IR result.
///
/// Without `master_ids` the order is IR first-seen, then survey-only sources.
/// Repeated identifiers are reported once.
pub fn select_regime(
    ir: Vec<AcceptedSource>,
    survey: Vec<AcceptedSource>,
    master_ids: Option<&[String]>,
) -> RegimeSelection {
    let identifiers: Vec<String> = match master_ids {
        Some(ids) => ids.to_vec(),
        None => ir
            .iter()
            .chain(&survey)
            .map(|row| row.source.name.clone())
            .collect(),
    };
    let mut ir = index_by_name(ir);
    let mut survey = index_by_name(survey);

    let mut selection = RegimeSelection::default();
    let mut seen = HashSet::new();
    for name in identifiers {
        if !seen.insert(name.clone()) {
            continue;
        }
        let picked = match survey.remove(&name) {
            Some(accepted) => Some((accepted, Regime::Survey)),
            None => ir.remove(&name).map(|accepted| (accepted, Regime::Ir)),
        };
        match picked {
            Some((accepted, regime)) => selection.rows.push(SelectionRow { accepted, regime }),
            None => {
                debug!(source = %name, "no fit in either regime");
                selection.omitted.push(name);
            }
        }
    }

    let from_survey = selection
        .rows
        .iter()
        .filter(|row| row.regime == Regime::Survey)
        .count();
    info!(
        selected = selection.rows.len(),
        survey = from_survey,
        ir = selection.rows.len() - from_survey,
        omitted = selection.omitted.len(),
        "arbitrated regimes"
    );
    selection
}
