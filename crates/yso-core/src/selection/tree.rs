use super::acceptance::{AcceptedSet, AcceptedSource};
use crate::domain::{ModelFamily, SedError, SedResult};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Picks, per identifier, the family with the lowest `best_chi2`.
///
/// Families are compared in grid order (01, 02, 16, 17) and a later family
/// must be strictly better to replace an earlier one. Identifiers absent from
/// every set are skipped. Without `master_ids` the identifiers are taken in
/// first-seen order over the sets in family order.
pub fn model_tree(
    sets: &[AcceptedSet],
    master_ids: Option<&[String]>,
) -> SedResult<Vec<AcceptedSource>> {
    let mut ordered: Vec<(ModelFamily, &AcceptedSet)> = sets
        .iter()
        .filter_map(|set| set.family.map(|family| (family, set)))
        .collect();
    ordered.sort_by_key(|(family, _)| *family);
    if let Some(pair) = ordered.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(SedError::InvalidInput(format!(
            "model family {} supplied twice ('{}' and '{}')",
            pair[0].0,
            pair[0].1.path.display(),
            pair[1].1.path.display()
        )));
    }

    let lookups: Vec<HashMap<&str, &AcceptedSource>> = ordered
        .iter()
        .map(|(_, set)| {
            let mut by_name = HashMap::with_capacity(set.sources.len());
            for source in &set.sources {
                by_name.entry(source.source.name.as_str()).or_insert(source);
            }
            by_name
        })
        .collect();

    let identifiers: Vec<&str> = match master_ids {
        Some(ids) => ids.iter().map(String::as_str).collect(),
        None => {
            let mut seen = HashSet::new();
            ordered
                .iter()
                .flat_map(|(_, set)| set.sources.iter())
                .map(|source| source.source.name.as_str())
                .filter(|name| seen.insert(*name))
                .collect()
        }
    };

    let mut rows = Vec::with_capacity(identifiers.len());
    for name in identifiers {
        let mut best: Option<&AcceptedSource> = None;
        for candidate in lookups.iter().filter_map(|lookup| lookup.get(name).copied()) {
            if best.is_none_or(|current| current.best_chi2 > candidate.best_chi2) {
                best = Some(candidate);
            }
        }
        match best {
            Some(winner) => rows.push(winner.clone()),
            None => debug!(source = name, "no family fit this source"),
        }
    }
    Ok(rows)
}
