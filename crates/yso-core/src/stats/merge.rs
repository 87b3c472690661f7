use super::{CandidateSource, WeightedStatRow, source_stats};
use crate::domain::{Parameter, SedResult};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_MERGE_PARAMETERS: [Parameter; 3] = [
    Parameter::StarTemperature,
    Parameter::Luminosity,
    Parameter::Av,
];

/// Statistics of one source fitted under both regimes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedStatRow {
    pub name: String,
    pub ir: WeightedStatRow,
    pub survey: WeightedStatRow,
}

/// Inner join on source name, in IR order. The first survey entry wins when a
/// name repeats.
pub fn merge_regimes<I, S>(
    ir: &[I],
    survey: &[S],
    parameters: &[Parameter],
) -> SedResult<Vec<MergedStatRow>>
where
    I: CandidateSource,
    S: CandidateSource,
{
    let mut survey_by_name: HashMap<&str, &S> = HashMap::with_capacity(survey.len());
    for source in survey {
        survey_by_name.entry(source.name()).or_insert(source);
    }

    let mut rows = Vec::new();
    for ir_source in ir {
        let Some(survey_source) = survey_by_name.get(ir_source.name()) else {
            continue;
        };
        rows.push(MergedStatRow {
            name: ir_source.name().to_string(),
            ir: source_stats(ir_source, parameters)?,
            survey: source_stats(*survey_source, parameters)?,
        });
    }

    debug!(
        ir = ir.len(),
        survey = survey.len(),
        matched = rows.len(),
        "merged regime statistics"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::merge_regimes;
    use crate::domain::Parameter;
    use crate::extract::{CandidateTable, SourceModelSet};
    use std::collections::BTreeMap;

    fn source(name: &str, chi2: f64, av: f64) -> SourceModelSet {
        let table = CandidateTable::from_columns(BTreeMap::from([
            (Parameter::Chi2, vec![chi2]),
            (Parameter::Av, vec![av]),
        ]))
        .expect("columns should align");
        SourceModelSet::new(name.to_string(), 5, 1, table)
    }

    #[test]
    fn join_keeps_ir_order_and_drops_unmatched() {
        let ir = vec![source("C", 1.0, 3.0), source("A", 1.0, 1.0), source("X", 1.0, 9.0)];
        let survey = vec![source("A", 2.0, 1.5), source("C", 2.0, 3.5), source("Y", 1.0, 0.0)];

        let rows = merge_regimes(&ir, &survey, &[Parameter::Av]).expect("merge should work");
        let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A"]);
        assert_eq!(rows[0].ir.means(Parameter::Av).map(|m| m.avg), Some(3.0));
        assert_eq!(rows[0].survey.means(Parameter::Av).map(|m| m.avg), Some(3.5));
    }

    #[test]
    fn unmatched_sources_do_not_need_requested_columns() {
        let ir = vec![source("A", 1.0, 1.0)];
        let survey = vec![source("B", 1.0, 1.0)];
        let rows = merge_regimes(&ir, &survey, &[Parameter::Luminosity]).expect("merge should work");
        assert!(rows.is_empty());
    }
}
