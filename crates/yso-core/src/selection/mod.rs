//! Delta-chi-squared acceptance, per-family arbitration and regime priority.

mod acceptance;
mod regime;
mod tree;

pub use acceptance::{AcceptedSet, AcceptedSource, accept, accept_source};
pub use regime::{RegimeSelection, SelectionRow, select_regime};
pub use tree::model_tree;

use crate::extract::CandidateTable;
use crate::stats::{CandidateSource, StatMetadata};

impl CandidateSource for AcceptedSource {
    fn name(&self) -> &str {
        &self.source.name
    }

    fn candidates(&self) -> &CandidateTable {
        &self.source.candidates
    }

    fn metadata(&self) -> StatMetadata {
        StatMetadata {
            n_data: self.source.n_data,
            n_good: Some(self.n_good),
            family: Some(self.family),
            ..StatMetadata::default()
        }
    }
}

impl CandidateSource for SelectionRow {
    fn name(&self) -> &str {
        self.accepted.name()
    }

    fn candidates(&self) -> &CandidateTable {
        self.accepted.candidates()
    }

    fn metadata(&self) -> StatMetadata {
        StatMetadata {
            regime: Some(self.regime),
            ..self.accepted.metadata()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AcceptedSource, SelectionRow};
    use crate::domain::{ModelFamily, Parameter, Regime};
    use crate::extract::{CandidateTable, SourceModelSet};
    use crate::report::render_stats_table;
    use crate::stats::multi_param_weighted_stats;
    use std::collections::BTreeMap;

    fn row(
        name: &str,
        family: ModelFamily,
        regime: Regime,
        columns: Vec<(Parameter, Vec<f64>)>,
    ) -> SelectionRow {
        let table = CandidateTable::from_columns(columns.into_iter().collect::<BTreeMap<_, _>>())
            .expect("columns should align");
        let n_good = table.len();
        SelectionRow {
            accepted: AcceptedSource {
                source: SourceModelSet::new(name.to_string(), 8, n_good as u32, table),
                family,
                best_chi2: 1.0,
                n_good,
                p_dm: n_good as f64 / family.grid_size() as f64,
            },
            regime,
        }
    }

    #[test]
    fn mixed_family_rows_report_only_the_columns_they_carry() {
        let rows = vec![
            row(
                "A",
                ModelFamily::DiskInnerHole,
                Regime::Survey,
                vec![
                    (Parameter::Chi2, vec![1.0, 2.0]),
                    (Parameter::Av, vec![3.0, 5.0]),
                    (Parameter::DiskRmin, vec![0.2, 0.4]),
                ],
            ),
            row(
                "B",
                ModelFamily::DiskOnly,
                Regime::Ir,
                vec![
                    (Parameter::Chi2, vec![1.0]),
                    (Parameter::Av, vec![7.0]),
                ],
            ),
        ];
        let parameters = [Parameter::Av, Parameter::DiskRmin];

        let stats = multi_param_weighted_stats(&rows, &parameters)
            .expect("mixed families should not fail the batch");

        assert_eq!(stats.len(), 2);
        let rmin = stats[0]
            .means(Parameter::DiskRmin)
            .expect("sp_h_i_02 row should carry disk_rmin");
        assert!((rmin.avg - 0.3).abs() < 1.0e-12);
        assert!(rmin.w_avg >= 0.2 && rmin.w_avg < 0.3);

        assert_eq!(stats[1].metadata.family, Some(ModelFamily::DiskOnly));
        assert_eq!(stats[1].metadata.regime, Some(Regime::Ir));
        assert!(stats[1].means(Parameter::DiskRmin).is_none());
        assert_eq!(stats[1].means(Parameter::Av).map(|m| m.w_avg), Some(7.0));

        let json = serde_json::to_value(&stats[1]).expect("row should serialize");
        assert!(json.get("disk_rmin_avg").is_none());
        assert_eq!(json["av_avg"], 7.0);

        let table = render_stats_table(&stats, &parameters);
        let line_b = table
            .lines()
            .find(|line| line.starts_with('B'))
            .expect("table should list B");
        assert!(line_b.split_whitespace().any(|field| field == "-"));
    }
}
