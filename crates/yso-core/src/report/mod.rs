//! JSON artifacts and plain-text summaries for the command line.

mod serialization;

pub use serialization::{
    format_fixed_f64, format_scientific_f64, normalize_text_artifact, to_json_text,
    write_json_report, write_text_artifact,
};

use crate::cuts::CutOutcome;
use crate::domain::{ModelFamily, Parameter, Regime};
use crate::numerics::finite_min;
use crate::stats::{MergedStatRow, WeightedStatRow};
use crate::workflow::SelectionReport;
use std::fmt::Write as _;

const NAME_WIDTH: usize = 20;
const VALUE_WIDTH: usize = 12;

pub fn render_selection_summary(report: &SelectionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Selected {} source(s), critical delta chi2 per datum {}",
        report.selections.len(),
        format_fixed_f64(report.critical_delta_prob, 0, 3)
    );

    for regime in [Regime::Survey, Regime::Ir] {
        let count = report
            .selections
            .iter()
            .filter(|row| row.regime == regime)
            .count();
        let _ = writeln!(out, "  regime {:<8} {count:>6}", regime.as_str());
    }
    for family in ModelFamily::ALL {
        let count = report
            .selections
            .iter()
            .filter(|row| row.accepted.family == family)
            .count();
        let _ = writeln!(out, "  family {:<11} {count:>6}", family.as_str());
    }

    out.push_str("Files:\n");
    for file in &report.files {
        let family = file.family.map_or("-", ModelFamily::as_str);
        let _ = writeln!(
            out,
            "  {} [{}] {family}: parsed {}, accepted {}, removed {}",
            file.path.display(),
            file.regime,
            file.sources_parsed,
            file.sources_accepted,
            file.removed.len()
        );
    }

    if report.removed_count() > 0 {
        out.push_str("Removed sources:\n");
        for file in &report.files {
            for removed in &file.removed {
                let _ = writeln!(
                    out,
                    "  {:<NAME_WIDTH$} {} ({})",
                    removed.name,
                    removed.reason,
                    file.path.display()
                );
            }
        }
    }

    if !report.omitted.is_empty() {
        let _ = writeln!(out, "Omitted identifiers ({}):", report.omitted.len());
        for name in &report.omitted {
            let _ = writeln!(out, "  {name}");
        }
    }
    out
}

pub fn render_extract_summary(outcome: &CutOutcome) -> String {
    let set = &outcome.set;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: family {}, {} source(s) kept, {} removed",
        set.path.display(),
        set.family.map_or("-", ModelFamily::as_str),
        set.sources.len(),
        outcome.removed.len()
    );
    let _ = writeln!(
        out,
        "  {:<NAME_WIDTH$} {:>6} {:>8} {:>8} {:>VALUE_WIDTH$}",
        "name", "n_data", "declared", "n_fits", "best_chi2"
    );
    for source in &set.sources {
        let best = finite_min(source.chi2()).unwrap_or(f64::NAN);
        let _ = writeln!(
            out,
            "  {:<NAME_WIDTH$} {:>6} {:>8} {:>8} {}",
            source.name,
            source.n_data,
            source.init_n_fits,
            source.n_fits,
            format_fixed_f64(best, VALUE_WIDTH, 3)
        );
    }
    for removed in &outcome.removed {
        let _ = writeln!(out, "  removed {}: {}", removed.name, removed.reason);
    }
    out
}

fn stats_header(out: &mut String, parameters: &[Parameter]) {
    for parameter in parameters {
        let _ = write!(
            out,
            " {:>VALUE_WIDTH$} {:>VALUE_WIDTH$}",
            format!("{parameter}_avg"),
            format!("{parameter}_w_avg")
        );
    }
}

fn stats_values(out: &mut String, row: &WeightedStatRow, parameters: &[Parameter]) {
    for &parameter in parameters {
        match row.means(parameter) {
            Some(means) => {
                let _ = write!(
                    out,
                    " {} {}",
                    format_scientific_f64(means.avg, VALUE_WIDTH),
                    format_scientific_f64(means.w_avg, VALUE_WIDTH)
                );
            }
            None => {
                let _ = write!(out, " {:>VALUE_WIDTH$} {:>VALUE_WIDTH$}", "-", "-");
            }
        }
    }
}

pub fn render_stats_table(rows: &[WeightedStatRow], parameters: &[Parameter]) -> String {
    let mut out = format!("{:<NAME_WIDTH$} {:>6}", "name", "n_data");
    stats_header(&mut out, parameters);
    out.push('\n');
    for row in rows {
        let _ = write!(out, "{:<NAME_WIDTH$} {:>6}", row.name, row.metadata.n_data);
        stats_values(&mut out, row, parameters);
        out.push('\n');
    }
    out
}

pub fn render_merge_table(rows: &[MergedStatRow], parameters: &[Parameter]) -> String {
    let mut out = format!("{:<NAME_WIDTH$} {:>6}", "name", "regime");
    stats_header(&mut out, parameters);
    out.push('\n');
    for row in rows {
        for (regime, stats) in [(Regime::Ir, &row.ir), (Regime::Survey, &row.survey)] {
            let _ = write!(out, "{:<NAME_WIDTH$} {:>6}", row.name, regime.as_str());
            stats_values(&mut out, stats, parameters);
            out.push('\n');
        }
    }
    out
}
