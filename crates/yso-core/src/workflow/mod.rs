//! End-to-end selection over one region's parameter files.

use crate::common::SelectionConfig;
use crate::common::constants::CATALOGUE_NAME_PREFIX;
use crate::cuts::{CutOutcome, RemovedSource, apply_physical_cuts};
use crate::domain::{ModelFamily, Regime, SedError, SedResult};
use crate::extract::{ParseOptions, parse_model_file};
use crate::selection::{
    AcceptedSet, AcceptedSource, SelectionRow, accept, model_tree, select_regime,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegionInputs {
    pub ir_files: Vec<PathBuf>,
    pub survey_files: Vec<PathBuf>,
    /// Identifiers to arbitrate, in output order. Also restricts the IR tree.
    pub master_ids: Option<Vec<String>>,
    /// Identifiers for the survey tree; falls back to `master_ids`.
    pub survey_ids: Option<Vec<String>>,
}

/// What happened to one parameter file on its way to the model tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub regime: Regime,
    pub family: Option<ModelFamily>,
    pub sources_parsed: usize,
    pub sources_accepted: usize,
    pub removed: Vec<RemovedSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionReport {
    pub critical_delta_prob: f64,
    pub selections: Vec<SelectionRow>,
    pub files: Vec<FileSummary>,
    pub omitted: Vec<String>,
}

impl SelectionReport {
    pub fn removed_count(&self) -> usize {
        self.files.iter().map(|file| file.removed.len()).sum()
    }
}

/// Parses one file and applies the physical cuts.
pub fn extract_model_file(
    path: impl AsRef<Path>,
    options: &ParseOptions,
    config: &SelectionConfig,
) -> SedResult<CutOutcome> {
    let set = parse_model_file(path, options)?;
    apply_physical_cuts(set, &config.thresholds)
}

/// Parse, cut, accept and tree each regime, then arbitrate between them.
pub fn run_region_selection(
    inputs: &RegionInputs,
    config: &SelectionConfig,
) -> SedResult<SelectionReport> {
    config.validate()?;
    if inputs.ir_files.is_empty() && inputs.survey_files.is_empty() {
        return Err(SedError::InvalidInput(
            "no parameter files supplied for either regime".to_string(),
        ));
    }

    let mut files = Vec::new();
    let survey_ids = inputs.survey_ids.as_ref().or(inputs.master_ids.as_ref());
    let ir_rows = regime_tree(
        Regime::Ir,
        &inputs.ir_files,
        inputs.master_ids.as_deref(),
        config,
        &mut files,
    )?;
    let survey_rows = regime_tree(
        Regime::Survey,
        &inputs.survey_files,
        survey_ids.map(Vec::as_slice),
        config,
        &mut files,
    )?;

    let selection = select_regime(ir_rows, survey_rows, inputs.master_ids.as_deref());
    let report = SelectionReport {
        critical_delta_prob: config.critical_delta_prob,
        selections: selection.rows,
        files,
        omitted: selection.omitted,
    };
    info!(
        selected = report.selections.len(),
        removed = report.removed_count(),
        omitted = report.omitted.len(),
        "region selection finished"
    );
    Ok(report)
}

fn regime_tree(
    regime: Regime,
    paths: &[PathBuf],
    master_ids: Option<&[String]>,
    config: &SelectionConfig,
    summaries: &mut Vec<FileSummary>,
) -> SedResult<Vec<AcceptedSource>> {
    let options = ParseOptions::from_config(config);
    let mut accepted_sets: Vec<AcceptedSet> = Vec::with_capacity(paths.len());
    for path in paths {
        let parsed = parse_model_file(path, &options)?;
        let sources_parsed = parsed.sources.len();
        let CutOutcome { set, removed } = apply_physical_cuts(parsed, &config.thresholds)?;
        let accepted = accept(set, config.critical_delta_prob)?;
        summaries.push(FileSummary {
            path: path.clone(),
            regime,
            family: accepted.family,
            sources_parsed,
            sources_accepted: accepted.sources.len(),
            removed,
        });
        accepted_sets.push(accepted);
    }
    model_tree(&accepted_sets, master_ids)
}

/// Reads one identifier per line, skipping blanks and `#` comments and
/// dropping the survey catalogue prefix.
pub fn read_identifier_list(path: impl AsRef<Path>) -> SedResult<Vec<String>> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| SedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_identifier_list(&source))
}

pub fn parse_identifier_list(source: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            line.strip_prefix(CATALOGUE_NAME_PREFIX)
                .unwrap_or(line)
                .trim()
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{RegionInputs, parse_identifier_list, read_identifier_list, run_region_selection};
    use crate::common::SelectionConfig;
    use crate::domain::SedErrorCategory;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn identifier_list_strips_catalogue_prefix_and_comments() {
        let ids = parse_identifier_list(
            "# region G305\nSSTGLMC G305.1234+00.5678\n\n  G305.9+0.1  \n#G306\n",
        );
        assert_eq!(ids, vec!["G305.1234+00.5678", "G305.9+0.1"]);
    }

    #[test]
    fn identifier_list_reads_from_disk() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("ids.txt");
        fs::write(&path, "SSTGLMC A\nB\n").expect("list should be written");
        assert_eq!(
            read_identifier_list(&path).expect("list should load"),
            vec!["A", "B"]
        );
    }

    #[test]
    fn run_requires_at_least_one_file() {
        let error = run_region_selection(&RegionInputs::default(), &SelectionConfig::default())
            .expect_err("no input should fail");
        assert_eq!(error.category(), SedErrorCategory::InputValidationError);
    }
}
