use super::CliError;
use super::helpers::{ConfigArgs, OutputArgs, emit, resolve_config};
use serde::Serialize;
use std::path::{Path, PathBuf};
use yso_core::common::SelectionConfig;
use yso_core::cuts::CutOutcome;
use yso_core::domain::{ModelFamily, Parameter};
use yso_core::extract::ParseOptions;
use yso_core::extract::writer::render_model_set;
use yso_core::report::{
    render_extract_summary, render_merge_table, render_selection_summary, render_stats_table,
    write_text_artifact,
};
use yso_core::selection::accept;
use yso_core::stats::{
    DEFAULT_MERGE_PARAMETERS, MergedStatRow, WeightedStatRow, merge_regimes,
    multi_param_weighted_stats,
};
use yso_core::workflow::{
    RegionInputs, SelectionReport, extract_model_file, read_identifier_list,
    run_region_selection,
};

#[derive(clap::Args)]
pub(super) struct ExtractArgs {
    /// Fitter parameter file
    file: PathBuf,

    /// Expected model family (01, 02, 16, 17 or its tag)
    #[arg(long)]
    family: Option<ModelFamily>,

    /// Re-emit the surviving candidates in the fixed-width layout
    #[arg(long, value_name = "OUT")]
    filtered: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(clap::Args)]
pub(super) struct StatsArgs {
    /// Fitter parameter file
    file: PathBuf,

    /// Parameter to average (repeatable), e.g. star_temp, lum, av
    #[arg(long = "param", value_name = "NAME", required = true)]
    parameters: Vec<Parameter>,

    /// Expected model family (01, 02, 16, 17 or its tag)
    #[arg(long)]
    family: Option<ModelFamily>,

    /// Apply delta-chi-squared acceptance with this multiplier first
    #[arg(long)]
    cdp: Option<f64>,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(clap::Args)]
pub(super) struct SelectArgs {
    /// Parameter files fitted with infrared photometry only
    #[arg(long = "ir", value_name = "FILE", num_args = 1..)]
    ir_files: Vec<PathBuf>,

    /// Parameter files fitted with survey photometry added
    #[arg(long = "survey", value_name = "FILE", num_args = 1..)]
    survey_files: Vec<PathBuf>,

    /// Identifier list fixing which sources are selected and in what order
    #[arg(long, value_name = "LIST")]
    sources: Option<PathBuf>,

    /// Identifier list for the survey tree (defaults to --sources)
    #[arg(long, value_name = "LIST")]
    survey_sources: Option<PathBuf>,

    /// Critical delta-chi-squared multiplier per data point
    #[arg(long)]
    cdp: Option<f64>,

    /// Also report weighted means of these parameters for the selections
    #[arg(long = "param", value_name = "NAME")]
    parameters: Vec<Parameter>,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(clap::Args)]
pub(super) struct MergeArgs {
    /// Parameter file fitted with infrared photometry only
    #[arg(long = "ir", value_name = "FILE")]
    ir_file: PathBuf,

    /// Parameter file fitted with survey photometry added
    #[arg(long = "survey", value_name = "FILE")]
    survey_file: PathBuf,

    /// Parameters to average (default: star_temp, lum, av)
    #[arg(long = "param", value_name = "NAME")]
    parameters: Vec<Parameter>,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Serialize)]
struct StatsReport<'a> {
    path: &'a Path,
    parameters: &'a [Parameter],
    critical_delta_prob: Option<f64>,
    rows: Vec<WeightedStatRow>,
}

#[derive(Serialize)]
struct SelectOutput<'a> {
    #[serde(flatten)]
    report: &'a SelectionReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    statistics: Vec<WeightedStatRow>,
}

#[derive(Serialize)]
struct MergeReport<'a> {
    ir: &'a Path,
    survey: &'a Path,
    parameters: &'a [Parameter],
    rows: Vec<MergedStatRow>,
}

fn extract(
    path: &Path,
    family: Option<ModelFamily>,
    config: &SelectionConfig,
) -> Result<CutOutcome, CliError> {
    let options = ParseOptions::from_config(config).with_expected_family(family);
    Ok(extract_model_file(path, &options, config)?)
}

pub(super) fn run_extract_command(args: ExtractArgs) -> Result<i32, CliError> {
    let config = resolve_config(&args.config, None)?;
    let outcome = extract(&args.file, args.family, &config)?;
    if let Some(path) = &args.filtered {
        write_text_artifact(path, &render_model_set(&outcome.set)?)?;
    }
    emit(&args.output, &render_extract_summary(&outcome), &outcome)?;
    Ok(0)
}

pub(super) fn run_stats_command(args: StatsArgs) -> Result<i32, CliError> {
    let config = resolve_config(&args.config, args.cdp)?;
    let outcome = extract(&args.file, args.family, &config)?;
    let rows = match args.cdp {
        Some(_) => {
            let accepted = accept(outcome.set, config.critical_delta_prob)?;
            multi_param_weighted_stats(&accepted.sources, &args.parameters)?
        }
        None => multi_param_weighted_stats(&outcome.set.sources, &args.parameters)?,
    };

    let summary = render_stats_table(&rows, &args.parameters);
    let report = StatsReport {
        path: &args.file,
        parameters: &args.parameters,
        critical_delta_prob: args.cdp.map(|_| config.critical_delta_prob),
        rows,
    };
    emit(&args.output, &summary, &report)?;
    Ok(0)
}

pub(super) fn run_select_command(args: SelectArgs) -> Result<i32, CliError> {
    if args.ir_files.is_empty() && args.survey_files.is_empty() {
        return Err(CliError::Usage(
            "select needs at least one --ir or --survey parameter file".to_string(),
        ));
    }
    let config = resolve_config(&args.config, args.cdp)?;
    let inputs = RegionInputs {
        ir_files: args.ir_files,
        survey_files: args.survey_files,
        master_ids: args.sources.as_deref().map(read_identifier_list).transpose()?,
        survey_ids: args
            .survey_sources
            .as_deref()
            .map(read_identifier_list)
            .transpose()?,
    };

    let report = run_region_selection(&inputs, &config)?;
    let statistics = if args.parameters.is_empty() {
        Vec::new()
    } else {
        multi_param_weighted_stats(&report.selections, &args.parameters)?
    };

    let mut summary = render_selection_summary(&report);
    if !statistics.is_empty() {
        summary.push_str(&render_stats_table(&statistics, &args.parameters));
    }
    let output = SelectOutput {
        report: &report,
        statistics,
    };
    emit(&args.output, &summary, &output)?;
    Ok(0)
}

pub(super) fn run_merge_command(args: MergeArgs) -> Result<i32, CliError> {
    let config = resolve_config(&args.config, None)?;
    let parameters = if args.parameters.is_empty() {
        DEFAULT_MERGE_PARAMETERS.to_vec()
    } else {
        args.parameters
    };

    let ir = extract(&args.ir_file, None, &config)?;
    let survey = extract(&args.survey_file, None, &config)?;
    let rows = merge_regimes(&ir.set.sources, &survey.set.sources, &parameters)?;

    let summary = render_merge_table(&rows, &parameters);
    let report = MergeReport {
        ir: &args.ir_file,
        survey: &args.survey_file,
        parameters: &parameters,
        rows,
    };
    emit(&args.output, &summary, &report)?;
    Ok(0)
}
