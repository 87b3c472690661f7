use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use yso_core::domain::{ModelFamily, Parameter};
use yso_core::extract::writer::{CandidateRow, render_model_file};

fn row(chi2: f64, temperature: f64) -> CandidateRow {
    CandidateRow::uniform(1.0)
        .with(Parameter::Chi2, chi2)
        .with(Parameter::StarRadius, 2.0)
        .with(Parameter::StarTemperature, temperature)
}

fn write_model_file(
    dir: &Path,
    name: &str,
    family: ModelFamily,
    sources: &[(&str, u32, Vec<CandidateRow>)],
) -> PathBuf {
    let path = dir.join(name);
    let text = render_model_file(family, sources).expect("fixture should render");
    fs::write(&path, text).expect("fixture should be written");
    path
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_yso-select"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("yso-select should start")
}

fn read_json(path: &Path) -> Value {
    let text = fs::read_to_string(path).expect("report should exist");
    serde_json::from_str(&text).expect("report should be valid JSON")
}

#[test]
fn extract_reports_kept_and_removed_sources() {
    let temp = TempDir::new().expect("tempdir should be created");
    let file = write_model_file(
        temp.path(),
        "pars_02g04_IR.txt",
        ModelFamily::DiskInnerHole,
        &[
            ("G1", 6, vec![row(1.0, 5000.0), row(2.0, 3000.0)]),
            ("G2", 6, vec![row(1.0, 3500.0)]),
        ],
    );
    let report = temp.path().join("out").join("extract.json");
    let filtered = temp.path().join("filtered.txt");

    let output = run_cli(&[
        "extract",
        file.to_str().expect("utf-8 path"),
        "--json",
        report.to_str().expect("utf-8 path"),
        "--filtered",
        filtered.to_str().expect("utf-8 path"),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json = read_json(&report);
    assert_eq!(json["set"]["family"], "sp_h_i_02");
    assert_eq!(json["set"]["sources"][0]["name"], "G1");
    assert_eq!(json["set"]["sources"][0]["n_fits"], 1);
    assert_eq!(json["set"]["sources"][0]["init_n_fits"], 2);
    assert_eq!(json["removed"][0]["name"], "G2");
    assert_eq!(json["removed"][0]["reason"], "temperature_floor");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 source(s) kept, 1 removed"));

    let rewritten = fs::read_to_string(&filtered).expect("filtered file should exist");
    assert!(rewritten.lines().nth(1).is_some_and(|line| line.contains("disk.rmin")));
    assert_eq!(rewritten.lines().count(), 5);
}

#[test]
fn select_prefers_survey_fits_and_lists_omissions() {
    let temp = TempDir::new().expect("tempdir should be created");
    let ir = write_model_file(
        temp.path(),
        "pars_16g04_IR.txt",
        ModelFamily::DiskEnvelope,
        &[("A", 6, vec![row(2.0, 5000.0)]), ("B", 6, vec![row(3.0, 5000.0)])],
    );
    let survey = write_model_file(
        temp.path(),
        "pars_17g04_Gaia.txt",
        ModelFamily::DiskEnvelopeInnerHole,
        &[("A", 9, vec![row(9.0, 5000.0)])],
    );
    let sources = temp.path().join("sources.txt");
    fs::write(&sources, "SSTGLMC A\nSSTGLMC B\nSSTGLMC C\n").expect("list should be written");
    let report = temp.path().join("select.json");

    let output = run_cli(&[
        "select",
        "--ir",
        ir.to_str().expect("utf-8 path"),
        "--survey",
        survey.to_str().expect("utf-8 path"),
        "--sources",
        sources.to_str().expect("utf-8 path"),
        "--cdp",
        "2.5",
        "--param",
        "star_temp",
        "--json",
        report.to_str().expect("utf-8 path"),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json = read_json(&report);
    assert_eq!(json["critical_delta_prob"], 2.5);
    assert_eq!(json["selections"][0]["name"], "A");
    assert_eq!(json["selections"][0]["regime"], "survey");
    assert_eq!(json["selections"][0]["family"], "spubhmi_17");
    assert_eq!(json["selections"][1]["regime"], "ir");
    assert_eq!(json["omitted"][0], "C");
    assert_eq!(json["statistics"][1]["star_temp_w_avg"], 5000.0);
    assert_eq!(json["statistics"][1]["regime"], "ir");
}

#[test]
fn stats_requires_a_parameter() {
    let output = run_cli(&["stats", "pars.txt"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[INPUT.CLI_USAGE]"));
}

#[test]
fn unmarked_file_fails_with_family_diagnostic() {
    let temp = TempDir::new().expect("tempdir should be created");
    let file = write_model_file(
        temp.path(),
        "pars_01.txt",
        ModelFamily::DiskOnly,
        &[("A", 6, vec![row(1.0, 5000.0)])],
    );

    let output = run_cli(&["stats", file.to_str().expect("utf-8 path"), "--param", "av"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: [FORMAT.FAMILY]"));
    assert!(stderr.contains("FATAL EXIT CODE: 2"));

    let output = run_cli(&[
        "stats",
        file.to_str().expect("utf-8 path"),
        "--param",
        "av",
        "--family",
        "01",
    ]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("av_w_avg"));
}

#[test]
fn missing_input_is_io_exit_code() {
    let temp = TempDir::new().expect("tempdir should be created");
    let missing = temp.path().join("absent.txt");
    let output = run_cli(&["extract", missing.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("[IO.READ]"));
}

#[test]
fn merge_defaults_to_temperature_luminosity_and_extinction() {
    let temp = TempDir::new().expect("tempdir should be created");
    let ir = write_model_file(
        temp.path(),
        "ir.txt",
        ModelFamily::DiskInnerHole,
        &[("A", 6, vec![row(1.0, 5000.0)]), ("B", 6, vec![row(1.0, 5000.0)])],
    );
    let survey = write_model_file(
        temp.path(),
        "survey.txt",
        ModelFamily::DiskEnvelope,
        &[("B", 8, vec![row(2.0, 6000.0)])],
    );
    let report = temp.path().join("merge.json");

    let output = run_cli(&[
        "merge",
        "--ir",
        ir.to_str().expect("utf-8 path"),
        "--survey",
        survey.to_str().expect("utf-8 path"),
        "--json",
        report.to_str().expect("utf-8 path"),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json = read_json(&report);
    assert_eq!(json["parameters"], serde_json::json!(["star_temp", "lum", "av"]));
    assert_eq!(json["rows"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["rows"][0]["name"], "B");
    assert_eq!(json["rows"][0]["survey"]["star_temp_avg"], 6000.0);
    assert_eq!(json["rows"][0]["ir"]["av_w_avg"], 1.0);
}

#[test]
fn verbose_flag_logs_the_dispatched_command() {
    let temp = TempDir::new().expect("tempdir should be created");
    let file = write_model_file(
        temp.path(),
        "pars_02.txt",
        ModelFamily::DiskInnerHole,
        &[("G1", 6, vec![row(1.0, 5000.0)])],
    );
    let path = file.to_str().expect("utf-8 path");

    let quiet = run_cli(&["extract", path]);
    assert!(quiet.status.success());
    assert!(!String::from_utf8_lossy(&quiet.stderr).contains("running command"));

    let verbose = run_cli(&["-v", "extract", path]);
    assert!(verbose.status.success());
    let stderr = String::from_utf8_lossy(&verbose.stderr);
    assert!(stderr.contains("running command"), "stderr: {stderr}");
    assert!(stderr.contains("extract"));
}
