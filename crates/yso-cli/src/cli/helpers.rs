use super::CliError;
use anyhow::Context;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use yso_core::common::{SelectionConfig, load_selection_config};
use yso_core::report::write_json_report;

#[derive(clap::Args, Default)]
pub(super) struct ConfigArgs {
    /// JSON selection config; command-line flags override its values
    #[arg(long, value_name = "JSON")]
    pub(super) config: Option<PathBuf>,

    /// Treat files with neither family marker as sp_s_i_01
    #[arg(long)]
    pub(super) assume_disk_only: bool,
}

#[derive(clap::Args, Default)]
pub(super) struct OutputArgs {
    /// Write the full result as JSON to this path
    #[arg(long, value_name = "OUT")]
    pub(super) json: Option<PathBuf>,
}

pub(super) fn resolve_config(
    args: &ConfigArgs,
    critical_delta_prob: Option<f64>,
) -> Result<SelectionConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => load_selection_config(path)?,
        None => SelectionConfig::default(),
    };
    if let Some(value) = critical_delta_prob {
        config.critical_delta_prob = value;
    }
    config.assume_disk_only_without_markers |= args.assume_disk_only;
    config.validate()?;
    Ok(config)
}

pub(super) fn emit<T: Serialize + ?Sized>(
    output: &OutputArgs,
    summary: &str,
    value: &T,
) -> Result<(), CliError> {
    if let Some(path) = &output.json {
        write_json_report(path, value)?;
    }
    print_summary(summary, output.json.as_deref())
}

fn print_summary(summary: &str, json_path: Option<&Path>) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(summary.as_bytes())
        .context("failed to write summary to stdout")?;
    if let Some(path) = json_path {
        writeln!(stdout, "JSON report: {}", path.display())
            .context("failed to write summary to stdout")?;
    }
    Ok(())
}
