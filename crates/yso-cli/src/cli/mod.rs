mod commands;
mod helpers;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use yso_core::domain::SedError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}", error.diagnostic_line());
            eprintln!("FATAL EXIT CODE: {}", error.exit_code());
            error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("yso-select".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();

    match Cli::try_parse_from(&full_args) {
        Ok(cli) => {
            init_tracing(cli.verbose);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{err}");
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "yso-select",
    version,
    about = "Young stellar object SED model extraction and selection"
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug); RUST_LOG applies otherwise
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Parse one parameter file and apply the physical cuts
    Extract(commands::ExtractArgs),
    /// Simple and chi-squared-weighted parameter means per source
    Stats(commands::StatsArgs),
    /// Select the best model family per source across IR and survey fits
    Select(commands::SelectArgs),
    /// Join IR and survey statistics on source name
    Merge(commands::MergeArgs),
}

impl CliCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Extract(_) => "extract",
            Self::Stats(_) => "stats",
            Self::Select(_) => "select",
            Self::Merge(_) => "merge",
        }
    }
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    info!(command = command.name(), "running command");
    match command {
        CliCommand::Extract(args) => commands::run_extract_command(args),
        CliCommand::Stats(args) => commands::run_stats_command(args),
        CliCommand::Select(args) => commands::run_select_command(args),
        CliCommand::Merge(args) => commands::run_merge_command(args),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Core(#[from] SedError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Usage(_) => "INPUT.CLI_USAGE",
            Self::Core(error) => error.placeholder(),
            Self::Internal(_) => "IO.CLI",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Core(error) => error.exit_code(),
            Self::Internal(_) => 3,
        }
    }

    pub fn diagnostic_line(&self) -> String {
        match self {
            Self::Usage(message) => {
                format!("ERROR: [{}] {}", self.placeholder(), message.trim_end())
            }
            Self::Core(error) => error.diagnostic_line(),
            Self::Internal(error) => format!("ERROR: [{}] {error:#}", self.placeholder()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CliError, run};

    #[test]
    fn help_exits_cleanly() {
        assert_eq!(run(["--help"]).expect("help should succeed"), 0);
    }

    #[test]
    fn unknown_subcommand_is_usage_error() {
        let error = run(["classify"]).expect_err("unknown command should fail");
        assert!(matches!(error, CliError::Usage(_)));
        assert_eq!(error.exit_code(), 2);
        assert!(error.diagnostic_line().starts_with("ERROR: [INPUT.CLI_USAGE]"));
    }

    #[test]
    fn bad_family_tag_is_usage_error() {
        let error = run(["extract", "pars.txt", "--family", "99"])
            .expect_err("unknown family should fail");
        assert_eq!(error.exit_code(), 2);
    }
}
