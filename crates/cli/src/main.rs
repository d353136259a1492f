// LaborGrid CLI - build labor-market annex workbooks from raw extracts

mod annex;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use laborgrid_io::{ExportError, IngestError};
use laborgrid_recon::GridError;
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_ERROR, EXIT_EXPORT, EXIT_INGEST, EXIT_INVALID_CONFIG, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "lgrid")]
#[command(about = "Build the labor-market annex workbook from a raw series extract")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Log detection decisions to stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a source file and write the annex workbook
    #[command(after_help = "\
Examples:
  lgrid build mercado_laboral.xlsx
  lgrid build serie.csv -o anexo.xlsx --config grid.toml
  lgrid build serie.csv --json > preview.json
  lgrid build serie.csv --strict")]
    Build {
        /// Source file (.xlsx, .xlsm, .xls, .ods, .csv, .tsv, .txt)
        input: PathBuf,

        /// Annex workbook to write
        #[arg(long, short = 'o', default_value = "anexo.xlsx")]
        output: PathBuf,

        /// Grid config (TOML); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print column report, findings and preview as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Fail when no layout is recognized (skeleton grid)
        #[arg(long)]
        strict: bool,
    },

    /// Show the column report, findings and grid preview without writing anything
    #[command(after_help = "\
Examples:
  lgrid inspect mercado_laboral.xlsx
  lgrid inspect serie.csv --json")]
    Inspect {
        /// Source file
        input: PathBuf,

        /// Grid config (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate a grid config without running
    #[command(after_help = "\
Examples:
  lgrid config-check grid.toml")]
    ConfigCheck {
        /// Path to the grid.toml file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:  laborgrid-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:  laborgrid-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
        )
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: lgrid <command> [options]");
            eprintln!("       lgrid --help for more information");
            Ok(())
        }
        Some(Commands::Build {
            input,
            output,
            config,
            json,
            strict,
        }) => annex::cmd_build(input, output, config, json, strict),
        Some(Commands::Inspect { input, config, json }) => annex::cmd_inspect(input, config, json),
        Some(Commands::ConfigCheck { config }) => annex::cmd_config_check(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IngestError> for CliError {
    fn from(err: IngestError) -> Self {
        let hint = match &err {
            IngestError::UnsupportedFormat(_) => Some("convert the file to .xlsx or .csv".to_string()),
            IngestError::TooLarge { .. } => Some("split the extract or keep only the Base sheet".to_string()),
            IngestError::NoSheets => Some("the workbook must contain a sheet with the series".to_string()),
            _ => None,
        };
        Self { code: EXIT_INGEST, message: err.to_string(), hint }
    }
}

impl From<ExportError> for CliError {
    fn from(err: ExportError) -> Self {
        Self::new(EXIT_EXPORT, err.to_string())
    }
}

impl From<GridError> for CliError {
    fn from(err: GridError) -> Self {
        Self::new(EXIT_INVALID_CONFIG, err.to_string())
            .with_hint("see `numeric_threshold`, `max_null_ratio` and `header_scan_rows`")
    }
}
