// hhrr - headless employee spreadsheet import

mod departments;
mod exit_codes;
mod import;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_CONFIG_INVALID, EXIT_PARSE, EXIT_STORE, EXIT_SUCCESS, EXIT_USAGE};

const DEFAULT_DB: &str = "hhrr.sqlite";

#[derive(Parser)]
#[command(name = "hhrr")]
#[command(about = "Import employee spreadsheets into the HR database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import an employee spreadsheet (xlsx, xls, ods, csv, tsv)
    #[command(after_help = "\
Examples:
  hhrr import staff.xlsx
  hhrr import staff.xlsx --config import.toml --json
  hhrr import staff.csv --db hr.sqlite --output report.json
  hhrr import staff.xlsx --dry-run --json | jq .summary
  HHRR_DATABASE=/var/lib/hr.sqlite hhrr import staff.xlsx --timeout-secs 60")]
    Import {
        /// Spreadsheet to import
        file: PathBuf,

        /// SQLite database path
        #[arg(long, env = "HHRR_DATABASE", default_value = DEFAULT_DB)]
        db: PathBuf,

        /// Import config TOML (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Write JSON report to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Run the import and roll back every write
        #[arg(long)]
        dry_run: bool,

        /// Stop reading rows after this many seconds
        #[arg(long, value_name = "N")]
        timeout_secs: Option<u64>,
    },

    /// Validate an import config without running
    #[command(after_help = "\
Examples:
  hhrr validate import.toml")]
    Validate {
        /// Path to the import config TOML
        config: PathBuf,
    },

    /// Inspect or seed departments
    #[command(subcommand)]
    Departments(DepartmentCommands),
}

#[derive(Subcommand)]
enum DepartmentCommands {
    /// List departments in the database
    #[command(after_help = "\
Examples:
  hhrr departments list
  hhrr departments list --db hr.sqlite --json")]
    List {
        /// SQLite database path
        #[arg(long, env = "HHRR_DATABASE", default_value = DEFAULT_DB)]
        db: PathBuf,

        /// Output JSON array instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Create the standard departments in an empty database
    #[command(after_help = "\
Examples:
  hhrr departments seed --db hr.sqlite")]
    Seed {
        /// SQLite database path
        #[arg(long, env = "HHRR_DATABASE", default_value = DEFAULT_DB)]
        db: PathBuf,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(err: hhrr_recon::ConfigError) -> Self {
        Self { code: EXIT_CONFIG_INVALID, message: err.to_string(), hint: None }
    }

    pub fn parse(err: hhrr_recon::ParseError) -> Self {
        let hint = match &err {
            hhrr_recon::ParseError::Open(_) => {
                Some("expected xlsx, xls, xlsb or ods; use a .csv extension for delimited text".to_string())
            }
            hhrr_recon::ParseError::TooManyRows { .. } => {
                Some("split the workbook into smaller sheets".to_string())
            }
            hhrr_recon::ParseError::NoWorksheet { .. } => {
                Some("check [sheet] worksheet in the config (0 is the first sheet)".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_PARSE, message: err.to_string(), hint }
    }

    pub fn store(err: hhrr_recon::StoreError) -> Self {
        Self { code: EXIT_STORE, message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Logs go to stderr so `--json` stdout stays a single JSON value.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hhrr=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Import { file, db, config, json, output, dry_run, timeout_secs } => {
            import::cmd_import(import::ImportArgs { file, db, config, json, output, dry_run, timeout_secs })
        }
        Commands::Validate { config } => import::cmd_validate(config),
        Commands::Departments(cmd) => match cmd {
            DepartmentCommands::List { db, json } => departments::cmd_list(db, json),
            DepartmentCommands::Seed { db } => departments::cmd_seed(db),
        },
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
