//! `hhrr import` and `hhrr validate`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use hhrr_io::{parser_for_path, SqliteStore};
use hhrr_recon::{CancelToken, DepartmentSource, ImportConfig, ImportReport, Reconciler};

use crate::exit_codes::{EXIT_CANCELLED, EXIT_ERROR, EXIT_REJECTED_ROWS};
use crate::CliError;

pub struct ImportArgs {
    pub file: PathBuf,
    pub db: PathBuf,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub dry_run: bool,
    pub timeout_secs: Option<u64>,
}

fn load_config(path: &Path) -> Result<ImportConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::usage(format!("cannot read config {}: {e}", path.display())))?;
    ImportConfig::from_toml(&text).map_err(CliError::config)
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "config '{}' OK: unresolved departments = {}, blank emails = {:?}",
        config.name, config.departments.unresolved, config.rows.blank_email,
    );
    Ok(())
}

pub fn cmd_import(args: ImportArgs) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ImportConfig::default(),
    };

    let bytes = std::fs::read(&args.file)
        .map_err(|e| CliError::usage(format!("cannot read {}: {e}", args.file.display())))?;
    let parser = parser_for_path(&args.file, config.sheet.clone());
    let rows = parser.parse(&bytes).map_err(CliError::parse)?;
    info!(file = %args.file.display(), rows = rows.len(), "read spreadsheet");

    let mut store = SqliteStore::open(&args.db)
        .map_err(|e| CliError::store(e).with_hint("check --db or HHRR_DATABASE"))?;
    let departments = store.list_all().map_err(CliError::store)?;
    if departments.is_empty() {
        warn!(db = %args.db.display(), "no departments in database");
    }

    let mut cancel = CancelToken::new();
    if let Some(secs) = args.timeout_secs {
        cancel = cancel.with_timeout(Duration::from_secs(secs));
    }

    if args.dry_run {
        store.begin_dry_run().map_err(CliError::store)?;
    }
    let report = Reconciler::new(&config).run(&rows, &departments, &mut store, &cancel);
    if args.dry_run {
        store.rollback_dry_run().map_err(CliError::store)?;
    }

    emit_report(&report, args.json, args.output.as_deref())?;
    print_summary(&report, args.dry_run);

    if report.meta.cancelled {
        return Err(CliError {
            code: EXIT_CANCELLED,
            message: format!("import cancelled; {} rows not processed", report.summary.unprocessed),
            hint: Some("raise --timeout-secs or split the spreadsheet".to_string()),
        });
    }
    if report.summary.rejected > 0 {
        let hint = if departments.is_empty() {
            Some("run `hhrr departments seed` first".to_string())
        } else {
            None
        };
        return Err(CliError {
            code: EXIT_REJECTED_ROWS,
            message: format!("{} rows rejected", report.summary.rejected),
            hint,
        });
    }
    Ok(())
}

fn emit_report(report: &ImportReport, json: bool, output: Option<&Path>) -> Result<(), CliError> {
    if !json && output.is_none() {
        return Ok(());
    }
    let json_str = serde_json::to_string_pretty(report)
        .map_err(|e| CliError { code: EXIT_ERROR, message: format!("JSON serialization error: {e}"), hint: None })?;

    if let Some(path) = output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::usage(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }
    if json {
        println!("{json_str}");
    }
    Ok(())
}

fn print_summary(report: &ImportReport, dry_run: bool) {
    let s = &report.summary;
    eprintln!(
        "{}{} rows: {} inserted, {} updated, {} merged duplicates, {} skipped, {} rejected",
        if dry_run { "[dry run] " } else { "" },
        s.rows_total,
        s.inserted,
        s.updated,
        s.merged_duplicates,
        s.skipped,
        s.rejected,
    );
    for issue in &report.rejected {
        eprintln!(
            "  row {}: {}{}",
            issue.row_number,
            issue.reason,
            issue.detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default(),
        );
    }
}
