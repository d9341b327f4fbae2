//! `hhrr departments list|seed`.

use std::path::{Path, PathBuf};

use hhrr_io::SqliteStore;
use hhrr_recon::DepartmentSource;

use crate::exit_codes::EXIT_ERROR;
use crate::CliError;

fn open(db: &Path) -> Result<SqliteStore, CliError> {
    SqliteStore::open(db).map_err(|e| CliError::store(e).with_hint("check --db or HHRR_DATABASE"))
}

pub fn cmd_list(db: PathBuf, json: bool) -> Result<(), CliError> {
    let store = open(&db)?;
    let departments = store.list_all().map_err(CliError::store)?;

    if json {
        let json_str = serde_json::to_string_pretty(&departments)
            .map_err(|e| CliError { code: EXIT_ERROR, message: format!("JSON serialization error: {e}"), hint: None })?;
        println!("{json_str}");
        return Ok(());
    }

    if departments.is_empty() {
        eprintln!("no departments in {}; run `hhrr departments seed`", db.display());
        return Ok(());
    }
    println!("{:>4}  NAME", "ID");
    for d in &departments {
        println!("{:>4}  {}", d.id, d.name);
    }
    Ok(())
}

pub fn cmd_seed(db: PathBuf) -> Result<(), CliError> {
    let store = open(&db)?;
    let inserted = store.seed_default_departments().map_err(CliError::store)?;
    if inserted == 0 {
        eprintln!("departments already present in {}; nothing seeded", db.display());
    } else {
        eprintln!("seeded {inserted} departments into {}", db.display());
    }
    Ok(())
}
