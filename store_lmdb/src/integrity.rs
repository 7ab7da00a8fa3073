//! LMDB integrity checks.
//!
//! Run before replaying blocks so that a damaged data directory is reported
//! up front instead of half-way through a block.

use std::path::Path;

use heed::types::Bytes;

use crate::{LmdbEnvironment, LmdbError};

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Databases every SimpleGov environment carries.
const EXPECTED_DATABASES: &[&str] = &["kv", "meta"];

/// Open each expected database and count its entries.
///
/// Read failures and a schema version other than the current one are
/// recorded in the report rather than returned as errors.
pub fn check_integrity(env: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();
    let rtxn = env.env().read_txn()?;

    for &name in EXPECTED_DATABASES {
        match env.env().open_database::<Bytes, Bytes>(&rtxn, Some(name)) {
            Ok(Some(db)) => {
                report.databases_checked += 1;
                match db.len(&rtxn) {
                    Ok(count) => report.total_entries += count,
                    Err(e) => report
                        .errors
                        .push(format!("failed to read database '{name}': {e}")),
                }
            }
            Ok(None) => report.errors.push(format!("database '{name}' is missing")),
            Err(e) => report
                .errors
                .push(format!("failed to open database '{name}': {e}")),
        }
    }
    drop(rtxn);

    match env.schema_version() {
        Ok(version) if version == LmdbEnvironment::SCHEMA_VERSION => {}
        Ok(version) => report.errors.push(format!(
            "schema version {version}, expected {}",
            LmdbEnvironment::SCHEMA_VERSION
        )),
        Err(e) => report.errors.push(format!("unreadable schema version: {e}")),
    }

    Ok(report)
}

/// Check that `path` is either absent (fresh start) or an LMDB directory.
pub fn check_data_dir(path: &Path) -> Result<(), LmdbError> {
    if !path.exists() {
        return Ok(());
    }
    if !path.join("data.mdb").exists() {
        return Err(LmdbError::Heed(format!(
            "{} exists but holds no data.mdb",
            path.display()
        )));
    }
    Ok(())
}
