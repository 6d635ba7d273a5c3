//! Payroll data sources.
//!
//! The engine does not fetch payrolls itself; it reads them from a
//! [`PayrollSource`].  The bundled [`JsonDirSource`] serves records
//! loaded from a directory of JSON files, which is what the HTTP server
//! uses.  Other backends (for instance a client for the upstream
//! payroll service) implement the same trait.

use crate::aggregate::label_months;
use crate::error::{PayrollError, Result};
use crate::models::{PayrollFilter, PayrollRecord};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read access to payroll records.
///
/// Sources must be thread-safe (`Send + Sync`) because the HTTP server
/// shares one instance across request handlers.
pub trait PayrollSource: Send + Sync {
    /// The payroll of one employee for one month, if any.
    fn by_user_and_month(&self, user_id: &str, year: i32, month: u32) -> Option<PayrollRecord>;

    /// Every payroll matching `filter`, ordered by period then user.
    /// When the result spans several periods each record carries its
    /// month label.
    fn many(&self, filter: &PayrollFilter) -> Vec<PayrollRecord>;
}

/// A payroll file holds either a single record or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum PayrollFile {
    Many(Vec<PayrollRecord>),
    One(Box<PayrollRecord>),
}

/// Parses one payroll JSON file.
pub fn parse_payroll_file(path: &Path) -> Result<Vec<PayrollRecord>> {
    let data = std::fs::read_to_string(path)?;
    let file = serde_json::from_str::<PayrollFile>(&data).map_err(|source| PayrollError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match file {
        PayrollFile::Many(records) => records,
        PayrollFile::One(record) => vec![*record],
    })
}

/// Load all payroll records from a directory.
///
/// Every `.json` file in `path` is parsed, in file-name order.  Files
/// that fail to parse are logged and skipped.  A missing directory
/// yields no records.
pub fn load_payrolls_from_dir(path: &Path) -> Result<Vec<PayrollRecord>> {
    let mut records = Vec::new();
    if !path.is_dir() {
        warn!(dir = %path.display(), "payroll directory not found");
        return Ok(records);
    }

    // Collect JSON files first so they load in a stable order
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_file()
            && entry.path().extension().map_or(false, |ext| ext == "json")
        {
            files.push(entry.path());
        }
    }
    files.sort();

    for file in files {
        match parse_payroll_file(&file) {
            Ok(mut parsed) => {
                debug!(file = %file.display(), count = parsed.len(), "loaded payroll file");
                records.append(&mut parsed);
            }
            Err(err) => warn!(file = %file.display(), error = %err, "skipping payroll file"),
        }
    }
    Ok(records)
}

/// An in-memory source backed by records read from JSON files.
#[derive(Debug, Clone, Default)]
pub struct JsonDirSource {
    records: Vec<PayrollRecord>,
}

impl JsonDirSource {
    /// Wraps records that were already loaded.
    pub fn new(records: Vec<PayrollRecord>) -> Self {
        JsonDirSource { records }
    }

    /// Loads every payroll file in `path`; see [`load_payrolls_from_dir`].
    pub fn load(path: &Path) -> Result<Self> {
        load_payrolls_from_dir(path).map(Self::new)
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records were loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PayrollSource for JsonDirSource {
    fn by_user_and_month(&self, user_id: &str, year: i32, month: u32) -> Option<PayrollRecord> {
        self.records
            .iter()
            .find(|r| r.user_id == user_id && r.year == year && r.month == month)
            .cloned()
    }

    fn many(&self, filter: &PayrollFilter) -> Vec<PayrollRecord> {
        // Period order first so multi-month listings read chronologically
        let mut matched: Vec<PayrollRecord> = self
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            (a.year, a.month, &a.user_id).cmp(&(b.year, b.month, &b.user_id))
        });
        label_months(matched)
    }
}
