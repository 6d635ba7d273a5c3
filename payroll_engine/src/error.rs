//! Error types for loading and serving payroll data.
//!
//! The computation core never fails; these errors only arise at the
//! edges, when payroll files are read or when a request asks for data
//! that does not exist.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse payroll file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no payroll for user {user_id} in {month:02}/{year}")]
    NotFound {
        user_id: String,
        year: i32,
        month: u32,
    },

    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

pub type Result<T> = std::result::Result<T, PayrollError>;
