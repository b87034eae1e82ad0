use crate::dataset_validation;
use crate::ledger::AllocationLedger;
use crate::model::Dataset;
use chrono::NaiveDate;
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
    NotFound,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            PersistenceError::NotFound => write!(f, "no dataset stored"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Contract of the persistence collaborator. The engine performs no retries;
/// retry/backoff policy belongs to the implementation behind this trait, and
/// failures must stay distinguishable from legitimate zero-valued results.
pub trait StaffingStore {
    fn save_dataset(&self, dataset: &Dataset, ledger: &AllocationLedger) -> PersistenceResult<()>;
    fn load_dataset(&self) -> PersistenceResult<Option<(Dataset, AllocationLedger)>>;
    fn save_ledger_write(
        &self,
        assignment_id: i32,
        date: NaiveDate,
        percentage: f64,
    ) -> PersistenceResult<()>;
    fn save_ledger_range_write(
        &self,
        assignment_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        percentage: f64,
    ) -> PersistenceResult<()>;
}

pub fn validate_dataset(dataset: &Dataset) -> PersistenceResult<()> {
    dataset_validation::validate_dataset(dataset)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

/// Dates cross the persistence boundary as ISO `YYYY-MM-DD` strings.
pub(crate) fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_iso_date(input: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_dataset_from_json, load_ledger_from_csv, save_dataset_to_json, save_ledger_to_csv,
};
