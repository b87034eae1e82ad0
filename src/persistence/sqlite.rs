use super::{PersistenceError, PersistenceResult, StaffingStore, format_iso_date, parse_iso_date};
use crate::ledger::AllocationLedger;
use crate::model::Dataset;
use chrono::{Duration, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

pub struct SqliteStaffingStore {
    connection: Mutex<Connection>,
}

impl SqliteStaffingStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS dataset (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                dataset_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS allocations (
                assignment_id INTEGER NOT NULL,
                day TEXT NOT NULL,
                percentage REAL NOT NULL,
                PRIMARY KEY (assignment_id, day)
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn write_day(
        tx: &rusqlite::Transaction,
        assignment_id: i32,
        date: NaiveDate,
        percentage: f64,
    ) -> PersistenceResult<()> {
        if percentage == 0.0 {
            tx.execute(
                "DELETE FROM allocations WHERE assignment_id = ?1 AND day = ?2",
                params![assignment_id, format_iso_date(date)],
            )?;
        } else {
            tx.execute(
                "INSERT OR REPLACE INTO allocations (assignment_id, day, percentage) VALUES (?1, ?2, ?3)",
                params![assignment_id, format_iso_date(date), percentage],
            )?;
        }
        Ok(())
    }

    fn validate_percentage(percentage: f64) -> PersistenceResult<()> {
        if !percentage.is_finite() || percentage < 0.0 {
            return Err(PersistenceError::InvalidData(format!(
                "invalid allocation percentage {percentage}"
            )));
        }
        Ok(())
    }
}

impl StaffingStore for SqliteStaffingStore {
    fn save_dataset(&self, dataset: &Dataset, ledger: &AllocationLedger) -> PersistenceResult<()> {
        super::validate_dataset(dataset)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        let json = serde_json::to_string(dataset)?;
        tx.execute("DELETE FROM dataset", [])?;
        tx.execute(
            "INSERT INTO dataset (id, dataset_json) VALUES (1, ?1)",
            params![json],
        )?;
        tx.execute("DELETE FROM allocations", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO allocations (assignment_id, day, percentage) VALUES (?1, ?2, ?3)",
            )?;
            for (assignment_id, date, percentage) in ledger.iter_entries() {
                stmt.execute(params![assignment_id, format_iso_date(date), percentage])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_dataset(&self) -> PersistenceResult<Option<(Dataset, AllocationLedger)>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare("SELECT dataset_json FROM dataset WHERE id = 1")?;
        let json_opt: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;
        let Some(json) = json_opt else {
            return Ok(None);
        };
        let dataset: Dataset = serde_json::from_str(&json)?;
        super::validate_dataset(&dataset)?;

        let mut stmt = conn.prepare(
            "SELECT assignment_id, day, percentage FROM allocations ORDER BY assignment_id, day",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i32>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?;

        let mut ledger = AllocationLedger::new();
        for row in rows {
            let (assignment_id, day, percentage) = row?;
            let date = parse_iso_date(&day)?;
            ledger
                .set_day(assignment_id, date, percentage)
                .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
        }

        Ok(Some((dataset, ledger)))
    }

    fn save_ledger_write(
        &self,
        assignment_id: i32,
        date: NaiveDate,
        percentage: f64,
    ) -> PersistenceResult<()> {
        Self::validate_percentage(percentage)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        Self::write_day(&tx, assignment_id, date, percentage)?;
        tx.commit()?;
        Ok(())
    }

    /// The whole range goes through one transaction; a failure rolls back and
    /// leaves no partial write visible.
    fn save_ledger_range_write(
        &self,
        assignment_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        percentage: f64,
    ) -> PersistenceResult<()> {
        Self::validate_percentage(percentage)?;
        if start > end {
            return Ok(());
        }
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        let mut current = start;
        while current <= end {
            Self::write_day(&tx, assignment_id, current, percentage)?;
            current = current + Duration::days(1);
        }
        tx.commit()?;
        Ok(())
    }
}
