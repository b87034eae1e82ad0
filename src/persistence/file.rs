use super::{PersistenceError, PersistenceResult, format_iso_date, parse_iso_date};
use crate::ledger::AllocationLedger;
use crate::model::Dataset;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct DatasetSnapshot {
    dataset: Dataset,
    #[serde(default)]
    allocations: Vec<AllocationRecord>,
}

/// Flat ledger row shared by the JSON snapshot and the CSV export.
#[derive(Debug, Default, Serialize, Deserialize)]
struct AllocationRecord {
    assignment_id: i32,
    date: String,
    percentage: f64,
}

impl DatasetSnapshot {
    fn from_parts(dataset: &Dataset, ledger: &AllocationLedger) -> PersistenceResult<Self> {
        super::validate_dataset(dataset)?;
        let allocations = ledger
            .iter_entries()
            .map(|(assignment_id, date, percentage)| AllocationRecord {
                assignment_id,
                date: format_iso_date(date),
                percentage,
            })
            .collect();
        Ok(Self {
            dataset: dataset.clone(),
            allocations,
        })
    }

    fn into_parts(self) -> PersistenceResult<(Dataset, AllocationLedger)> {
        super::validate_dataset(&self.dataset)?;
        let mut ledger = AllocationLedger::new();
        for record in self.allocations {
            let date = parse_iso_date(&record.date)?;
            ledger
                .set_day(record.assignment_id, date, record.percentage)
                .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
        }
        Ok((self.dataset, ledger))
    }
}

pub fn save_dataset_to_json<P: AsRef<Path>>(
    dataset: &Dataset,
    ledger: &AllocationLedger,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = DatasetSnapshot::from_parts(dataset, ledger)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_dataset_from_json<P: AsRef<Path>>(
    path: P,
) -> PersistenceResult<(Dataset, AllocationLedger)> {
    let file = File::open(path)?;
    let snapshot: DatasetSnapshot = serde_json::from_reader(file)?;
    snapshot.into_parts()
}

pub fn save_ledger_to_csv<P: AsRef<Path>>(
    ledger: &AllocationLedger,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for (assignment_id, date, percentage) in ledger.iter_entries() {
        writer.serialize(AllocationRecord {
            assignment_id,
            date: format_iso_date(date),
            percentage,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_ledger_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<AllocationLedger> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut ledger = AllocationLedger::new();
    for record in reader.deserialize::<AllocationRecord>() {
        let record = record?;
        let date = parse_iso_date(&record.date)?;
        ledger
            .set_day(record.assignment_id, date, record.percentage)
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    }
    Ok(ledger)
}
