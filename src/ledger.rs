use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    InvalidPercentage { assignment_id: i32, value: f64 },
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::InvalidPercentage {
                assignment_id,
                value,
            } => write!(
                f,
                "assignment {assignment_id} given invalid allocation percentage {value} (must be a finite non-negative number)"
            ),
        }
    }
}

impl std::error::Error for LedgerError {}

/// Sparse `(assignment, date) -> percentage` ledger. A missing entry means 0%
/// allocated; writing exactly 0 removes the entry. Values above 100 are
/// stored verbatim — over-allocation is a reporting concern, not a write-time
/// rejection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationLedger {
    entries: BTreeMap<i32, BTreeMap<NaiveDate, f64>>,
}

impl AllocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows<I>(rows: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (i32, NaiveDate, f64)>,
    {
        let mut ledger = Self::new();
        for (assignment_id, date, percentage) in rows {
            ledger.set_day(assignment_id, date, percentage)?;
        }
        Ok(ledger)
    }

    /// Owned snapshot of an assignment's entries; empty when none exist.
    pub fn get(&self, assignment_id: i32) -> BTreeMap<NaiveDate, f64> {
        self.entries
            .get(&assignment_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn percentage(&self, assignment_id: i32, date: NaiveDate) -> f64 {
        self.entries
            .get(&assignment_id)
            .and_then(|days| days.get(&date))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn set_day(
        &mut self,
        assignment_id: i32,
        date: NaiveDate,
        percentage: f64,
    ) -> Result<(), LedgerError> {
        Self::validate_percentage(assignment_id, percentage)?;
        self.write_day(assignment_id, date, percentage);
        Ok(())
    }

    /// Writes every date in the inclusive range. Validation happens before the
    /// first write, so a failure leaves no partial state; `start > end` is an
    /// Ok no-op, matching the defensive guards callers rely on.
    pub fn set_range(
        &mut self,
        assignment_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        percentage: f64,
    ) -> Result<(), LedgerError> {
        Self::validate_percentage(assignment_id, percentage)?;
        if start > end {
            return Ok(());
        }
        let mut current = start;
        while current <= end {
            self.write_day(assignment_id, current, percentage);
            current = current + Duration::days(1);
        }
        Ok(())
    }

    /// Cascade for assignment deletion. Returns the number of entries removed.
    pub fn remove_assignment(&mut self, assignment_id: i32) -> usize {
        self.entries
            .remove(&assignment_id)
            .map(|days| days.len())
            .unwrap_or(0)
    }

    pub fn assignment_ids(&self) -> Vec<i32> {
        self.entries.keys().copied().collect()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter_entries(&self) -> impl Iterator<Item = (i32, NaiveDate, f64)> {
        self.entries.iter().flat_map(|(assignment_id, days)| {
            days.iter()
                .map(move |(date, percentage)| (*assignment_id, *date, *percentage))
        })
    }

    fn write_day(&mut self, assignment_id: i32, date: NaiveDate, percentage: f64) {
        if percentage == 0.0 {
            if let Some(days) = self.entries.get_mut(&assignment_id) {
                days.remove(&date);
                if days.is_empty() {
                    self.entries.remove(&assignment_id);
                }
            }
        } else {
            self.entries
                .entry(assignment_id)
                .or_default()
                .insert(date, percentage);
        }
    }

    fn validate_percentage(assignment_id: i32, value: f64) -> Result<(), LedgerError> {
        if !value.is_finite() || value < 0.0 {
            return Err(LedgerError::InvalidPercentage {
                assignment_id,
                value,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn zeroing_last_entry_drops_the_assignment_map() {
        let mut ledger = AllocationLedger::new();
        ledger.set_day(1, d(2024, 6, 3), 50.0).unwrap();
        ledger.set_day(1, d(2024, 6, 3), 0.0).unwrap();
        assert!(ledger.is_empty());
        assert!(ledger.assignment_ids().is_empty());
    }

    #[test]
    fn rejected_write_leaves_ledger_untouched() {
        let mut ledger = AllocationLedger::new();
        ledger.set_day(1, d(2024, 6, 3), 80.0).unwrap();
        let before = ledger.clone();

        assert!(ledger.set_day(1, d(2024, 6, 4), -5.0).is_err());
        assert!(ledger.set_day(1, d(2024, 6, 4), f64::NAN).is_err());
        assert!(
            ledger
                .set_range(1, d(2024, 6, 3), d(2024, 6, 7), f64::INFINITY)
                .is_err()
        );
        assert_eq!(ledger, before);
    }
}
