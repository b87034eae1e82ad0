use chrono::NaiveDate;
use staffing_tool::{
    AllocationLedger, Assignment, BillingType, Contract, Dataset, PersistenceError, Project,
    Resource, Role, load_dataset_from_json, load_ledger_from_csv, save_dataset_to_json,
    save_ledger_to_csv,
};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn build_sample() -> (Dataset, AllocationLedger) {
    let mut resource = Resource::new(1, "Ada", 10, "Milano");
    resource.horizontal = Some("Data".into());
    resource.last_day_of_work = Some(d(2024, 12, 31));
    resource.resigned = true;

    let mut project = Project::new(100, "Atlas", 500, BillingType::TimeMaterial);
    project.rate_card_id = Some(7);
    project.contract_id = Some(70);
    project.realization_percentage = 85.0;

    let dataset = Dataset {
        assignments: vec![Assignment::new(1000, 1, 100)],
        resources: vec![resource],
        roles: vec![Role::new(10, "Engineer", 400.0)],
        projects: vec![project],
        contracts: vec![Contract {
            id: 70,
            wbs_code: Some("WBS-1".into()),
        }],
        ..Dataset::default()
    };

    let mut ledger = AllocationLedger::new();
    ledger.set_range(1000, d(2024, 6, 3), d(2024, 6, 7), 50.0).unwrap();
    ledger.set_day(1000, d(2024, 6, 10), 120.0).unwrap();

    (dataset, ledger)
}

#[test]
fn json_round_trip_preserves_dataset_and_ledger() {
    let (dataset, ledger) = build_sample();
    let file = NamedTempFile::new().unwrap();

    save_dataset_to_json(&dataset, &ledger, file.path()).unwrap();
    let (loaded_dataset, loaded_ledger) = load_dataset_from_json(file.path()).unwrap();

    assert_eq!(loaded_dataset, dataset);
    assert_eq!(loaded_ledger, ledger);
}

#[test]
fn csv_round_trip_preserves_ledger() {
    let (_, ledger) = build_sample();
    let file = NamedTempFile::new().unwrap();

    save_ledger_to_csv(&ledger, file.path()).unwrap();
    let loaded = load_ledger_from_csv(file.path()).unwrap();

    assert_eq!(loaded, ledger);
    assert_eq!(loaded.entry_count(), 6);
}

#[test]
fn empty_ledger_round_trips_through_csv() {
    let ledger = AllocationLedger::new();
    let file = NamedTempFile::new().unwrap();

    save_ledger_to_csv(&ledger, file.path()).unwrap();
    let loaded = load_ledger_from_csv(file.path()).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn duplicate_ids_are_rejected_on_save() {
    let (mut dataset, ledger) = build_sample();
    dataset.resources.push(Resource::new(1, "Imposter", 10, "Roma"));
    let file = NamedTempFile::new().unwrap();

    let err = save_dataset_to_json(&dataset, &ledger, file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
    assert!(err.to_string().contains("duplicate resource id 1"));
}

#[test]
fn negative_percentage_in_csv_is_rejected_on_load() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        "assignment_id,date,percentage\n1000,2024-06-03,-10\n",
    )
    .unwrap();

    let err = load_ledger_from_csv(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn malformed_date_in_csv_is_rejected_on_load() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        "assignment_id,date,percentage\n1000,03/06/2024,50\n",
    )
    .unwrap();

    let err = load_ledger_from_csv(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}
