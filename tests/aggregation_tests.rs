use chrono::NaiveDate;
use staffing_tool::{
    AllocationLedger, Assignment, BillingMilestone, BillingType, Dataset, Project, RateCardEntry,
    Resource, Role, RoleCostPeriod, StaffingEngine, margin_percent,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

/// One engineer in Milano on a time-and-materials project.
fn sample_dataset() -> Dataset {
    let mut project = Project::new(100, "Atlas", 500, BillingType::TimeMaterial);
    project.rate_card_id = Some(7);
    Dataset {
        assignments: vec![Assignment::new(1000, 1, 100)],
        resources: vec![Resource::new(1, "Ada", 10, "Milano")],
        roles: vec![Role::new(10, "Engineer", 400.0)],
        projects: vec![project],
        rate_cards: vec![RateCardEntry {
            rate_card_id: 7,
            resource_id: 1,
            daily_rate: 600.0,
        }],
        ..Dataset::default()
    }
}

#[test]
fn daily_total_sums_assignments_on_a_working_day() {
    let dataset = sample_dataset();
    let mut ledger = AllocationLedger::new();
    ledger.set_day(1000, d(2024, 6, 3), 100.0).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    assert_eq!(engine.daily_total_for_resource(1, d(2024, 6, 3)), Some(100.0));
}

#[test]
fn daily_total_is_not_applicable_on_weekends() {
    let dataset = sample_dataset();
    let mut ledger = AllocationLedger::new();
    // entry on a Saturday stays in the ledger but the day is not applicable
    ledger.set_day(1000, d(2024, 6, 1), 100.0).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    assert_eq!(engine.daily_total_for_resource(1, d(2024, 6, 1)), None);
}

#[test]
fn daily_total_is_not_applicable_after_last_day_of_work() {
    let mut dataset = sample_dataset();
    dataset.resources[0].last_day_of_work = Some(d(2024, 6, 5));
    let mut ledger = AllocationLedger::new();
    ledger.set_day(1000, d(2024, 6, 10), 100.0).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    assert_eq!(engine.daily_total_for_resource(1, d(2024, 6, 10)), None);
    assert_eq!(engine.daily_total_for_resource(1, d(2024, 6, 5)), Some(0.0));
}

#[test]
fn over_allocation_is_flagged_not_clamped() {
    let mut dataset = sample_dataset();
    dataset.assignments.push(Assignment::new(1001, 1, 100));
    let mut ledger = AllocationLedger::new();
    ledger.set_day(1000, d(2024, 6, 3), 80.0).unwrap();
    ledger.set_day(1001, d(2024, 6, 3), 40.0).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    assert_eq!(engine.daily_total_for_resource(1, d(2024, 6, 3)), Some(120.0));
    assert!(engine.is_over_allocated(1, d(2024, 6, 3)));
    assert_eq!(engine.over_allocated_days(1, d(2024, 6, 3), d(2024, 6, 7)), 1);
}

#[test]
fn average_allocation_over_five_weekdays() {
    let dataset = sample_dataset();
    let mut ledger = AllocationLedger::new();
    ledger.set_range(1000, d(2024, 6, 3), d(2024, 6, 7), 50.0).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    assert_eq!(engine.average_allocation(1, d(2024, 6, 3), d(2024, 6, 7)), 50.0);
}

#[test]
fn average_allocation_truncates_at_last_day_of_work() {
    let mut dataset = sample_dataset();
    dataset.resources[0].last_day_of_work = Some(d(2024, 6, 5));
    let mut ledger = AllocationLedger::new();
    ledger.set_range(1000, d(2024, 6, 1), d(2024, 6, 30), 50.0).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    // only Jun 3..5 count, on both sides of the ratio
    assert_eq!(engine.average_allocation(1, d(2024, 6, 1), d(2024, 6, 30)), 50.0);

    // allocation placed entirely after the last day contributes nothing
    let mut late_only = AllocationLedger::new();
    late_only.set_day(1000, d(2024, 6, 10), 100.0).unwrap();
    let engine = StaffingEngine::new(&dataset, &late_only);
    assert_eq!(engine.average_allocation(1, d(2024, 6, 1), d(2024, 6, 30)), 0.0);
}

#[test]
fn average_allocation_with_no_working_days_is_zero() {
    let dataset = sample_dataset();
    let ledger = AllocationLedger::new();
    let engine = StaffingEngine::new(&dataset, &ledger);
    // weekend-only window, and an inverted one
    assert_eq!(engine.average_allocation(1, d(2024, 6, 1), d(2024, 6, 2)), 0.0);
    assert_eq!(engine.average_allocation(1, d(2024, 6, 7), d(2024, 6, 3)), 0.0);
}

#[test]
fn aggregation_reads_are_pure() {
    let dataset = sample_dataset();
    let mut ledger = AllocationLedger::new();
    ledger.set_range(1000, d(2024, 6, 3), d(2024, 6, 21), 72.5).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    let first = engine.average_allocation(1, d(2024, 6, 1), d(2024, 6, 30));
    let second = engine.average_allocation(1, d(2024, 6, 1), d(2024, 6, 30));
    assert_eq!(first.to_bits(), second.to_bits());
}

#[test]
fn person_days_count_only_working_days() {
    let dataset = sample_dataset();
    let mut ledger = AllocationLedger::new();
    // writes cover the weekend too; aggregation must not count those days
    ledger.set_range(1000, d(2024, 6, 1), d(2024, 6, 9), 100.0).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    assert!(approx(
        engine.person_days_for_project(100, d(2024, 6, 1), d(2024, 6, 9)),
        5.0
    ));
}

#[test]
fn person_days_skip_orphaned_assignments() {
    let mut dataset = sample_dataset();
    // staffing record whose resource has been deleted
    dataset.assignments.push(Assignment::new(1001, 99, 100));
    let mut ledger = AllocationLedger::new();
    ledger.set_day(1000, d(2024, 6, 3), 100.0).unwrap();
    ledger.set_day(1001, d(2024, 6, 3), 100.0).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    assert!(approx(
        engine.person_days_for_project(100, d(2024, 6, 3), d(2024, 6, 3)),
        1.0
    ));
}

#[test]
fn cost_applies_realization_and_role_rate() {
    let mut dataset = sample_dataset();
    dataset.projects[0].realization_percentage = 80.0;
    let mut ledger = AllocationLedger::new();
    ledger.set_range(1000, d(2024, 6, 3), d(2024, 6, 4), 100.0).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    // 2 days x 400 x 0.8
    assert!(approx(engine.cost_for_period(100, d(2024, 6, 1), d(2024, 6, 30)), 640.0));
}

#[test]
fn positive_cost_override_beats_role_rate() {
    let mut dataset = sample_dataset();
    dataset.resources[0].daily_cost_override = Some(500.0);
    let mut ledger = AllocationLedger::new();
    ledger.set_day(1000, d(2024, 6, 3), 100.0).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    assert!(approx(engine.cost_for_period(100, d(2024, 6, 3), d(2024, 6, 3)), 500.0));

    // a zero override is ignored
    dataset.resources[0].daily_cost_override = Some(0.0);
    let engine = StaffingEngine::new(&dataset, &ledger);
    assert!(approx(engine.cost_for_period(100, d(2024, 6, 3), d(2024, 6, 3)), 400.0));
}

#[test]
fn dated_cost_history_wins_over_current_rate() {
    let mut dataset = sample_dataset();
    dataset.roles[0].cost_history = vec![RoleCostPeriod {
        from: Some(d(2024, 6, 1)),
        to: Some(d(2024, 6, 30)),
        daily_cost: 300.0,
    }];
    let mut ledger = AllocationLedger::new();
    ledger.set_day(1000, d(2024, 6, 3), 100.0).unwrap();
    ledger.set_day(1000, d(2024, 7, 1), 100.0).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    assert!(approx(engine.cost_for_period(100, d(2024, 6, 3), d(2024, 6, 3)), 300.0));
    // outside the dated period the current rate applies
    assert!(approx(engine.cost_for_period(100, d(2024, 7, 1), d(2024, 7, 1)), 400.0));
}

#[test]
fn time_material_revenue_uses_the_rate_card() {
    let dataset = sample_dataset();
    let mut ledger = AllocationLedger::new();
    ledger.set_range(1000, d(2024, 6, 3), d(2024, 6, 6), 50.0).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    // 4 days x 0.5 x 600
    assert!(approx(
        engine.revenue_for_period(100, d(2024, 6, 1), d(2024, 6, 30)),
        1200.0
    ));
}

#[test]
fn time_material_without_rate_card_entry_earns_nothing() {
    let mut dataset = sample_dataset();
    dataset.rate_cards.clear();
    let mut ledger = AllocationLedger::new();
    ledger.set_range(1000, d(2024, 6, 3), d(2024, 6, 7), 100.0).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    assert_eq!(engine.revenue_for_period(100, d(2024, 6, 1), d(2024, 6, 30)), 0.0);
}

#[test]
fn fixed_price_revenue_comes_from_milestones_alone() {
    let mut dataset = sample_dataset();
    dataset.projects[0].billing_type = BillingType::FixedPrice;
    dataset.billing_milestones = vec![BillingMilestone {
        id: 1,
        project_id: 100,
        date: d(2024, 6, 15),
        amount: 10000.0,
    }];
    let mut ledger = AllocationLedger::new();
    // ledger days must not contribute for fixed-price billing
    ledger.set_range(1000, d(2024, 6, 3), d(2024, 6, 7), 100.0).unwrap();

    let engine = StaffingEngine::new(&dataset, &ledger);
    assert!(approx(
        engine.revenue_for_period(100, d(2024, 6, 1), d(2024, 6, 30)),
        10000.0
    ));
    // the milestone falls outside July
    assert_eq!(engine.revenue_for_period(100, d(2024, 7, 1), d(2024, 7, 31)), 0.0);
}

#[test]
fn margin_percent_guards_zero_revenue() {
    assert_eq!(margin_percent(0.0, 500.0), 0.0);
    assert_eq!(margin_percent(0.0, 0.0), 0.0);
    assert!(approx(margin_percent(1000.0, 600.0), 40.0));
    assert!(margin_percent(0.0, f64::MAX).is_finite());
}
