use chrono::NaiveDate;
use staffing_tool::calendar::{CompanyCalendar, add_months, month_end, month_start};
use staffing_tool::{CalendarEvent, CalendarEventKind};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn event(
    id: i32,
    date: NaiveDate,
    kind: CalendarEventKind,
    location: Option<&str>,
) -> CalendarEvent {
    CalendarEvent {
        id,
        date,
        kind,
        location: location.map(ToOwned::to_owned),
    }
}

#[test]
fn weekends_are_non_working_everywhere() {
    let cal = CompanyCalendar::new();
    // 2024-06-01 is a Saturday, 2024-06-02 a Sunday
    assert!(cal.is_non_working_day(d(2024, 6, 1), "Milano"));
    assert!(cal.is_non_working_day(d(2024, 6, 2), "Roma"));
    assert!(!cal.is_non_working_day(d(2024, 6, 3), "Milano"));
}

#[test]
fn unscoped_holiday_blocks_every_location() {
    let cal = CompanyCalendar::from_events(&[event(
        1,
        d(2024, 6, 5),
        CalendarEventKind::NationalHoliday,
        None,
    )]);
    assert!(cal.is_non_working_day(d(2024, 6, 5), "Milano"));
    assert!(cal.is_non_working_day(d(2024, 6, 5), "Roma"));
}

#[test]
fn local_holiday_blocks_only_its_location() {
    // Sant'Ambrogio-style patron day scoped to one office
    let cal = CompanyCalendar::from_events(&[event(
        1,
        d(2024, 6, 4),
        CalendarEventKind::LocalHoliday,
        Some("Milano"),
    )]);
    assert!(cal.is_non_working_day(d(2024, 6, 4), "Milano"));
    assert!(!cal.is_non_working_day(d(2024, 6, 4), "Roma"));
}

#[test]
fn other_events_never_block_a_day() {
    let cal = CompanyCalendar::from_events(&[event(
        1,
        d(2024, 6, 6),
        CalendarEventKind::Other,
        None,
    )]);
    assert!(!cal.is_non_working_day(d(2024, 6, 6), "Milano"));
}

#[test]
fn working_days_between_counts_inclusively() {
    let cal = CompanyCalendar::new();
    // Mon..Fri
    assert_eq!(cal.working_days_between(d(2024, 6, 3), d(2024, 6, 7), "Milano"), 5);
    // Sat..Sun only
    assert_eq!(cal.working_days_between(d(2024, 6, 1), d(2024, 6, 2), "Milano"), 0);
    // full June 2024
    assert_eq!(cal.working_days_between(d(2024, 6, 1), d(2024, 6, 30), "Milano"), 20);
}

#[test]
fn holiday_reduces_working_day_count() {
    let cal = CompanyCalendar::from_events(&[event(
        1,
        d(2024, 6, 5),
        CalendarEventKind::NationalHoliday,
        None,
    )]);
    assert_eq!(cal.working_days_between(d(2024, 6, 3), d(2024, 6, 7), "Milano"), 4);
}

#[test]
fn inverted_range_counts_zero() {
    let cal = CompanyCalendar::new();
    assert_eq!(cal.working_days_between(d(2024, 6, 7), d(2024, 6, 3), "Milano"), 0);
    assert!(cal.working_days_in_range(d(2024, 6, 7), d(2024, 6, 3), "Milano").is_empty());
}

#[test]
fn single_day_range_is_zero_or_one() {
    let cal = CompanyCalendar::new();
    assert_eq!(cal.working_days_between(d(2024, 6, 3), d(2024, 6, 3), "Milano"), 1);
    assert_eq!(cal.working_days_between(d(2024, 6, 1), d(2024, 6, 1), "Milano"), 0);
}

#[test]
fn count_never_exceeds_calendar_days() {
    let cal = CompanyCalendar::from_events(&[event(
        1,
        d(2024, 6, 5),
        CalendarEventKind::NationalHoliday,
        None,
    )]);
    let start = d(2024, 5, 20);
    for span in 0..40 {
        let end = start + chrono::Duration::days(span);
        let count = cal.working_days_between(start, end, "Milano");
        assert!(count <= span + 1, "count {count} exceeds span {}", span + 1);
    }
}

#[test]
fn month_helpers_handle_leap_february() {
    assert_eq!(month_start(d(2024, 2, 10)), d(2024, 2, 1));
    assert_eq!(month_end(d(2024, 2, 10)), d(2024, 2, 29));
    assert_eq!(add_months(d(2024, 1, 31), 1), d(2024, 2, 29));
    assert_eq!(add_months(d(2024, 11, 15), 2), d(2025, 1, 15));
}
