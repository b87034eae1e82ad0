use crate::calendar::CompanyCalendar;
use crate::ledger::AllocationLedger;
use crate::model::{Assignment, BillingType, Dataset, Resource};
use chrono::NaiveDate;

const EPSILON: f64 = 1e-6;

/// Pure read-side engine over a ledger + dataset pair. Every operation is a
/// function of its inputs: no clock reads, no mutation, no caching. Orphaned
/// references (an assignment pointing at a resource, project, or role that no
/// longer exists) are skipped so one bad record never poisons a total, and
/// every division-by-zero situation resolves to 0.
pub struct StaffingEngine<'a> {
    dataset: &'a Dataset,
    ledger: &'a AllocationLedger,
    calendar: CompanyCalendar,
}

impl<'a> StaffingEngine<'a> {
    pub fn new(dataset: &'a Dataset, ledger: &'a AllocationLedger) -> Self {
        let calendar = CompanyCalendar::from_events(&dataset.calendar_events);
        Self {
            dataset,
            ledger,
            calendar,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        self.dataset
    }

    pub fn ledger(&self) -> &AllocationLedger {
        self.ledger
    }

    pub fn calendar(&self) -> &CompanyCalendar {
        &self.calendar
    }

    /// Sum of ledger percentages across the resource's assignments for one
    /// date. `None` marks "not applicable" — a non-working day for the
    /// resource's location, a date past its last day of work, or an unknown
    /// resource — as distinct from an idle 0%.
    pub fn daily_total_for_resource(&self, resource_id: i32, date: NaiveDate) -> Option<f64> {
        let resource = self.dataset.resource(resource_id)?;
        if resource.last_day_of_work.is_some_and(|last| date > last) {
            return None;
        }
        if self.calendar.is_non_working_day(date, &resource.location) {
            return None;
        }
        let total = self
            .dataset
            .assignments_for_resource(resource_id)
            .map(|assignment| self.ledger.percentage(assignment.id, date))
            .sum();
        Some(total)
    }

    /// Warning state: the daily total exceeds the resource's staffing cap.
    /// Nothing is clamped; the excess stays visible to forecasting.
    pub fn is_over_allocated(&self, resource_id: i32, date: NaiveDate) -> bool {
        let Some(resource) = self.dataset.resource(resource_id) else {
            return false;
        };
        match self.daily_total_for_resource(resource_id, date) {
            Some(total) => total > resource.max_staffing_percentage + EPSILON,
            None => false,
        }
    }

    pub fn over_allocated_days(&self, resource_id: i32, start: NaiveDate, end: NaiveDate) -> usize {
        let Some(resource) = self.dataset.resource(resource_id) else {
            return 0;
        };
        let end = effective_end(resource, end);
        self.calendar
            .working_days_in_range(start, end, &resource.location)
            .into_iter()
            .filter(|date| self.is_over_allocated(resource_id, *date))
            .count()
    }

    /// Allocated person-days over working days in the window, as a
    /// percentage. Both sides of the ratio are truncated at the resource's
    /// last day of work; zero working days yields 0.
    pub fn average_allocation(&self, resource_id: i32, start: NaiveDate, end: NaiveDate) -> f64 {
        let Some(resource) = self.dataset.resource(resource_id) else {
            return 0.0;
        };
        let end = effective_end(resource, end);
        let working_days = self
            .calendar
            .working_days_in_range(start, end, &resource.location);
        if working_days.is_empty() {
            return 0.0;
        }
        let assignments: Vec<&Assignment> =
            self.dataset.assignments_for_resource(resource_id).collect();
        let mut person_days = 0.0;
        for date in &working_days {
            for assignment in &assignments {
                person_days += self.ledger.percentage(assignment.id, *date) / 100.0;
            }
        }
        person_days / working_days.len() as f64 * 100.0
    }

    /// Person-days booked on a project, each assignment restricted to its own
    /// resource's working calendar.
    pub fn person_days_for_project(&self, project_id: i32, start: NaiveDate, end: NaiveDate) -> f64 {
        let mut total = 0.0;
        for assignment in self.dataset.assignments_for_project(project_id) {
            let Some(resource) = self.dataset.resource(assignment.resource_id) else {
                continue;
            };
            let end = effective_end(resource, end);
            for date in self
                .calendar
                .working_days_in_range(start, end, &resource.location)
            {
                total += self.ledger.percentage(assignment.id, date) / 100.0;
            }
        }
        total
    }

    /// Daily cost rate effective for a resource on a date: a positive
    /// resource-level override wins, then the role cost-history period
    /// covering the date, then the role's current daily cost.
    pub fn daily_rate_for(&self, resource: &Resource, date: NaiveDate) -> f64 {
        if let Some(override_rate) = resource.daily_cost_override {
            if override_rate > 0.0 {
                return override_rate;
            }
        }
        let Some(role) = self.dataset.role(resource.role_id) else {
            return 0.0;
        };
        role.cost_history
            .iter()
            .find(|period| period.covers(date))
            .map(|period| period.daily_cost)
            .unwrap_or(role.daily_cost)
    }

    /// Realized cost: `percentage/100 * daily_rate * realization/100` per
    /// working assignment-day.
    pub fn cost_for_period(&self, project_id: i32, start: NaiveDate, end: NaiveDate) -> f64 {
        let Some(project) = self.dataset.project(project_id) else {
            return 0.0;
        };
        let realization = project.realization_percentage / 100.0;
        let mut cost = 0.0;
        for assignment in self.dataset.assignments_for_project(project_id) {
            let Some(resource) = self.dataset.resource(assignment.resource_id) else {
                continue;
            };
            let end = effective_end(resource, end);
            for date in self
                .calendar
                .working_days_in_range(start, end, &resource.location)
            {
                let percentage = self.ledger.percentage(assignment.id, date);
                if percentage == 0.0 {
                    continue;
                }
                cost += percentage / 100.0 * self.daily_rate_for(resource, date) * realization;
            }
        }
        cost
    }

    /// Revenue for the period. Time-and-materials projects bill ledger days
    /// against the linked rate card; fixed-price projects recognize billing
    /// milestones dated within the period. The two sources are mutually
    /// exclusive per project.
    pub fn revenue_for_period(&self, project_id: i32, start: NaiveDate, end: NaiveDate) -> f64 {
        let Some(project) = self.dataset.project(project_id) else {
            return 0.0;
        };
        match project.billing_type {
            BillingType::FixedPrice => self
                .dataset
                .milestones_for_project(project_id)
                .filter(|milestone| start <= milestone.date && milestone.date <= end)
                .map(|milestone| milestone.amount)
                .sum(),
            BillingType::TimeMaterial => {
                let Some(rate_card_id) = project.rate_card_id else {
                    return 0.0;
                };
                let mut revenue = 0.0;
                for assignment in self.dataset.assignments_for_project(project_id) {
                    let Some(resource) = self.dataset.resource(assignment.resource_id) else {
                        continue;
                    };
                    let Some(sell_rate) =
                        self.dataset.sell_rate(rate_card_id, assignment.resource_id)
                    else {
                        continue;
                    };
                    let end = effective_end(resource, end);
                    for date in self
                        .calendar
                        .working_days_in_range(start, end, &resource.location)
                    {
                        revenue += self.ledger.percentage(assignment.id, date) / 100.0 * sell_rate;
                    }
                }
                revenue
            }
        }
    }
}

/// Aggregation windows stop at a resource's last day of work.
pub(crate) fn effective_end(resource: &Resource, end: NaiveDate) -> NaiveDate {
    match resource.last_day_of_work {
        Some(last) if last < end => last,
        _ => end,
    }
}

/// `(revenue - cost) / revenue`, guarded so zero revenue reports 0 rather
/// than NaN or infinity.
pub fn margin_percent(revenue: f64, cost: f64) -> f64 {
    if revenue > 0.0 {
        (revenue - cost) / revenue * 100.0
    } else {
        0.0
    }
}
