use crate::aggregation::{StaffingEngine, effective_end, margin_percent};
use crate::calendar::{add_months, month_end, month_start};
use crate::model::{Assignment, BillingType, Project, Resource};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Optional organizational filters, composed with AND semantics. A project
/// filter implicitly restricts resources to those staffed on it; a client
/// filter to resources staffed on any of the client's projects; `wbs`
/// matches the project's contract WBS code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wbs: Option<String>,
}

impl ForecastFilter {
    pub fn is_empty(&self) -> bool {
        self.horizontal.is_none()
            && self.client_id.is_none()
            && self.project_id.is_none()
            && self.wbs.is_none()
    }

    fn has_project_scope(&self) -> bool {
        self.client_id.is_some() || self.project_id.is_some() || self.wbs.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMonth {
    /// First day of the month.
    pub month: NaiveDate,
    pub available_person_days: f64,
    pub allocated_person_days: f64,
    pub utilization_percent: f64,
    pub surplus_deficit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMonth {
    /// First day of the month.
    pub month: NaiveDate,
    pub revenue: f64,
    pub cost: f64,
    pub margin: f64,
    pub margin_percent: f64,
}

impl StaffingEngine<'_> {
    fn project_passes(&self, project: &Project, filter: &ForecastFilter) -> bool {
        if let Some(project_id) = filter.project_id {
            if project.id != project_id {
                return false;
            }
        }
        if let Some(client_id) = filter.client_id {
            if project.client_id != client_id {
                return false;
            }
        }
        if let Some(wbs) = filter.wbs.as_deref() {
            if self.dataset().project_wbs(project) != Some(wbs) {
                return false;
            }
        }
        true
    }

    fn resource_passes(&self, resource: &Resource, filter: &ForecastFilter) -> bool {
        if let Some(horizontal) = filter.horizontal.as_deref() {
            if resource.horizontal.as_deref() != Some(horizontal) {
                return false;
            }
        }
        if filter.has_project_scope() {
            let staffed = self
                .dataset()
                .assignments_for_resource(resource.id)
                .any(|assignment| {
                    self.dataset()
                        .project(assignment.project_id)
                        .map(|project| self.project_passes(project, filter))
                        .unwrap_or(false)
                });
            if !staffed {
                return false;
            }
        }
        true
    }

    fn assignment_passes(&self, assignment: &Assignment, filter: &ForecastFilter) -> bool {
        let Some(project) = self.dataset().project(assignment.project_id) else {
            return false;
        };
        if !self.project_passes(project, filter) {
            return false;
        }
        if let Some(horizontal) = filter.horizontal.as_deref() {
            let Some(resource) = self.dataset().resource(assignment.resource_id) else {
                return false;
            };
            if resource.horizontal.as_deref() != Some(horizontal) {
                return false;
            }
        }
        true
    }

    /// Month-by-month capacity projection over `horizon_months` calendar
    /// months, starting at the month containing `start_month`. The caller
    /// supplies its notion of "this month"; the engine reads no clock.
    pub fn forecast(
        &self,
        start_month: NaiveDate,
        horizon_months: u32,
        filter: &ForecastFilter,
    ) -> Vec<ForecastMonth> {
        let first = month_start(start_month);
        (0..horizon_months)
            .into_par_iter()
            .map(|offset| self.forecast_month(add_months(first, offset), filter))
            .collect()
    }

    fn forecast_month(&self, month: NaiveDate, filter: &ForecastFilter) -> ForecastMonth {
        let start = month;
        let end = month_end(month);

        let mut available = 0.0;
        for resource in &self.dataset().resources {
            if !self.resource_passes(resource, filter) {
                continue;
            }
            let window_end = effective_end(resource, end);
            available +=
                self.calendar()
                    .working_days_between(start, window_end, &resource.location) as f64;
        }

        let mut allocated = 0.0;
        for assignment in &self.dataset().assignments {
            if !self.assignment_passes(assignment, filter) {
                continue;
            }
            let Some(resource) = self.dataset().resource(assignment.resource_id) else {
                continue;
            };
            let window_end = effective_end(resource, end);
            for date in self
                .calendar()
                .working_days_in_range(start, window_end, &resource.location)
            {
                allocated += self.ledger().percentage(assignment.id, date) / 100.0;
            }
        }

        let utilization_percent = if available > 0.0 {
            allocated / available * 100.0
        } else {
            0.0
        };
        ForecastMonth {
            month,
            available_person_days: available,
            allocated_person_days: allocated,
            utilization_percent,
            surplus_deficit: available - allocated,
        }
    }

    /// Twelve rows, one per month of `year`, under the same revenue/cost
    /// rules as the period aggregations and the same filter composition,
    /// restricted at assignment level by the WBS filter.
    pub fn monthly_financials(&self, year: i32, filter: &ForecastFilter) -> Vec<FinancialMonth> {
        (1..=12u32)
            .into_par_iter()
            .map(|month_number| {
                let month = NaiveDate::from_ymd_opt(year, month_number, 1).unwrap();
                self.financial_month(month, filter)
            })
            .collect()
    }

    fn financial_month(&self, month: NaiveDate, filter: &ForecastFilter) -> FinancialMonth {
        let start = month;
        let end = month_end(month);
        let mut cost = 0.0;
        let mut revenue = 0.0;

        for assignment in &self.dataset().assignments {
            if !self.assignment_passes(assignment, filter) {
                continue;
            }
            let Some(project) = self.dataset().project(assignment.project_id) else {
                continue;
            };
            let Some(resource) = self.dataset().resource(assignment.resource_id) else {
                continue;
            };
            let realization = project.realization_percentage / 100.0;
            let sell_rate = match (project.billing_type, project.rate_card_id) {
                (BillingType::TimeMaterial, Some(rate_card_id)) => self
                    .dataset()
                    .sell_rate(rate_card_id, assignment.resource_id)
                    .unwrap_or(0.0),
                _ => 0.0,
            };
            let window_end = effective_end(resource, end);
            for date in self
                .calendar()
                .working_days_in_range(start, window_end, &resource.location)
            {
                let percentage = self.ledger().percentage(assignment.id, date);
                if percentage == 0.0 {
                    continue;
                }
                cost += percentage / 100.0 * self.daily_rate_for(resource, date) * realization;
                revenue += percentage / 100.0 * sell_rate;
            }
        }

        // Milestones are project-level amounts; resource-side filters cannot
        // subdivide them, so only the project filters apply here.
        for project in &self.dataset().projects {
            if project.billing_type != BillingType::FixedPrice {
                continue;
            }
            if !self.project_passes(project, filter) {
                continue;
            }
            revenue += self
                .dataset()
                .milestones_for_project(project.id)
                .filter(|milestone| start <= milestone.date && milestone.date <= end)
                .map(|milestone| milestone.amount)
                .sum::<f64>();
        }

        let margin = revenue - cost;
        FinancialMonth {
            month,
            revenue,
            cost,
            margin,
            margin_percent: margin_percent(revenue, cost),
        }
    }
}
