use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn default_percentage() -> f64 {
    100.0
}

/// Staffing link between one resource and one project. Deleting an
/// assignment cascades to its allocation ledger entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i32,
    pub resource_id: i32,
    pub project_id: i32,
}

impl Assignment {
    pub fn new(id: i32, resource_id: i32, project_id: i32) -> Self {
        Self {
            id,
            resource_id,
            project_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: i32,
    pub name: String,
    pub role_id: i32,
    /// Location key used to resolve the resource's holiday calendar.
    pub location: String,
    /// Organizational grouping (function/horizontal) used by forecast filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<String>,
    /// Overrides the role daily cost when positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_cost_override: Option<f64>,
    /// Staffing cap; daily totals above it are flagged, never clamped.
    #[serde(default = "default_percentage")]
    pub max_staffing_percentage: f64,
    #[serde(default)]
    pub resigned: bool,
    /// Truncates every aggregation window for this resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_day_of_work: Option<NaiveDate>,
}

impl Resource {
    pub fn new(id: i32, name: impl Into<String>, role_id: i32, location: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            role_id,
            location: location.into(),
            horizontal: None,
            daily_cost_override: None,
            max_staffing_percentage: default_percentage(),
            resigned: false,
            last_day_of_work: None,
        }
    }
}

/// Date-bounded role rate; an open bound applies indefinitely in that direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCostPeriod {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    pub daily_cost: f64,
}

impl RoleCostPeriod {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| from <= date) && self.to.map_or(true, |to| date <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub daily_cost: f64,
    /// Standard cost used for margin views, distinct from the realized daily cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cost_history: Vec<RoleCostPeriod>,
}

impl Role {
    pub fn new(id: i32, name: impl Into<String>, daily_cost: f64) -> Self {
        Self {
            id,
            name: name.into(),
            daily_cost,
            standard_cost: None,
            cost_history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingType {
    TimeMaterial,
    FixedPrice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub client_id: i32,
    pub billing_type: BillingType,
    /// Cost-dampening factor applied uniformly to realized cost.
    #[serde(default = "default_percentage")]
    pub realization_percentage: f64,
    /// Sell-rate lookup for time-and-materials billing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_card_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<i32>,
}

impl Project {
    pub fn new(id: i32, name: impl Into<String>, client_id: i32, billing_type: BillingType) -> Self {
        Self {
            id,
            name: name.into(),
            client_id,
            billing_type,
            realization_percentage: default_percentage(),
            rate_card_id: None,
            contract_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wbs_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalendarEventKind {
    NationalHoliday,
    LocalHoliday,
    Other,
}

/// Shared company calendar record. `location = None` applies everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i32,
    pub date: NaiveDate,
    pub kind: CalendarEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Per-resource daily sell rate, used only for time-and-materials revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCardEntry {
    pub rate_card_id: i32,
    pub resource_id: i32,
    pub daily_rate: f64,
}

/// Fixed-price revenue recognized in the month of `date`, independent of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingMilestone {
    pub id: i32,
    pub project_id: i32,
    pub date: NaiveDate,
    pub amount: f64,
}

/// Everything the persistence collaborator loads in one shot. The allocation
/// ledger travels alongside it but is kept as its own type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub contracts: Vec<Contract>,
    #[serde(default)]
    pub calendar_events: Vec<CalendarEvent>,
    #[serde(default)]
    pub rate_cards: Vec<RateCardEntry>,
    #[serde(default)]
    pub billing_milestones: Vec<BillingMilestone>,
}

impl Dataset {
    pub fn assignment(&self, id: i32) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    pub fn resource(&self, id: i32) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn role(&self, id: i32) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    pub fn project(&self, id: i32) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn contract(&self, id: i32) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.id == id)
    }

    pub fn assignments_for_resource(&self, resource_id: i32) -> impl Iterator<Item = &Assignment> {
        self.assignments
            .iter()
            .filter(move |a| a.resource_id == resource_id)
    }

    pub fn assignments_for_project(&self, project_id: i32) -> impl Iterator<Item = &Assignment> {
        self.assignments
            .iter()
            .filter(move |a| a.project_id == project_id)
    }

    pub fn sell_rate(&self, rate_card_id: i32, resource_id: i32) -> Option<f64> {
        self.rate_cards
            .iter()
            .find(|e| e.rate_card_id == rate_card_id && e.resource_id == resource_id)
            .map(|e| e.daily_rate)
    }

    pub fn milestones_for_project(&self, project_id: i32) -> impl Iterator<Item = &BillingMilestone> {
        self.billing_milestones
            .iter()
            .filter(move |m| m.project_id == project_id)
    }

    /// WBS code reachable through the project's linked contract.
    pub fn project_wbs(&self, project: &Project) -> Option<&str> {
        self.contract(project.contract_id?)?.wbs_code.as_deref()
    }
}
