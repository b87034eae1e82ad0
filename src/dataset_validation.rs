use crate::model::Dataset;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone)]
pub struct DatasetValidationError {
    message: String,
}

impl DatasetValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for DatasetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DatasetValidationError {}

fn check_unique_ids<'a, I>(ids: I, entity: &str) -> Result<(), DatasetValidationError>
where
    I: IntoIterator<Item = &'a i32>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(*id) {
            return Err(DatasetValidationError::new(format!(
                "duplicate {entity} id {id}"
            )));
        }
    }
    Ok(())
}

fn check_money(value: f64, context: String) -> Result<(), DatasetValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DatasetValidationError::new(format!(
            "{context} has invalid amount {value}"
        )));
    }
    Ok(())
}

pub fn validate_dataset(dataset: &Dataset) -> Result<(), DatasetValidationError> {
    check_unique_ids(dataset.assignments.iter().map(|a| &a.id), "assignment")?;
    check_unique_ids(dataset.resources.iter().map(|r| &r.id), "resource")?;
    check_unique_ids(dataset.roles.iter().map(|r| &r.id), "role")?;
    check_unique_ids(dataset.projects.iter().map(|p| &p.id), "project")?;
    check_unique_ids(dataset.contracts.iter().map(|c| &c.id), "contract")?;
    check_unique_ids(
        dataset.billing_milestones.iter().map(|m| &m.id),
        "billing milestone",
    )?;

    for resource in &dataset.resources {
        if !resource.max_staffing_percentage.is_finite() || resource.max_staffing_percentage <= 0.0
        {
            return Err(DatasetValidationError::new(format!(
                "resource {} has invalid max_staffing_percentage {}",
                resource.id, resource.max_staffing_percentage
            )));
        }
        if let Some(override_rate) = resource.daily_cost_override {
            check_money(
                override_rate,
                format!("resource {} daily_cost_override", resource.id),
            )?;
        }
    }

    for role in &dataset.roles {
        check_money(role.daily_cost, format!("role {} daily_cost", role.id))?;
        if let Some(standard_cost) = role.standard_cost {
            check_money(standard_cost, format!("role {} standard_cost", role.id))?;
        }
        for (idx, period) in role.cost_history.iter().enumerate() {
            check_money(
                period.daily_cost,
                format!("role {} cost_history #{idx}", role.id),
            )?;
            if let (Some(from), Some(to)) = (period.from, period.to) {
                if from > to {
                    return Err(DatasetValidationError::new(format!(
                        "role {} cost_history #{idx} starts {from} after it ends {to}",
                        role.id
                    )));
                }
            }
        }
    }

    for project in &dataset.projects {
        if !project.realization_percentage.is_finite() || project.realization_percentage < 0.0 {
            return Err(DatasetValidationError::new(format!(
                "project {} has invalid realization_percentage {}",
                project.id, project.realization_percentage
            )));
        }
    }

    let mut seen_rates = HashSet::new();
    for entry in &dataset.rate_cards {
        if !seen_rates.insert((entry.rate_card_id, entry.resource_id)) {
            return Err(DatasetValidationError::new(format!(
                "duplicate rate card entry for rate card {} and resource {}",
                entry.rate_card_id, entry.resource_id
            )));
        }
        check_money(
            entry.daily_rate,
            format!(
                "rate card {} entry for resource {}",
                entry.rate_card_id, entry.resource_id
            ),
        )?;
    }

    for milestone in &dataset.billing_milestones {
        check_money(
            milestone.amount,
            format!("billing milestone {}", milestone.id),
        )?;
    }

    Ok(())
}
