use crate::aggregation::StaffingEngine;
use crate::forecast::{FinancialMonth, ForecastMonth};
use chrono::NaiveDate;
use polars::prelude::PlSmallStr;
use polars::prelude::*;

fn date_series(name: &str, dates: &[NaiveDate]) -> PolarsResult<Series> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let days: Vec<i32> = dates
        .iter()
        .map(|date| (*date - epoch).num_days() as i32)
        .collect();
    Series::new(name.into(), days).cast(&DataType::Date)
}

/// Capacity forecast rows as a table, one row per month.
pub fn forecast_dataframe(rows: &[ForecastMonth]) -> PolarsResult<DataFrame> {
    let months: Vec<NaiveDate> = rows.iter().map(|row| row.month).collect();
    let available: Vec<f64> = rows.iter().map(|row| row.available_person_days).collect();
    let allocated: Vec<f64> = rows.iter().map(|row| row.allocated_person_days).collect();
    let utilization: Vec<f64> = rows.iter().map(|row| row.utilization_percent).collect();
    let surplus: Vec<f64> = rows.iter().map(|row| row.surplus_deficit).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(5);
    columns.push(date_series("month", &months)?.into_column());
    columns.push(
        Series::new(PlSmallStr::from_static("available_person_days"), available).into_column(),
    );
    columns.push(
        Series::new(PlSmallStr::from_static("allocated_person_days"), allocated).into_column(),
    );
    columns.push(
        Series::new(PlSmallStr::from_static("utilization_percent"), utilization).into_column(),
    );
    columns.push(Series::new(PlSmallStr::from_static("surplus_deficit"), surplus).into_column());
    DataFrame::new(columns)
}

/// Monthly revenue/cost/margin rows as a table.
pub fn financials_dataframe(rows: &[FinancialMonth]) -> PolarsResult<DataFrame> {
    let months: Vec<NaiveDate> = rows.iter().map(|row| row.month).collect();
    let revenue: Vec<f64> = rows.iter().map(|row| row.revenue).collect();
    let cost: Vec<f64> = rows.iter().map(|row| row.cost).collect();
    let margin: Vec<f64> = rows.iter().map(|row| row.margin).collect();
    let margin_percent: Vec<f64> = rows.iter().map(|row| row.margin_percent).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(5);
    columns.push(date_series("month", &months)?.into_column());
    columns.push(Series::new(PlSmallStr::from_static("revenue"), revenue).into_column());
    columns.push(Series::new(PlSmallStr::from_static("cost"), cost).into_column());
    columns.push(Series::new(PlSmallStr::from_static("margin"), margin).into_column());
    columns.push(
        Series::new(PlSmallStr::from_static("margin_percent"), margin_percent).into_column(),
    );
    DataFrame::new(columns)
}

/// Per-resource utilization over a window: average allocation plus the count
/// of over-allocated working days.
pub fn utilization_dataframe(
    engine: &StaffingEngine<'_>,
    start: NaiveDate,
    end: NaiveDate,
) -> PolarsResult<DataFrame> {
    let resources = &engine.dataset().resources;
    let mut ids: Vec<i32> = Vec::with_capacity(resources.len());
    let mut names: Vec<String> = Vec::with_capacity(resources.len());
    let mut locations: Vec<String> = Vec::with_capacity(resources.len());
    let mut averages: Vec<f64> = Vec::with_capacity(resources.len());
    let mut warning_days: Vec<i64> = Vec::with_capacity(resources.len());

    for resource in resources {
        ids.push(resource.id);
        names.push(resource.name.clone());
        locations.push(resource.location.clone());
        averages.push(engine.average_allocation(resource.id, start, end));
        warning_days.push(engine.over_allocated_days(resource.id, start, end) as i64);
    }

    let mut columns: Vec<Column> = Vec::with_capacity(5);
    columns.push(Series::new(PlSmallStr::from_static("resource_id"), ids).into_column());
    columns.push(Series::new(PlSmallStr::from_static("name"), names).into_column());
    columns.push(Series::new(PlSmallStr::from_static("location"), locations).into_column());
    columns.push(Series::new(PlSmallStr::from_static("average_allocation"), averages).into_column());
    columns.push(
        Series::new(PlSmallStr::from_static("over_allocated_days"), warning_days).into_column(),
    );
    DataFrame::new(columns)
}
