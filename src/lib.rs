pub mod aggregation;
pub mod calendar;
pub(crate) mod dataset_validation;
pub mod forecast;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod ledger;
pub mod model;
pub mod persistence;
pub mod reports;

pub use aggregation::{StaffingEngine, margin_percent};
pub use calendar::{CompanyCalendar, LocationCalendar};
pub use forecast::{FinancialMonth, ForecastFilter, ForecastMonth};
pub use ledger::{AllocationLedger, LedgerError};
pub use model::{
    Assignment, BillingMilestone, BillingType, CalendarEvent, CalendarEventKind, Contract, Dataset,
    Project, RateCardEntry, Resource, Role, RoleCostPeriod,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStaffingStore;
pub use persistence::{
    PersistenceError, StaffingStore, load_dataset_from_json, load_ledger_from_csv,
    save_dataset_to_json, save_ledger_to_csv, validate_dataset,
};
pub use reports::{financials_dataframe, forecast_dataframe, utilization_dataframe};
