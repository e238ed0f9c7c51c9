use chrono::NaiveDate;
use serde::Serialize;

use crate::metrics::Period;

/// Drill-down selection for the key results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub objective: String,
    pub department: Option<String>,
}

impl Selection {
    pub fn objective(objective: impl Into<String>) -> Self {
        Self {
            objective: objective.into(),
            department: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub reference_date: NaiveDate,
    pub period: Period,
    pub selection: Option<Selection>,
}

impl DashboardConfig {
    /// Measures confidence against the calendar quarter of `reference_date`.
    pub fn for_quarter(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            period: Period::quarter_containing(reference_date),
            selection: None,
        }
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }
}
