use chrono::NaiveDate;
use serde::Serialize;

/// One key result row after schema negotiation.
///
/// Earned effort is always carried as `weight`; inputs that only provide a
/// precomputed progress fraction are converted at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub objective: String,
    pub key_result: String,
    pub department: String,
    pub assignee: String,
    pub sprint_point: f64,
    pub weight: f64,
    pub salary_quarterly: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Record {
    pub fn progress(&self) -> f64 {
        ratio(self.weight, self.sprint_point)
    }
}

/// Earned over planned effort, 0 when nothing was planned.
pub fn ratio(weight: f64, sprint_point: f64) -> f64 {
    if sprint_point == 0.0 {
        0.0
    } else {
        weight / sprint_point
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveSummary {
    pub objective: String,
    pub sprint_point: f64,
    pub weight: f64,
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentPerformance {
    pub department: String,
    pub sprint_point: f64,
    pub weight: f64,
    pub progress: f64,
    pub budget: Option<f64>,
    pub value_realized: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeUtilization {
    pub assignee: String,
    pub department: String,
    pub sprint_point: f64,
    pub weight: f64,
    pub salary_quarterly: f64,
    pub utilization: f64,
    pub value_realized: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalaryUtilization {
    pub realized: f64,
    pub cost: f64,
    pub delta: f64,
}

/// A dimension value whose planned effort sums to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZeroEffortGroup {
    pub dimension: &'static str,
    pub name: String,
}
