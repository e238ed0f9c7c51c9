use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::aggregate::{
    summarize_by_department, summarize_by_employee, summarize_by_objective, with_budgets,
    zero_effort_groups,
};
use crate::config::{DashboardConfig, Selection};
use crate::metrics::{
    confidence_for_period, overall_achievement, quarter_label, salary_utilization, Period,
};
use crate::models::{
    DepartmentPerformance, EmployeeUtilization, ObjectiveSummary, Record, SalaryUtilization,
    ZeroEffortGroup,
};
use crate::query::key_results_for;

#[derive(Debug, Clone, Serialize)]
pub struct KeyResults {
    pub selection: Selection,
    pub rows: Vec<Record>,
}

/// Everything the renderer needs, computed in one pass over a record snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub reference_date: NaiveDate,
    pub quarter: String,
    pub period: Period,
    pub overall_achievement: f64,
    pub confidence_score: f64,
    pub salary: SalaryUtilization,
    pub objectives: Vec<ObjectiveSummary>,
    pub departments: Vec<DepartmentPerformance>,
    pub employees: Vec<EmployeeUtilization>,
    pub key_results: Option<KeyResults>,
    pub zero_effort: Vec<ZeroEffortGroup>,
}

pub fn build_dashboard(records: &[Record], config: &DashboardConfig) -> Dashboard {
    let objectives = summarize_by_objective(records);
    let employees = summarize_by_employee(records);
    let departments = with_budgets(summarize_by_department(records), &employees);

    let overall = overall_achievement(records);
    let salary = salary_utilization(&employees);
    let confidence = confidence_for_period(config.reference_date, &config.period, overall);

    let key_results = config.selection.as_ref().map(|selection| {
        let rows = key_results_for(
            records,
            &selection.objective,
            selection.department.as_deref(),
        );
        KeyResults {
            selection: selection.clone(),
            rows: rows.into_iter().cloned().collect(),
        }
    });

    let zero_effort = zero_effort_groups(&objectives, &departments, &employees);

    debug!(
        records = records.len(),
        objectives = objectives.len(),
        departments = departments.len(),
        employees = employees.len(),
        "dashboard computed"
    );

    Dashboard {
        reference_date: config.reference_date,
        quarter: quarter_label(config.reference_date),
        period: config.period,
        overall_achievement: overall,
        confidence_score: confidence,
        salary,
        objectives,
        departments,
        employees,
        key_results,
        zero_effort,
    }
}
