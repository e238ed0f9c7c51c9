use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::warn;

use crate::models::{
    ratio, DepartmentPerformance, EmployeeUtilization, ObjectiveSummary, Record, ZeroEffortGroup,
};

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    sprint_point: f64,
    weight: f64,
}

impl Totals {
    fn add(&mut self, record: &Record) {
        self.sprint_point += record.sprint_point;
        self.weight += record.weight;
    }

    fn progress(&self) -> f64 {
        ratio(self.weight, self.sprint_point)
    }
}

fn totals_by<'a, K, F>(records: &'a [Record], key: F) -> BTreeMap<K, Totals>
where
    K: Ord,
    F: Fn(&'a Record) -> K,
{
    let mut groups: BTreeMap<K, Totals> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)).or_default().add(record);
    }
    groups
}

fn warn_zero_effort(dimension: &str, name: &str, totals: &Totals) {
    if totals.sprint_point == 0.0 {
        warn!(
            dimension,
            group = name,
            "sprint points sum to zero, reporting progress as 0"
        );
    }
}

pub fn summarize_by_objective(records: &[Record]) -> Vec<ObjectiveSummary> {
    totals_by(records, |record| record.objective.as_str())
        .into_iter()
        .map(|(objective, totals)| {
            warn_zero_effort("objective", objective, &totals);
            ObjectiveSummary {
                objective: objective.to_string(),
                sprint_point: totals.sprint_point,
                weight: totals.weight,
                progress: totals.progress(),
            }
        })
        .collect()
}

pub fn summarize_by_department(records: &[Record]) -> Vec<DepartmentPerformance> {
    let groups = totals_by(records, |record| record.department.as_str());
    let mut rows: Vec<DepartmentPerformance> = groups
        .into_iter()
        .map(|(department, totals)| {
            warn_zero_effort("department", department, &totals);
            DepartmentPerformance {
                department: department.to_string(),
                sprint_point: totals.sprint_point,
                weight: totals.weight,
                progress: totals.progress(),
                budget: None,
                value_realized: None,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.progress
            .partial_cmp(&a.progress)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.department.cmp(&b.department))
    });
    rows
}

/// Joins each department's summed quarterly salary onto its performance row.
pub fn with_budgets(
    mut performance: Vec<DepartmentPerformance>,
    employees: &[EmployeeUtilization],
) -> Vec<DepartmentPerformance> {
    let mut budgets: BTreeMap<&str, f64> = BTreeMap::new();
    for employee in employees {
        *budgets.entry(employee.department.as_str()).or_insert(0.0) += employee.salary_quarterly;
    }

    for row in performance.iter_mut() {
        let budget = budgets
            .get(row.department.as_str())
            .copied()
            .unwrap_or(0.0);
        row.budget = Some(budget);
        row.value_realized = Some(budget * row.progress);
    }
    performance
}

pub fn summarize_by_employee(records: &[Record]) -> Vec<EmployeeUtilization> {
    #[derive(Default)]
    struct Group {
        totals: Totals,
        salary_sum: f64,
        salary_min: f64,
        salary_max: f64,
        rows: usize,
    }

    let mut groups: BTreeMap<(&str, &str), Group> = BTreeMap::new();
    for record in records {
        let group = groups
            .entry((record.assignee.as_str(), record.department.as_str()))
            .or_default();
        if group.rows == 0 {
            group.salary_min = record.salary_quarterly;
            group.salary_max = record.salary_quarterly;
        } else {
            group.salary_min = group.salary_min.min(record.salary_quarterly);
            group.salary_max = group.salary_max.max(record.salary_quarterly);
        }
        group.totals.add(record);
        group.salary_sum += record.salary_quarterly;
        group.rows += 1;
    }

    let mut rows: Vec<EmployeeUtilization> = groups
        .into_iter()
        .map(|((assignee, department), group)| {
            warn_zero_effort("employee", assignee, &group.totals);
            if group.salary_min != group.salary_max {
                warn!(
                    assignee,
                    department,
                    min = group.salary_min,
                    max = group.salary_max,
                    "quarterly salary differs across rows, using the mean"
                );
            }
            let salary_quarterly = group.salary_sum / group.rows as f64;
            let utilization = group.totals.progress();
            EmployeeUtilization {
                assignee: assignee.to_string(),
                department: department.to_string(),
                sprint_point: group.totals.sprint_point,
                weight: group.totals.weight,
                salary_quarterly,
                utilization,
                value_realized: utilization * salary_quarterly,
            }
        })
        .collect();

    // BTreeMap order already breaks ties by assignee then department; the sort is stable.
    rows.sort_by(|a, b| {
        b.sprint_point
            .partial_cmp(&a.sprint_point)
            .unwrap_or(Ordering::Equal)
    });
    rows
}

/// Objectives, departments and employees whose planned effort sums to zero.
pub fn zero_effort_groups(
    objectives: &[ObjectiveSummary],
    departments: &[DepartmentPerformance],
    employees: &[EmployeeUtilization],
) -> Vec<ZeroEffortGroup> {
    let objectives = objectives
        .iter()
        .filter(|row| row.sprint_point == 0.0)
        .map(|row| ZeroEffortGroup {
            dimension: "objective",
            name: row.objective.clone(),
        });
    let departments = departments
        .iter()
        .filter(|row| row.sprint_point == 0.0)
        .map(|row| ZeroEffortGroup {
            dimension: "department",
            name: row.department.clone(),
        });
    let employees = employees
        .iter()
        .filter(|row| row.sprint_point == 0.0)
        .map(|row| ZeroEffortGroup {
            dimension: "employee",
            name: format!("{} ({})", row.assignee, row.department),
        });
    objectives.chain(departments).chain(employees).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(
        objective: &str,
        department: &str,
        assignee: &str,
        sprint_point: f64,
        weight: f64,
        salary: f64,
    ) -> Record {
        Record {
            objective: objective.to_string(),
            key_result: format!("{objective} task"),
            department: department.to_string(),
            assignee: assignee.to_string(),
            sprint_point,
            weight,
            salary_quarterly: salary,
            start_date: NaiveDate::from_ymd_opt(2023, 10, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record("Grow Revenue", "Sales", "Alice", 10.0, 5.0, 1000.0),
            record("Grow Revenue", "Marketing", "Bob", 20.0, 20.0, 800.0),
            record("Retain Users", "Sales", "Alice", 4.0, 1.0, 1000.0),
            record("Retain Users", "Support", "Cara", 6.0, 3.0, 600.0),
            record("Retain Users", "Support", "Dev", 6.0, 3.0, 500.0),
        ]
    }

    fn find<'a>(rows: &'a [DepartmentPerformance], name: &str) -> &'a DepartmentPerformance {
        rows.iter().find(|row| row.department == name).unwrap()
    }

    #[test]
    fn single_row_objective_progress() {
        let records = vec![record("Grow Revenue", "Sales", "Alice", 10.0, 5.0, 10.0)];
        let summary = summarize_by_objective(&records);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].objective, "Grow Revenue");
        assert_eq!(summary[0].progress, 0.5);
    }

    #[test]
    fn objective_progress_is_effort_weighted() {
        let records = vec![
            record("Grow Revenue", "Sales", "Alice", 10.0, 5.0, 1000.0),
            record("Grow Revenue", "Sales", "Alice", 20.0, 20.0, 1000.0),
        ];
        let summary = summarize_by_objective(&records);
        assert!((summary[0].progress - 25.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn group_totals_match_row_sums() {
        let records = sample();
        for row in summarize_by_objective(&records) {
            let members: Vec<&Record> = records
                .iter()
                .filter(|r| r.objective == row.objective)
                .collect();
            let sprint_point: f64 = members.iter().map(|r| r.sprint_point).sum();
            let weight: f64 = members.iter().map(|r| r.weight).sum();
            assert_eq!(row.sprint_point, sprint_point);
            assert_eq!(row.weight, weight);
        }

        let departments = summarize_by_department(&records);
        let total: f64 = departments.iter().map(|r| r.sprint_point).sum();
        assert_eq!(total, 46.0);
    }

    #[test]
    fn zero_effort_group_reports_zero_progress() {
        let records = vec![
            record("Idle", "Ops", "Eve", 0.0, 0.0, 100.0),
            record("Idle", "Ops", "Eve", 0.0, 2.0, 100.0),
        ];
        let objectives = summarize_by_objective(&records);
        let departments = summarize_by_department(&records);
        let employees = summarize_by_employee(&records);
        assert_eq!(objectives[0].progress, 0.0);
        assert_eq!(departments[0].progress, 0.0);
        assert_eq!(employees[0].utilization, 0.0);

        let flagged = zero_effort_groups(&objectives, &departments, &employees);
        assert_eq!(flagged.len(), 3);
        assert_eq!(flagged[0].name, "Idle");
        assert_eq!(flagged[1].dimension, "department");
        assert_eq!(flagged[2].name, "Eve (Ops)");
    }

    #[test]
    fn idle_employee_flagged_inside_busy_department() {
        let records = vec![
            record("Grow Revenue", "Sales", "Alice", 10.0, 5.0, 1000.0),
            record("Grow Revenue", "Sales", "Idle", 0.0, 0.0, 1000.0),
        ];
        let objectives = summarize_by_objective(&records);
        let departments = summarize_by_department(&records);
        let employees = summarize_by_employee(&records);

        let flagged = zero_effort_groups(&objectives, &departments, &employees);
        assert_eq!(
            flagged,
            vec![ZeroEffortGroup {
                dimension: "employee",
                name: "Idle (Sales)".to_string(),
            }]
        );
    }

    #[test]
    fn departments_sorted_by_progress_then_name() {
        let records = vec![
            record("A", "Support", "Cara", 10.0, 5.0, 1.0),
            record("A", "Marketing", "Bob", 10.0, 10.0, 1.0),
            record("A", "Engineering", "Dev", 4.0, 2.0, 1.0),
        ];
        let names: Vec<_> = summarize_by_department(&records)
            .into_iter()
            .map(|row| row.department)
            .collect();
        assert_eq!(names, vec!["Marketing", "Engineering", "Support"]);
    }

    #[test]
    fn employee_rows_group_by_assignee_and_department() {
        let employees = summarize_by_employee(&sample());
        assert_eq!(employees.len(), 4);

        assert_eq!(employees[0].assignee, "Bob");
        assert_eq!(employees[0].sprint_point, 20.0);
        assert_eq!(employees[0].utilization, 1.0);
        assert_eq!(employees[0].value_realized, 800.0);

        let alice = &employees[1];
        assert_eq!(alice.assignee, "Alice");
        assert_eq!(alice.sprint_point, 14.0);
        assert_eq!(alice.salary_quarterly, 1000.0);
        assert!((alice.utilization - 6.0 / 14.0).abs() < 1e-9);

        // Cara and Dev tie on sprint points; assignee name decides.
        assert_eq!(employees[2].assignee, "Cara");
        assert_eq!(employees[3].assignee, "Dev");
    }

    #[test]
    fn salary_is_averaged_within_group() {
        let records = vec![
            record("A", "Sales", "Alice", 5.0, 5.0, 900.0),
            record("A", "Sales", "Alice", 5.0, 5.0, 1100.0),
        ];
        let employees = summarize_by_employee(&records);
        assert_eq!(employees[0].salary_quarterly, 1000.0);
    }

    #[test]
    fn budgets_join_employee_salaries() {
        let records = sample();
        let employees = summarize_by_employee(&records);
        let performance = with_budgets(summarize_by_department(&records), &employees);

        let support = find(&performance, "Support");
        assert_eq!(support.budget, Some(1100.0));
        assert_eq!(support.value_realized, Some(1100.0 * 0.5));

        assert_eq!(find(&performance, "Sales").budget, Some(1000.0));
    }

    #[test]
    fn aggregation_is_repeatable_and_order_independent() {
        let records = sample();
        let mut reversed = records.clone();
        reversed.reverse();

        let objectives = summarize_by_objective(&records);
        assert_eq!(objectives, summarize_by_objective(&records));
        assert_eq!(objectives, summarize_by_objective(&reversed));

        let departments = summarize_by_department(&records);
        assert_eq!(departments, summarize_by_department(&reversed));

        let employees = summarize_by_employee(&records);
        assert_eq!(employees, summarize_by_employee(&reversed));
    }

    #[test]
    fn empty_input_yields_empty_tables() {
        assert!(summarize_by_objective(&[]).is_empty());
        assert!(summarize_by_department(&[]).is_empty());
        assert!(summarize_by_employee(&[]).is_empty());
    }
}
