use std::fmt::Write;

use crate::dashboard::Dashboard;

const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Short human form of a currency magnitude: `15000000` becomes `15M`,
/// `1234567` becomes `1.23M`.
pub fn abbreviate(value: f64) -> String {
    let magnitude = value.abs();
    let (scaled, suffix) = UNITS
        .iter()
        .find(|(unit, _)| magnitude >= *unit)
        .map(|(unit, suffix)| (value / unit, *suffix))
        .unwrap_or((value, ""));

    let mut digits = format!("{scaled:.2}");
    if digits.contains('.') {
        let trimmed = digits.trim_end_matches('0').trim_end_matches('.').len();
        digits.truncate(trimmed);
    }
    if digits == "-0" {
        digits = "0".to_string();
    }
    format!("{digits}{suffix}")
}

fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

pub fn render_markdown(dashboard: &Dashboard, currency: &str) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# OKR Dashboard: {}", dashboard.quarter);
    let _ = writeln!(
        output,
        "Reference date {} (period {} to {})",
        dashboard.reference_date,
        dashboard.period.start(),
        dashboard.period.end()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Metrics");
    let _ = writeln!(
        output,
        "- Overall achievement: {:.2}%",
        dashboard.overall_achievement
    );
    let _ = writeln!(
        output,
        "- Confidence score: {:.2}%",
        dashboard.confidence_score
    );
    let _ = writeln!(
        output,
        "- Salary utilization: {} {} ({} {} against cost)",
        abbreviate(dashboard.salary.realized),
        currency,
        abbreviate(dashboard.salary.delta),
        currency
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Objectives");
    if dashboard.objectives.is_empty() {
        let _ = writeln!(output, "No objectives recorded.");
    } else {
        let _ = writeln!(output, "| Objective | Progress |");
        let _ = writeln!(output, "|---|---|");
        for row in dashboard.objectives.iter() {
            let _ = writeln!(
                output,
                "| {} | {} |",
                row.objective,
                percent(row.progress)
            );
        }
    }

    if let Some(key_results) = dashboard.key_results.as_ref() {
        let selection = &key_results.selection;
        let _ = writeln!(output);
        match selection.department.as_deref() {
            Some(department) => {
                let _ = writeln!(
                    output,
                    "## Key Results: {} ({})",
                    selection.objective, department
                );
            }
            None => {
                let _ = writeln!(output, "## Key Results: {}", selection.objective);
            }
        }
        if key_results.rows.is_empty() {
            let _ = writeln!(output, "No key results match this selection.");
        } else {
            let _ = writeln!(
                output,
                "| Key Result | Department | Sprint Point | Start Date | End Date | Progress |"
            );
            let _ = writeln!(output, "|---|---|---|---|---|---|");
            for row in key_results.rows.iter() {
                let _ = writeln!(
                    output,
                    "| {} | {} | {} | {} | {} | {} |",
                    row.key_result,
                    row.department,
                    row.sprint_point,
                    row.start_date,
                    row.end_date,
                    percent(row.progress())
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Performance by Department");
    if dashboard.departments.is_empty() {
        let _ = writeln!(output, "No departments recorded.");
    } else {
        let _ = writeln!(
            output,
            "| Department | Progress | Budget | Value Realized |"
        );
        let _ = writeln!(output, "|---|---|---|---|");
        for row in dashboard.departments.iter() {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} |",
                row.department,
                percent(row.progress),
                row.budget.map(abbreviate).unwrap_or_default(),
                row.value_realized.map(abbreviate).unwrap_or_default()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Employee Utilization");
    if dashboard.employees.is_empty() {
        let _ = writeln!(output, "No employees recorded.");
    } else {
        let _ = writeln!(
            output,
            "| Assignee | Department | Sprint Point | Utilization | Value Realized |"
        );
        let _ = writeln!(output, "|---|---|---|---|---|");
        for row in dashboard.employees.iter() {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} |",
                row.assignee,
                row.department,
                row.sprint_point,
                percent(row.utilization),
                abbreviate(row.value_realized)
            );
        }
    }

    if !dashboard.zero_effort.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Data Warnings");
        for group in dashboard.zero_effort.iter() {
            let _ = writeln!(
                output,
                "- {} `{}` has no sprint points; progress shown as 0",
                group.dimension, group.name
            );
        }
    }

    output
}

pub fn render_json(dashboard: &Dashboard) -> serde_json::Result<String> {
    serde_json::to_string_pretty(dashboard)
}
