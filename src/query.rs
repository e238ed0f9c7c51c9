use std::collections::BTreeSet;

use crate::models::Record;

fn distinct<'a, I>(values: I) -> Vec<String>
where
    I: Iterator<Item = &'a str>,
{
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn objectives_available(records: &[Record]) -> Vec<String> {
    distinct(records.iter().map(|record| record.objective.as_str()))
}

pub fn departments_available(records: &[Record]) -> Vec<String> {
    distinct(records.iter().map(|record| record.department.as_str()))
}

pub fn departments_for_objective(records: &[Record], objective: &str) -> Vec<String> {
    distinct(
        records
            .iter()
            .filter(|record| record.objective == objective)
            .map(|record| record.department.as_str()),
    )
}

/// Key results of one objective, optionally narrowed to a department, largest
/// sprint points first. No match gives an empty list.
pub fn key_results_for<'a>(
    records: &'a [Record],
    objective: &str,
    department: Option<&str>,
) -> Vec<&'a Record> {
    let mut matches: Vec<&Record> = records
        .iter()
        .filter(|record| record.objective == objective)
        .filter(|record| department.map_or(true, |dept| record.department == dept))
        .collect();

    matches.sort_by(|a, b| {
        b.sprint_point
            .partial_cmp(&a.sprint_point)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches
}
