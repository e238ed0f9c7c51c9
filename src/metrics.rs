use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{OkrError, Result};
use crate::models::{ratio, EmployeeUtilization, Record, SalaryUtilization};

/// A reporting window. Construction guarantees `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end <= start {
            return Err(OkrError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// First to last day of the calendar quarter that contains `date`. In the
    /// last representable year the end saturates at `NaiveDate::MAX`.
    pub fn quarter_containing(date: NaiveDate) -> Self {
        let year = date.year();
        let first_month = (date.month0() / 3) * 3 + 1;
        let start = NaiveDate::from_ymd_opt(year, first_month, 1).unwrap_or(date);
        let next_quarter = if first_month == 10 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, first_month + 3, 1)
        };
        let end = next_quarter
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn length_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Achieved over planned effort across every record, as a percentage.
pub fn overall_achievement(records: &[Record]) -> f64 {
    let (sprint_point, weight) = records.iter().fold((0.0, 0.0), |(sp, w), record| {
        (sp + record.sprint_point, w + record.weight)
    });
    ratio(weight, sprint_point) * 100.0
}

pub fn salary_utilization(employees: &[EmployeeUtilization]) -> SalaryUtilization {
    let cost: f64 = employees.iter().map(|row| row.salary_quarterly).sum();
    let realized: f64 = employees.iter().map(|row| row.value_realized).sum();
    SalaryUtilization {
        realized,
        cost,
        delta: realized - cost,
    }
}

/// Share of the period elapsed at `reference`, as a percentage. Dates outside
/// the period give values below 0 or above 100.
pub fn time_progress(reference: NaiveDate, period: &Period) -> f64 {
    let elapsed = (reference - period.start).num_days() as f64;
    elapsed / period.length_days() as f64 * 100.0
}

/// 100 when achievement keeps pace with elapsed time, higher when ahead.
pub fn confidence_score(
    reference: NaiveDate,
    period_start: NaiveDate,
    period_end: NaiveDate,
    overall_achievement: f64,
) -> Result<f64> {
    let period = Period::new(period_start, period_end)?;
    Ok(confidence_for_period(reference, &period, overall_achievement))
}

pub fn confidence_for_period(
    reference: NaiveDate,
    period: &Period,
    overall_achievement: f64,
) -> f64 {
    100.0 - (time_progress(reference, period) - overall_achievement)
}

pub fn quarter_label(date: NaiveDate) -> String {
    format!("Q{} {}", date.month0() / 3 + 1, date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(sprint_point: f64, weight: f64) -> Record {
        Record {
            objective: "Grow Revenue".to_string(),
            key_result: "Close deals".to_string(),
            department: "Sales".to_string(),
            assignee: "Alice".to_string(),
            sprint_point,
            weight,
            salary_quarterly: 1000.0,
            start_date: date(2023, 10, 1),
            end_date: date(2023, 12, 31),
        }
    }

    fn employee(salary: f64, utilization: f64) -> EmployeeUtilization {
        EmployeeUtilization {
            assignee: "Alice".to_string(),
            department: "Sales".to_string(),
            sprint_point: 10.0,
            weight: 10.0 * utilization,
            salary_quarterly: salary,
            utilization,
            value_realized: salary * utilization,
        }
    }

    #[test]
    fn overall_achievement_single_row() {
        assert_eq!(overall_achievement(&[record(10.0, 5.0)]), 50.0);
    }

    #[test]
    fn overall_achievement_is_ungrouped() {
        let records = [record(10.0, 5.0), record(20.0, 20.0)];
        assert!((overall_achievement(&records) - 2500.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn overall_achievement_guards_zero_effort() {
        assert_eq!(overall_achievement(&[record(0.0, 0.0)]), 0.0);
        assert_eq!(overall_achievement(&[]), 0.0);
    }

    #[test]
    fn salary_delta_is_realized_minus_cost() {
        let employees = [employee(15_000_000.0, 0.8), employee(7_333_333.33, 0.37)];
        let salary = salary_utilization(&employees);
        assert!((salary.cost - 22_333_333.33).abs() < 1e-6);
        assert!((salary.delta - (salary.realized - salary.cost)).abs() < 1e-9);
        assert!(salary.delta < 0.0);
    }

    #[test]
    fn confidence_matches_elapsed_time() {
        let start = date(2023, 10, 1);
        let end = date(2023, 10, 11);
        let reference = date(2023, 10, 4);
        let score = confidence_score(reference, start, end, 20.0).unwrap();
        assert!((score - 90.0).abs() < 1e-9);
    }

    #[test]
    fn confidence_above_hundred_when_ahead() {
        let start = date(2023, 10, 1);
        let score = confidence_score(start, start, date(2023, 10, 11), 40.0).unwrap();
        assert_eq!(score, 140.0);
    }

    #[test]
    fn inverted_period_is_rejected() {
        let day = date(2023, 10, 10);
        let err = confidence_score(date(2023, 10, 5), day, day, 50.0).unwrap_err();
        assert!(matches!(err, OkrError::InvalidPeriod { .. }));
        assert!(Period::new(date(2023, 12, 31), date(2023, 10, 1)).is_err());
    }

    #[test]
    fn quarter_bounds() {
        let q4 = Period::quarter_containing(date(2023, 12, 8));
        assert_eq!(q4.start(), date(2023, 10, 1));
        assert_eq!(q4.end(), date(2023, 12, 31));

        let q1 = Period::quarter_containing(date(2024, 2, 29));
        assert_eq!(q1.start(), date(2024, 1, 1));
        assert_eq!(q1.end(), date(2024, 3, 31));
    }

    #[test]
    fn last_representable_quarter_stays_non_empty() {
        let period = Period::quarter_containing(NaiveDate::MAX);
        assert_eq!(period.end(), NaiveDate::MAX);
        assert!(period.start() < period.end());
        assert!(period.length_days() > 0);
        assert!(time_progress(NaiveDate::MAX, &period).is_finite());
    }

    #[test]
    fn time_progress_is_unclamped() {
        let period = Period::new(date(2023, 10, 1), date(2023, 10, 11)).unwrap();
        assert_eq!(time_progress(date(2023, 10, 11), &period), 100.0);
        assert_eq!(time_progress(date(2023, 10, 16), &period), 150.0);
        assert_eq!(time_progress(date(2023, 9, 26), &period), -50.0);
    }

    #[test]
    fn labels_quarters() {
        assert_eq!(quarter_label(date(2023, 12, 8)), "Q4 2023");
        assert_eq!(quarter_label(date(2024, 1, 1)), "Q1 2024");
        assert_eq!(quarter_label(date(2024, 6, 30)), "Q2 2024");
    }
}
