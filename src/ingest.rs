//! CSV ingestion and schema negotiation.
//!
//! Two input shapes are accepted: the raw `Sprint Point`/`Weight` pair, or a
//! precomputed `Progress` fraction per row. Both are normalized into
//! [`Record`]s whose `weight` carries earned effort.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::error::{OkrError, Result, SchemaError};
use crate::models::Record;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d %b %Y"];

/// How earned effort is expressed by the input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSource {
    Weight,
    Precomputed,
}

struct Column {
    name: &'static str,
    aliases: &'static [&'static str],
}

impl Column {
    const fn exact(name: &'static str) -> Self {
        Self { name, aliases: &[] }
    }

    /// Header index of the canonical name, falling back to the first alias found.
    fn position(&self, headers: &[&str]) -> Option<usize> {
        std::iter::once(&self.name)
            .chain(self.aliases.iter())
            .find_map(|name| headers.iter().position(|header| header == name))
    }

    fn require(&self, headers: &[&str]) -> Result<usize, SchemaError> {
        self.position(headers)
            .ok_or(SchemaError::MissingColumn { column: self.name })
    }
}

const OBJECTIVE: Column = Column::exact("Objective");
const KEY_RESULT: Column = Column {
    name: "Key Results",
    aliases: &["Tasks"],
};
const DEPARTMENT: Column = Column::exact("Department");
const ASSIGNEE: Column = Column {
    name: "Assignee",
    aliases: &["Assigne"],
};
const SPRINT_POINT: Column = Column::exact("Sprint Point");
const WEIGHT: Column = Column::exact("Weight");
const PROGRESS: Column = Column::exact("Progress");
const SALARY_QUARTERLY: Column = Column::exact("Salary Quarterly");
const START_DATE: Column = Column::exact("Start Date");
const END_DATE: Column = Column::exact("End Date");

/// Header positions of every column a record is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub progress: ProgressSource,
    objective: usize,
    key_result: usize,
    department: usize,
    assignee: usize,
    sprint_point: usize,
    earned: usize,
    salary_quarterly: usize,
    start_date: usize,
    end_date: usize,
}

/// Resolves each column to one header index and decides which progress
/// formulation to use. Canonical names win over legacy aliases, `Weight` wins
/// over `Progress`.
pub fn negotiate_schema<'a, I>(headers: I) -> Result<Schema, SchemaError>
where
    I: IntoIterator<Item = &'a str>,
{
    let headers: Vec<&str> = headers.into_iter().collect();

    let objective = OBJECTIVE.require(&headers)?;
    let key_result = KEY_RESULT.require(&headers)?;
    let department = DEPARTMENT.require(&headers)?;
    let assignee = ASSIGNEE.require(&headers)?;
    let sprint_point = SPRINT_POINT.require(&headers)?;
    let salary_quarterly = SALARY_QUARTERLY.require(&headers)?;
    let start_date = START_DATE.require(&headers)?;
    let end_date = END_DATE.require(&headers)?;

    let (progress, earned) = match (WEIGHT.position(&headers), PROGRESS.position(&headers)) {
        (Some(index), _) => (ProgressSource::Weight, index),
        (None, Some(index)) => (ProgressSource::Precomputed, index),
        (None, None) => return Err(SchemaError::NoProgressColumn),
    };

    Ok(Schema {
        progress,
        objective,
        key_result,
        department,
        assignee,
        sprint_point,
        earned,
        salary_quarterly,
        start_date,
        end_date,
    })
}

pub fn read_records<R: Read>(input: R) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let schema = negotiate_schema(reader.headers()?.iter())?;
    debug!(source = ?schema.progress, "negotiated input schema");

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = result?;
        records.push(normalize(&row, index + 1, &schema)?);
    }

    Ok(records)
}

pub fn read_records_from_path(path: &Path) -> Result<Vec<Record>> {
    let file = std::fs::File::open(path).map_err(|source| OkrError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_records(std::io::BufReader::new(file))?;
    info!(path = %path.display(), rows = records.len(), "loaded key results");
    Ok(records)
}

fn normalize(row: &StringRecord, number: usize, schema: &Schema) -> Result<Record, SchemaError> {
    let field = |index: usize| row.get(index).unwrap_or("");

    let sprint_point = parse_number(field(schema.sprint_point), number, SPRINT_POINT.name)?;

    // A blank earned cell means nothing has been delivered yet.
    let earned = field(schema.earned);
    let weight = match (schema.progress, earned.is_empty()) {
        (_, true) => 0.0,
        (ProgressSource::Weight, false) => parse_number(earned, number, WEIGHT.name)?,
        (ProgressSource::Precomputed, false) => {
            parse_fraction(earned, number, PROGRESS.name)? * sprint_point
        }
    };

    Ok(Record {
        objective: field(schema.objective).to_string(),
        key_result: field(schema.key_result).to_string(),
        department: field(schema.department).to_string(),
        assignee: field(schema.assignee).to_string(),
        sprint_point,
        weight,
        salary_quarterly: parse_number(
            field(schema.salary_quarterly),
            number,
            SALARY_QUARTERLY.name,
        )?,
        start_date: parse_date(field(schema.start_date), number, START_DATE.name)?,
        end_date: parse_date(field(schema.end_date), number, END_DATE.name)?,
    })
}

fn invalid(row: usize, column: &'static str, value: &str, reason: &str) -> SchemaError {
    SchemaError::InvalidField {
        row,
        column,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number(value: &str, row: usize, column: &'static str) -> Result<f64, SchemaError> {
    let cleaned: String = value.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(invalid(row, column, value, "value is empty"));
    }
    let parsed: f64 = cleaned
        .parse()
        .map_err(|_| invalid(row, column, value, "not a number"))?;
    if !parsed.is_finite() {
        return Err(invalid(row, column, value, "not a finite number"));
    }
    Ok(parsed)
}

fn parse_fraction(value: &str, row: usize, column: &'static str) -> Result<f64, SchemaError> {
    match value.strip_suffix('%') {
        Some(percent) => Ok(parse_number(percent.trim_end(), row, column)? / 100.0),
        None => parse_number(value, row, column),
    }
}

pub fn parse_date_str(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn parse_date(value: &str, row: usize, column: &'static str) -> Result<NaiveDate, SchemaError> {
    parse_date_str(value).ok_or_else(|| invalid(row, column, value, "unrecognized date"))
}
