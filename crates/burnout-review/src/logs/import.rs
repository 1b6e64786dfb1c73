use std::io::Read;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use super::DailyLogCreate;
use crate::api::parse_timestamp;

/// A parsed CSV data row and the line it came from.
#[derive(Debug)]
pub struct CsvLogRow {
    pub line: u64,
    pub log: Result<DailyLogCreate, RowError>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("malformed row: {0}")]
    Malformed(String),
    #[error("employee_id is required")]
    MissingEmployee,
    #[error("{column} has non-numeric value '{value}'")]
    InvalidNumber { column: &'static str, value: String },
    #[error("log_date '{0}' is not a recognized date")]
    InvalidDate(String),
}

/// Reads daily logs with a header row. Only a broken header or unreadable
/// input fails the whole file; bad rows come back as per-line errors.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<CsvLogRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or(0);
        let log = record
            .deserialize::<LogRow>(Some(&headers))
            .map_err(|err| RowError::Malformed(err.to_string()))
            .and_then(LogRow::into_log);
        rows.push(CsvLogRow { line, log });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct LogRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    employee_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    log_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    hours_worked: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    hours_slept: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    daily_personal_time: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    motivation_level: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    stress_level: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    workload_intensity: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    overtime_hours_today: Option<String>,
}

impl LogRow {
    fn into_log(self) -> Result<DailyLogCreate, RowError> {
        let employee_id =
            parse_field("employee_id", self.employee_id)?.ok_or(RowError::MissingEmployee)?;
        let log_date = match self.log_date {
            Some(raw) => Some(parse_timestamp(&raw).ok_or(RowError::InvalidDate(raw))?),
            None => None,
        };

        Ok(DailyLogCreate {
            employee_id,
            log_date,
            hours_worked: parse_field("hours_worked", self.hours_worked)?,
            hours_slept: parse_field("hours_slept", self.hours_slept)?,
            daily_personal_time: parse_field("daily_personal_time", self.daily_personal_time)?,
            motivation_level: parse_field("motivation_level", self.motivation_level)?,
            stress_level: parse_field("stress_level", self.stress_level)?,
            workload_intensity: parse_field("workload_intensity", self.workload_intensity)?,
            overtime_hours_today: parse_field("overtime_hours_today", self.overtime_hours_today)?,
        })
    }
}

fn parse_field<T: FromStr>(column: &'static str, raw: Option<String>) -> Result<Option<T>, RowError> {
    raw.map(|value| {
        value
            .parse::<T>()
            .map_err(|_| RowError::InvalidNumber { column, value })
    })
    .transpose()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
