use chrono::{Datelike, Weekday};
use serde::Serialize;
use std::io::{self, Write};
use thiserror::Error;

use crate::calendar::parse_key;
use crate::template::{DayTemplate, format_time};
use crate::timetable::{DaysTimetable, RangeTimetable};
use crate::week::field_name;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid day key '{key}': {source}")]
    InvalidDay {
        key: String,
        #[source]
        source: chrono::ParseError,
    },
}

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Serialize)]
struct DayShiftRecord<'a> {
    date: &'a str,
    weekday: &'static str,
    from: String,
    to: String,
    required_employees: u32,
}

#[derive(Serialize)]
struct WeekShiftRecord<'a> {
    week: &'a str,
    label: &'a str,
    weekday: &'static str,
    from: String,
    to: String,
    required_employees: u32,
}

fn day_records(day: &DayTemplate) -> impl Iterator<Item = (String, String, u32)> + '_ {
    day.shifts.iter().map(|shift| {
        (
            format_time(shift.from),
            format_time(shift.to),
            shift.required_employees,
        )
    })
}

/// One CSV row per shift of every day, ordered by date.
pub fn write_days_csv<W: Write>(timetable: &DaysTimetable, writer: W) -> ExportResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for (date, day) in &timetable.days {
        let weekday = weekday_of(date)?;
        for (from, to, required_employees) in day_records(day) {
            writer.serialize(DayShiftRecord {
                date,
                weekday: field_name(weekday),
                from,
                to,
                required_employees,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// One CSV row per shift of every week, ordered by week key.
pub fn write_range_csv<W: Write>(timetable: &RangeTimetable, writer: W) -> ExportResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for (week, detailed) in &timetable.weeks {
        for (weekday, day) in detailed.template.iter() {
            for (from, to, required_employees) in day_records(day) {
                writer.serialize(WeekShiftRecord {
                    week,
                    label: &detailed.week_str,
                    weekday: field_name(weekday),
                    from,
                    to,
                    required_employees,
                })?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

fn weekday_of(key: &str) -> ExportResult<Weekday> {
    parse_key(key)
        .map(|date| date.weekday())
        .map_err(|source| ExportError::InvalidDay {
            key: key.to_string(),
            source,
        })
}
