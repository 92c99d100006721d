use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ScheduleError, ScheduleResult};

/// Format shared by week keys and day keys.
pub const KEY_FORMAT: &str = "%Y-%m-%d";

pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// An ISO-8601 (year, week) pair. The year is the ISO week-based year, which
/// differs from the calendar year for a few days around New Year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IsoWeek {
    pub year: i32,
    pub week: u32,
}

impl IsoWeek {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }

    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// Monday of this week, `None` when the week does not exist in its year
    /// (week 53 of a 52-week year, week 0, ...).
    pub fn monday(&self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
    }

    pub fn label(&self) -> String {
        format!("Week {}", self.week)
    }
}

impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

pub fn format_key(date: NaiveDate) -> String {
    date.format(KEY_FORMAT).to_string()
}

/// Canonical week key: the Monday of the ISO week containing `date`.
pub fn week_key(date: NaiveDate) -> String {
    format_key(week_start(date))
}

pub fn parse_key(input: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(input.trim(), KEY_FORMAT)
}

/// Human readable label, e.g. `Week 10`.
pub fn week_label(date: NaiveDate) -> String {
    IsoWeek::of(date).label()
}

/// Number of ISO weeks (52 or 53) in an ISO year. December 28th always
/// falls in the last week of its year.
pub fn weeks_in_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 28)
        .map(|date| date.iso_week().week())
        .unwrap_or(52)
}

/// Arithmetic used to enumerate the weeks of a range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekMath {
    /// Walk Monday to Monday between the ISO weeks of both ends.
    #[default]
    Iso,
    /// Treat week numbers as a counter wrapping every 52 weeks and offset
    /// from the raw `from` date. Drifts on 53-week years and yields
    /// non-Monday keys when `from` is not a Monday; kept for data written
    /// by older deployments.
    Legacy52,
}

impl WeekMath {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekMath::Iso => "iso",
            WeekMath::Legacy52 => "legacy52",
        }
    }
}

impl FromStr for WeekMath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iso" => Ok(WeekMath::Iso),
            "legacy52" | "legacy_52" | "legacy" => Ok(WeekMath::Legacy52),
            other => Err(format!("unknown week math '{other}'")),
        }
    }
}

/// Inclusive range of weeks spanned by `[from, to]`.
///
/// The range is a cheap `Copy` value; every call to [`WeekRange::iter`]
/// starts the enumeration over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRange {
    from: NaiveDate,
    to: NaiveDate,
    math: WeekMath,
}

impl WeekRange {
    pub fn new(from: NaiveDate, to: NaiveDate, math: WeekMath) -> ScheduleResult<Self> {
        if from > to {
            return Err(ScheduleError::InvalidRange {
                from,
                to,
                reason: "start date is after end date",
            });
        }
        let range = Self { from, to, math };
        if range.iter().next().is_none() {
            return Err(ScheduleError::InvalidRange {
                from,
                to,
                reason: "range spans no weeks",
            });
        }
        Ok(range)
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn math(&self) -> WeekMath {
        self.math
    }

    /// Date the first emitted week is anchored on.
    pub fn first_week(&self) -> NaiveDate {
        match self.math {
            WeekMath::Iso => week_start(self.from),
            WeekMath::Legacy52 => self.from,
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn iter(&self) -> Weeks {
        let (next, end) = match self.math {
            WeekMath::Iso => {
                let span = (week_start(self.to) - week_start(self.from)).num_days();
                (0, span / 7)
            }
            WeekMath::Legacy52 => {
                let start = IsoWeek::of(self.from);
                let end = IsoWeek::of(self.to);
                let year_diff = i64::from(end.year - start.year);
                (
                    i64::from(start.week),
                    i64::from(end.week) + year_diff * 52,
                )
            }
        };
        Weeks {
            range: *self,
            next,
            end,
        }
    }

    fn week_at(&self, counter: i64) -> Option<NaiveDate> {
        match self.math {
            WeekMath::Iso => week_start(self.from).checked_add_signed(Duration::weeks(counter)),
            WeekMath::Legacy52 => {
                let start = IsoWeek::of(self.from);
                let start_week = i64::from(start.week);
                if start.year == IsoWeek::of(self.to).year {
                    self.from
                        .checked_add_signed(Duration::days(7 * (counter - start_week)))
                } else {
                    let years = i32::try_from(counter / 52).ok()?;
                    add_years_and_days(self.from, years, 7 * (counter % 52 - start_week))
                }
            }
        }
    }
}

impl<'a> IntoIterator for &'a WeekRange {
    type Item = NaiveDate;
    type IntoIter = Weeks;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the anchor date of every week in a [`WeekRange`].
#[derive(Debug, Clone)]
pub struct Weeks {
    range: WeekRange,
    next: i64,
    end: i64,
}

impl Iterator for Weeks {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.end {
            return None;
        }
        let counter = self.next;
        self.next += 1;
        let week = self.range.week_at(counter);
        if week.is_none() {
            self.next = self.end + 1;
        }
        week
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.end - self.next + 1).unwrap_or(0);
        (0, Some(remaining))
    }
}

/// Adds whole months then days, normalising an out-of-range day of month by
/// rolling into the next month (Feb 29 + 12 months = Mar 1).
pub(crate) fn add_months_and_days(date: NaiveDate, months: i64, days: i64) -> Option<NaiveDate> {
    let index = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_signed(Duration::days(i64::from(date.day()) - 1 + days))
}

fn add_years_and_days(date: NaiveDate, years: i32, days: i64) -> Option<NaiveDate> {
    add_months_and_days(date, i64::from(years) * 12, days)
}
