use chrono::{DateTime, Duration, NaiveDate, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::calendar::{WeekMath, WeekRange, add_months_and_days, format_key, week_label};
use crate::config::AvailabilityConfig;
use crate::error::{ScheduleError, ScheduleResult};
use crate::week::ByWeekday;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    Unavailable,
    Partial,
}

impl AvailabilityStatus {
    pub const ALL: [AvailabilityStatus; 3] = [
        AvailabilityStatus::Available,
        AvailabilityStatus::Unavailable,
        AvailabilityStatus::Partial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "available",
            AvailabilityStatus::Unavailable => "unavailable",
            AvailabilityStatus::Partial => "partial",
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AvailabilityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AvailabilityStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown availability '{s}'"))
    }
}

/// Availability of one employee on one day. The time window is present
/// exactly when the status is `partial`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    #[serde(rename = "availability")]
    pub status: AvailabilityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

impl DayAvailability {
    pub fn available(date: NaiveDate) -> Self {
        Self::without_window(date, AvailabilityStatus::Available)
    }

    pub fn unavailable(date: NaiveDate) -> Self {
        Self::without_window(date, AvailabilityStatus::Unavailable)
    }

    pub fn partial(date: NaiveDate, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            date,
            status: AvailabilityStatus::Partial,
            from: Some(from),
            to: Some(to),
        }
    }

    fn without_window(date: NaiveDate, status: AvailabilityStatus) -> Self {
        Self {
            date,
            status,
            from: None,
            to: None,
        }
    }

    pub fn window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.from.zip(self.to)
    }

    pub fn is_consistent(&self) -> bool {
        match self.status {
            AvailabilityStatus::Partial => self.window().is_some_and(|(from, to)| from < to),
            _ => self.from.is_none() && self.to.is_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekAvailability {
    pub week_str: String,
    #[serde(flatten)]
    pub days: ByWeekday<DayAvailability>,
}

/// Availability of one employee, keyed by week key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeAvailability {
    pub weeks: BTreeMap<String, WeekAvailability>,
}

impl EmployeeAvailability {
    pub fn week(&self, key: &str) -> Option<&WeekAvailability> {
        self.weeks.get(key)
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

/// One week of availability for a set of employees, keyed by employee id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeesWeekAvailability {
    pub week: String,
    pub employees: BTreeMap<String, WeekAvailability>,
}

/// Builds the placeholder availability handed to a new employee.
///
/// Mondays are available, Sundays partial and the days between are drawn
/// uniformly from the three statuses. Partial days all share the same window
/// starting at the creation time. Production callers seed from entropy, so
/// two employees created together still differ; tests pass a fixed seed.
pub struct AvailabilityGenerator<R = StdRng> {
    rng: R,
    math: WeekMath,
    horizon_months: u32,
    partial_window: Duration,
}

impl AvailabilityGenerator<StdRng> {
    pub fn from_entropy(math: WeekMath, config: &AvailabilityConfig) -> Self {
        Self::with_rng(StdRng::from_entropy(), math, config)
    }

    pub fn seeded(seed: u64, math: WeekMath, config: &AvailabilityConfig) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), math, config)
    }

    /// Seeded from `config.seed` when present, otherwise from entropy.
    pub fn from_config(math: WeekMath, config: &AvailabilityConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed, math, config),
            None => Self::from_entropy(math, config),
        }
    }
}

impl<R: Rng> AvailabilityGenerator<R> {
    pub fn with_rng(rng: R, math: WeekMath, config: &AvailabilityConfig) -> Self {
        Self {
            rng,
            math,
            horizon_months: config.horizon_months,
            partial_window: Duration::hours(i64::from(config.partial_window_hours)),
        }
    }

    pub fn generate_default(
        &mut self,
        creation: DateTime<Utc>,
    ) -> ScheduleResult<EmployeeAvailability> {
        let from = creation.date_naive();
        let to = add_months_and_days(from, i64::from(self.horizon_months), 0).ok_or_else(|| {
            ScheduleError::InternalInconsistency(format!(
                "availability horizon from {from} leaves the supported calendar"
            ))
        })?;
        let range = WeekRange::new(from, to, self.math)?;
        let window = (creation, creation + self.partial_window);

        let mut weeks = BTreeMap::new();
        for week in &range {
            let days = ByWeekday::from_fn(|day| {
                let date = week + Duration::days(i64::from(day.num_days_from_monday()));
                let status = match day {
                    Weekday::Mon => AvailabilityStatus::Available,
                    Weekday::Sun => AvailabilityStatus::Partial,
                    _ => self.random_status(),
                };
                match status {
                    AvailabilityStatus::Available => DayAvailability::available(date),
                    AvailabilityStatus::Unavailable => DayAvailability::unavailable(date),
                    AvailabilityStatus::Partial => DayAvailability::partial(date, window.0, window.1),
                }
            });
            weeks.insert(
                format_key(week),
                WeekAvailability {
                    week_str: week_label(week),
                    days,
                },
            );
        }

        Ok(EmployeeAvailability { weeks })
    }

    fn random_status(&mut self) -> AvailabilityStatus {
        AvailabilityStatus::ALL[self.rng.gen_range(0..AvailabilityStatus::ALL.len())]
    }
}
