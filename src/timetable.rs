use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::calendar::{WeekRange, format_key, week_label};
use crate::cancel::CancelToken;
use crate::error::{ScheduleError, ScheduleResult};
use crate::template::{DayTemplate, WeekTemplate};

/// One week of a [`RangeTimetable`]: the template plus its `Week N` label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedWeekTemplate {
    pub week_str: String,
    #[serde(flatten)]
    pub template: WeekTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeTimetable {
    pub first_week_date: String,
    pub weeks: BTreeMap<String, DetailedWeekTemplate>,
}

impl RangeTimetable {
    pub fn week(&self, key: &str) -> Option<&DetailedWeekTemplate> {
        self.weeks.get(key)
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

/// Required staffing per calendar day, keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaysTimetable {
    pub days: BTreeMap<String, DayTemplate>,
}

impl DaysTimetable {
    pub fn day(&self, key: &str) -> Option<&DayTemplate> {
        self.days.get(key)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Lay `template` over every week of `range`.
///
/// Every week carries the same template; per-week overrides live in stored
/// schedules and are reconciled separately.
pub fn expand_range(
    template: &WeekTemplate,
    range: &WeekRange,
    cancel: &CancelToken,
) -> ScheduleResult<RangeTimetable> {
    let mut weeks = BTreeMap::new();
    for week in range {
        cancel.check()?;
        weeks.insert(
            format_key(week),
            DetailedWeekTemplate {
                week_str: week_label(week),
                template: template.clone(),
            },
        );
    }
    debug!(
        from = %range.from(),
        to = %range.to(),
        weeks = weeks.len(),
        "expanded week range"
    );
    Ok(RangeTimetable {
        first_week_date: format_key(range.first_week()),
        weeks,
    })
}

/// Day-by-day staffing for `[from, to)`.
pub fn expand_to_days(
    template: &WeekTemplate,
    from: NaiveDate,
    to: NaiveDate,
    cancel: &CancelToken,
) -> ScheduleResult<DaysTimetable> {
    if from >= to {
        return Err(ScheduleError::InvalidRange {
            from,
            to,
            reason: "day range is empty",
        });
    }
    let mut days = BTreeMap::new();
    for day in from.iter_days().take_while(|day| *day < to) {
        cancel.check()?;
        days.insert(format_key(day), template[day.weekday()].clone());
    }
    debug!(%from, %to, days = days.len(), "expanded day range");
    Ok(DaysTimetable { days })
}
