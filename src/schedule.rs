use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::calendar::{format_key, week_label, week_start};
use crate::template::{WeekTemplate, time_of_day};
use crate::week::ByWeekday;

/// A concrete shift with the employees (emails) assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSchedule {
    #[serde(with = "time_of_day")]
    pub from: NaiveTime,
    #[serde(with = "time_of_day")]
    pub to: NaiveTime,
    #[serde(default)]
    pub employees: BTreeSet<String>,
}

impl ShiftSchedule {
    pub fn new<I, E>(from: NaiveTime, to: NaiveTime, employees: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        Self {
            from,
            to,
            employees: employees.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(default)]
    pub shifts: Vec<ShiftSchedule>,
}

/// Staffing assignment of one week, stored under its week key.
pub type WeekSchedule = ByWeekday<DaySchedule>;

/// Empty assignment with the template's shift slots.
pub fn schedule_from_template(template: &WeekTemplate) -> WeekSchedule {
    template.map(|_, day| DaySchedule {
        shifts: day
            .shifts
            .iter()
            .map(|shift| ShiftSchedule {
                from: shift.from,
                to: shift.to,
                employees: BTreeSet::new(),
            })
            .collect(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageOrigin {
    Template,
    Scheduled,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftCoverage {
    #[serde(with = "time_of_day")]
    pub from: NaiveTime,
    #[serde(with = "time_of_day")]
    pub to: NaiveTime,
    pub required_employees: u32,
    pub employees: BTreeSet<String>,
    pub origin: CoverageOrigin,
}

impl ShiftCoverage {
    pub fn assigned(&self) -> u32 {
        u32::try_from(self.employees.len()).unwrap_or(u32::MAX)
    }

    pub fn shortfall(&self) -> u32 {
        self.required_employees.saturating_sub(self.assigned())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCoverage {
    pub shifts: Vec<ShiftCoverage>,
}

/// Default template laid over one week's concrete assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledWeek {
    pub week: String,
    pub week_str: String,
    pub has_schedule: bool,
    #[serde(flatten)]
    pub days: ByWeekday<DayCoverage>,
}

impl ReconciledWeek {
    /// Slots with fewer assigned employees than the template requires.
    pub fn understaffed(&self) -> Vec<(Weekday, &ShiftCoverage)> {
        self.days
            .iter()
            .flat_map(|(day, coverage)| coverage.shifts.iter().map(move |shift| (day, shift)))
            .filter(|(_, shift)| shift.shortfall() > 0)
            .collect()
    }

    pub fn total_shortfall(&self) -> u32 {
        self.understaffed()
            .iter()
            .map(|(_, shift)| shift.shortfall())
            .sum()
    }
}

/// Match template shifts with scheduled shifts on their `(from, to)` slot.
///
/// Template order is kept; scheduled shifts with no template slot follow,
/// with a requirement of zero. Each scheduled shift consumes at most one
/// template slot so duplicated slots pair up in order.
pub fn reconcile_days(
    template: &WeekTemplate,
    schedule: Option<&WeekSchedule>,
) -> ByWeekday<DayCoverage> {
    ByWeekday::from_fn(|day| {
        let mut shifts: Vec<ShiftCoverage> = template[day]
            .shifts
            .iter()
            .map(|shift| ShiftCoverage {
                from: shift.from,
                to: shift.to,
                required_employees: shift.required_employees,
                employees: BTreeSet::new(),
                origin: CoverageOrigin::Template,
            })
            .collect();

        if let Some(schedule) = schedule {
            for scheduled in &schedule[day].shifts {
                let slot = shifts.iter_mut().find(|slot| {
                    slot.origin == CoverageOrigin::Template
                        && slot.from == scheduled.from
                        && slot.to == scheduled.to
                });
                match slot {
                    Some(slot) => {
                        slot.employees = scheduled.employees.clone();
                        slot.origin = CoverageOrigin::Both;
                    }
                    None => shifts.push(ShiftCoverage {
                        from: scheduled.from,
                        to: scheduled.to,
                        required_employees: 0,
                        employees: scheduled.employees.clone(),
                        origin: CoverageOrigin::Scheduled,
                    }),
                }
            }
        }

        DayCoverage { shifts }
    })
}

pub fn reconcile_week(
    week: NaiveDate,
    template: &WeekTemplate,
    schedule: Option<&WeekSchedule>,
) -> ReconciledWeek {
    let monday = week_start(week);
    ReconciledWeek {
        week: format_key(monday),
        week_str: week_label(monday),
        has_schedule: schedule.is_some(),
        days: reconcile_days(template, schedule),
    }
}
