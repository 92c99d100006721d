use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::week::ByWeekday;

/// A block of required staffing within one day. `from < to`; overnight shifts
/// are not representable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    #[serde(with = "time_of_day")]
    pub from: NaiveTime,
    #[serde(with = "time_of_day")]
    pub to: NaiveTime,
    pub required_employees: u32,
}

impl Shift {
    pub fn new(from: NaiveTime, to: NaiveTime, required_employees: u32) -> Self {
        Self {
            from,
            to,
            required_employees,
        }
    }
}

/// Shifts of one weekday, in caller order. Overlap is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTemplate {
    #[serde(default)]
    pub shifts: Vec<Shift>,
}

impl DayTemplate {
    pub fn new(shifts: Vec<Shift>) -> Self {
        Self { shifts }
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    pub fn required_employees(&self) -> u32 {
        self.shifts.iter().map(|shift| shift.required_employees).sum()
    }
}

/// The business-wide default week. Replaced as a whole, never patched.
pub type WeekTemplate = ByWeekday<DayTemplate>;

pub fn parse_time(input: &str) -> Result<NaiveTime, chrono::ParseError> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
}

pub fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

/// `HH:MM` (or `HH:MM:SS`) serde representation for times of day.
pub(crate) mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(|err| {
            serde::de::Error::custom(format!("invalid time of day '{raw}': {err}"))
        })
    }
}
