use chrono::Weekday;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Index, IndexMut};

use crate::calendar::ALL_WEEKDAYS;

/// Seven values, one per weekday, indexed by [`Weekday`].
///
/// Serializes as an object with `monday` .. `sunday` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByWeekday<T> {
    days: [T; 7],
}

impl<T> ByWeekday<T> {
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Weekday) -> T,
    {
        Self {
            days: ALL_WEEKDAYS.map(&mut f),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &T)> {
        ALL_WEEKDAYS.into_iter().zip(self.days.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Weekday, &mut T)> {
        ALL_WEEKDAYS.into_iter().zip(self.days.iter_mut())
    }

    pub fn map<U, F>(&self, mut f: F) -> ByWeekday<U>
    where
        F: FnMut(Weekday, &T) -> U,
    {
        ByWeekday::from_fn(|day| f(day, &self[day]))
    }
}

impl<T> Index<Weekday> for ByWeekday<T> {
    type Output = T;

    fn index(&self, day: Weekday) -> &T {
        &self.days[day.num_days_from_monday() as usize]
    }
}

impl<T> IndexMut<Weekday> for ByWeekday<T> {
    fn index_mut(&mut self, day: Weekday) -> &mut T {
        &mut self.days[day.num_days_from_monday() as usize]
    }
}

pub fn field_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

impl<T: Serialize> Serialize for ByWeekday<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ByWeekday", 7)?;
        for (day, value) in self.iter() {
            state.serialize_field(field_name(day), value)?;
        }
        state.end()
    }
}

#[derive(Deserialize)]
struct WeekFields<T> {
    monday: T,
    tuesday: T,
    wednesday: T,
    thursday: T,
    friday: T,
    saturday: T,
    sunday: T,
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ByWeekday<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = WeekFields::<T>::deserialize(deserializer)?;
        Ok(Self {
            days: [
                fields.monday,
                fields.tuesday,
                fields.wednesday,
                fields.thursday,
                fields.friday,
                fields.saturday,
                fields.sunday,
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_follows_monday_first_order() {
        let week = ByWeekday::from_fn(|day| day.num_days_from_monday());
        assert_eq!(week[Weekday::Mon], 0);
        assert_eq!(week[Weekday::Sun], 6);
        let order: Vec<_> = week.iter().map(|(day, _)| day).collect();
        assert_eq!(order, ALL_WEEKDAYS.to_vec());
    }

    #[test]
    fn serializes_with_named_weekday_fields() {
        let week = ByWeekday::from_fn(|day| field_name(day).len());
        let json = serde_json::to_value(&week).unwrap();
        assert_eq!(json["wednesday"], 9);
        let back: ByWeekday<usize> = serde_json::from_value(json).unwrap();
        assert_eq!(back, week);
    }
}
