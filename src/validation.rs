use chrono::Weekday;
use std::fmt;

use crate::availability::EmployeeAvailability;
use crate::calendar::parse_key;
use crate::employee::Employee;
use crate::schedule::WeekSchedule;
use crate::template::{WeekTemplate, format_time};
use crate::week::field_name;

#[derive(Debug, Clone)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

fn check_slot(
    day: Weekday,
    idx: usize,
    from: chrono::NaiveTime,
    to: chrono::NaiveTime,
) -> Result<(), ValidationError> {
    if from >= to {
        return Err(ValidationError::new(format!(
            "{} shift #{} must start before it ends (got {}-{})",
            field_name(day),
            idx,
            format_time(from),
            format_time(to)
        )));
    }
    Ok(())
}

pub fn validate_template(template: &WeekTemplate) -> Result<(), ValidationError> {
    for (day, day_template) in template.iter() {
        for (idx, shift) in day_template.shifts.iter().enumerate() {
            check_slot(day, idx, shift.from, shift.to)?;
        }
    }
    Ok(())
}

pub fn validate_week_schedule(schedule: &WeekSchedule) -> Result<(), ValidationError> {
    for (day, day_schedule) in schedule.iter() {
        for (idx, shift) in day_schedule.shifts.iter().enumerate() {
            check_slot(day, idx, shift.from, shift.to)?;
            if shift.employees.iter().any(|email| email.trim().is_empty()) {
                return Err(ValidationError::new(format!(
                    "{} shift #{} has an empty employee id",
                    field_name(day),
                    idx
                )));
            }
        }
    }
    Ok(())
}

pub fn validate_employee(employee: &Employee) -> Result<(), ValidationError> {
    let email = employee.email.trim();
    if email.is_empty() || !email.contains('@') || email != employee.email {
        return Err(ValidationError::new(format!(
            "'{}' is not a valid email address",
            employee.email
        )));
    }
    if employee.name.trim().is_empty() {
        return Err(ValidationError::new(format!(
            "employee {} requires a name",
            employee.email
        )));
    }
    if let Some(contact) = &employee.emergency_contact {
        if contact.is_empty() || !contact.chars().all(|c| c.is_ascii_digit() || c == '+') {
            return Err(ValidationError::new(format!(
                "employee {} has a non-numeric emergency contact '{}'",
                employee.email, contact
            )));
        }
    }
    Ok(())
}

/// Stored availability must be keyed by week and carry consistent windows.
pub fn validate_availability(availability: &EmployeeAvailability) -> Result<(), ValidationError> {
    for (key, week) in &availability.weeks {
        parse_key(key)
            .map_err(|err| ValidationError::new(format!("invalid week key '{key}': {err}")))?;
        for (day, entry) in week.days.iter() {
            if !entry.is_consistent() {
                return Err(ValidationError::new(format!(
                    "week {key} {}: a time window is required exactly for partial availability",
                    field_name(day)
                )));
            }
        }
    }
    Ok(())
}

