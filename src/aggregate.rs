use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

use crate::availability::{EmployeesWeekAvailability, WeekAvailability};
use crate::calendar::{WeekMath, format_key, week_key};
use crate::cancel::CancelToken;
use crate::config::FanOut;
use crate::error::{ScheduleError, ScheduleResult};
use crate::store::ScheduleStore;

/// Key under which `week` is looked up in stored availability.
pub fn availability_key(week: NaiveDate, math: WeekMath) -> String {
    match math {
        WeekMath::Iso => week_key(week),
        WeekMath::Legacy52 => format_key(week),
    }
}

/// Collect every employee's availability for one week.
///
/// All or nothing: the error returned is the one of the first failing
/// employee in `employees` order. Once an employee fails, lookups after it
/// are skipped, while lookups before it still run so an earlier failure can
/// take its place. Parallel and sequential fan-out report the same employee.
pub fn aggregate_for_week<S>(
    store: &S,
    employees: &[String],
    week_key: &str,
    fan_out: FanOut,
    cancel: &CancelToken,
) -> ScheduleResult<EmployeesWeekAvailability>
where
    S: ScheduleStore + ?Sized,
{
    cancel.check()?;
    let first_failed = AtomicUsize::new(usize::MAX);
    let lookup = |(index, employee): (usize, &String)| -> Option<ScheduleResult<WeekAvailability>> {
        if index > first_failed.load(Ordering::Acquire) {
            return None;
        }
        let result = fetch_week(store, employee, week_key, cancel);
        if result.is_err() {
            first_failed.fetch_min(index, Ordering::AcqRel);
        }
        Some(result)
    };

    let results: Vec<_> = match fan_out {
        FanOut::Parallel => employees.par_iter().enumerate().map(lookup).collect(),
        FanOut::Sequential => employees.iter().enumerate().map(lookup).collect(),
    };

    let mut collected = BTreeMap::new();
    for (employee, result) in employees.iter().zip(results) {
        match result {
            Some(Ok(week)) => {
                collected.insert(employee.clone(), week);
            }
            Some(Err(err)) => {
                warn!(employee = %employee, week = week_key, error = %err, "availability aggregation failed");
                return Err(err);
            }
            // only lookups after a recorded failure are skipped
            None => {
                return Err(ScheduleError::InternalInconsistency(format!(
                    "lookup of employee {employee} skipped without an earlier failure"
                )));
            }
        }
    }

    debug!(week = week_key, employees = collected.len(), "aggregated availability");
    Ok(EmployeesWeekAvailability {
        week: week_key.to_string(),
        employees: collected,
    })
}

fn fetch_week<S>(
    store: &S,
    employee: &str,
    week_key: &str,
    cancel: &CancelToken,
) -> ScheduleResult<WeekAvailability>
where
    S: ScheduleStore + ?Sized,
{
    cancel.check()?;
    let availability = store.get_employee_availability(employee).map_err(|err| {
        if err.is_not_found() {
            ScheduleError::not_found(format!("availability of employee {employee}"))
        } else {
            ScheduleError::store(format!("loading availability of employee {employee}"), err)
        }
    })?;
    availability
        .weeks
        .get(week_key)
        .cloned()
        .ok_or_else(|| {
            ScheduleError::not_found(format!("week {week_key} for employee {employee}"))
        })
}
