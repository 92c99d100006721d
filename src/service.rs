use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::aggregate::{aggregate_for_week, availability_key};
use crate::availability::{AvailabilityGenerator, EmployeeAvailability, EmployeesWeekAvailability};
use crate::calendar::{WeekRange, week_key};
use crate::cancel::CancelToken;
use crate::config::EngineConfig;
use crate::employee::Employee;
use crate::error::{ScheduleError, ScheduleResult};
use crate::schedule::{ReconciledWeek, WeekSchedule, reconcile_week};
use crate::store::{ScheduleStore, StoreError};
use crate::template::WeekTemplate;
use crate::timetable::{DaysTimetable, RangeTimetable, expand_range, expand_to_days};
use crate::validation;

/// Entry point used by transports: fetches from the store, runs the engine
/// and translates store misses into engine errors.
pub struct SchedulingService<S> {
    store: S,
    config: EngineConfig,
    generator: Mutex<AvailabilityGenerator>,
}

impl<S: ScheduleStore> SchedulingService<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        let generator = AvailabilityGenerator::from_config(config.week_math, &config.availability);
        Self {
            store,
            config,
            generator: Mutex::new(generator),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn default_template(&self) -> ScheduleResult<WeekTemplate> {
        self.store.get_default_template().map_err(|err| {
            if err.is_not_found() {
                ScheduleError::NotConfigured
            } else {
                ScheduleError::store("loading default template", err)
            }
        })
    }

    pub fn set_default_template(&self, template: &WeekTemplate) -> ScheduleResult<()> {
        validation::validate_template(template)
            .map_err(|err| ScheduleError::InvalidTemplate(err.to_string()))?;
        self.store
            .set_default_template(template)
            .map_err(|err| ScheduleError::store("saving default template", err))?;
        info!("default template replaced");
        Ok(())
    }

    /// Default template expanded over every week touched by `[from, to]`.
    pub fn get_timetable(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        cancel: &CancelToken,
    ) -> ScheduleResult<RangeTimetable> {
        let range = WeekRange::new(from, to, self.config.week_math)?;
        cancel.check()?;
        let template = self.default_template()?;
        expand_range(&template, &range, cancel)
    }

    /// Default template expanded per day over `[from, to)`.
    pub fn get_days_timetable(
        &self,
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
        cancel.check()?;
        let template = self.default_template()?;
        expand_to_days(&template, from, to, cancel)
    }

    pub fn generate_default_availability(
        &self,
        creation: DateTime<Utc>,
    ) -> ScheduleResult<EmployeeAvailability> {
        self.generator.lock().generate_default(creation)
    }

    /// Store `employee` together with freshly generated availability.
    pub fn create_employee(
        &self,
        employee: &Employee,
        creation: DateTime<Utc>,
    ) -> ScheduleResult<EmployeeAvailability> {
        validation::validate_employee(employee)
            .map_err(|err| ScheduleError::InvalidEmployee(err.to_string()))?;
        let availability = self.generate_default_availability(creation)?;
        self.store
            .put_employee(employee)
            .map_err(|err| ScheduleError::store(format!("saving employee {}", employee.email), err))?;
        self.store
            .set_employee_availability(&employee.email, &availability)
            .map_err(|err| {
                ScheduleError::store(
                    format!("saving availability of employee {}", employee.email),
                    err,
                )
            })?;
        info!(employee = %employee.email, weeks = availability.len(), "employee created");
        Ok(availability)
    }

    pub fn get_employee(&self, email: &str) -> ScheduleResult<Employee> {
        self.store
            .get_employee(email)
            .map_err(|err| missing_or_store(err, format!("employee {email}")))
    }

    pub fn list_employees(&self) -> ScheduleResult<Vec<Employee>> {
        self.store
            .list_employees()
            .map_err(|err| ScheduleError::store("listing employees", err))
    }

    pub fn delete_employee(&self, email: &str) -> ScheduleResult<()> {
        self.store
            .delete_employee(email)
            .map_err(|err| ScheduleError::store(format!("deleting employee {email}"), err))
    }

    pub fn employee_availability(&self, email: &str) -> ScheduleResult<EmployeeAvailability> {
        self.store
            .get_employee_availability(email)
            .map_err(|err| missing_or_store(err, format!("availability of employee {email}")))
    }

    /// Replace an employee's stored availability wholesale.
    pub fn replace_employee_availability(
        &self,
        email: &str,
        availability: &EmployeeAvailability,
    ) -> ScheduleResult<()> {
        self.get_employee(email)?;
        validation::validate_availability(availability)
            .map_err(|err| ScheduleError::InvalidEmployee(err.to_string()))?;
        self.store
            .set_employee_availability(email, availability)
            .map_err(|err| {
                ScheduleError::store(format!("saving availability of employee {email}"), err)
            })
    }

    /// Availability of every known employee for the week containing `week`.
    pub fn get_aggregated_availability_for_week(
        &self,
        week: NaiveDate,
        cancel: &CancelToken,
    ) -> ScheduleResult<EmployeesWeekAvailability> {
        cancel.check()?;
        let employees = self
            .store
            .list_employee_ids()
            .map_err(|err| ScheduleError::store("listing employees", err))?;
        let key = availability_key(week, self.config.week_math);
        debug!(week = %key, employees = employees.len(), "aggregating availability");
        aggregate_for_week(&self.store, &employees, &key, self.config.fan_out, cancel)
    }

    pub fn set_week_schedule(&self, week: NaiveDate, schedule: &WeekSchedule) -> ScheduleResult<()> {
        validation::validate_week_schedule(schedule)
            .map_err(|err| ScheduleError::InvalidSchedule(err.to_string()))?;
        let key = week_key(week);
        self.store
            .set_week_schedule(&key, schedule)
            .map_err(|err| ScheduleError::store(format!("saving schedule for week {key}"), err))?;
        info!(week = %key, "week schedule replaced");
        Ok(())
    }

    pub fn get_week_schedule(&self, week: NaiveDate) -> ScheduleResult<WeekSchedule> {
        let key = week_key(week);
        self.store
            .get_week_schedule(&key)
            .map_err(|err| missing_or_store(err, format!("schedule for week {key}")))
    }

    /// Default template overlaid with the week's stored schedule, if any.
    pub fn reconciled_week(
        &self,
        week: NaiveDate,
        cancel: &CancelToken,
    ) -> ScheduleResult<ReconciledWeek> {
        cancel.check()?;
        let template = self.default_template()?;
        cancel.check()?;
        let schedule = match self.get_week_schedule(week) {
            Ok(schedule) => Some(schedule),
            Err(ScheduleError::NotFound(_)) => None,
            Err(err) => return Err(err),
        };
        Ok(reconcile_week(week, &template, schedule.as_ref()))
    }
}

fn missing_or_store(err: StoreError, what: String) -> ScheduleError {
    if err.is_not_found() {
        ScheduleError::NotFound(what)
    } else {
        ScheduleError::store(format!("loading {what}"), err)
    }
}
