pub mod aggregate;
pub mod availability;
pub mod calendar;
pub mod cancel;
pub mod config;
pub mod employee;
pub mod error;
pub mod export;
pub mod schedule;
pub mod service;
pub mod store;
pub mod template;
pub mod timetable;
pub(crate) mod validation;
pub mod week;

pub use aggregate::aggregate_for_week;
pub use availability::{
    AvailabilityGenerator, AvailabilityStatus, DayAvailability, EmployeeAvailability,
    EmployeesWeekAvailability, WeekAvailability,
};
pub use calendar::{IsoWeek, WeekMath, WeekRange, format_key, parse_key, week_key, week_label};
pub use cancel::CancelToken;
pub use config::{AvailabilityConfig, ConfigError, EngineConfig, FanOut};
pub use employee::Employee;
pub use error::{ErrorOutcome, ScheduleError, ScheduleResult};
pub use schedule::{
    CoverageOrigin, DaySchedule, ReconciledWeek, ShiftCoverage, ShiftSchedule, WeekSchedule,
    reconcile_week, schedule_from_template,
};
pub use service::SchedulingService;
pub use store::{Collection, MemoryScheduleStore, ScheduleStore, StoreError, StoreResult};
#[cfg(feature = "sqlite")]
pub use store::SqliteScheduleStore;
pub use template::{DayTemplate, Shift, WeekTemplate};
pub use timetable::{DaysTimetable, DetailedWeekTemplate, RangeTimetable, expand_range, expand_to_days};
pub use week::ByWeekday;
