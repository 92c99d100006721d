use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use shift_planner::{
    AvailabilityConfig, AvailabilityStatus, CancelToken, Collection, DayTemplate, Employee,
    EngineConfig, ErrorOutcome, FanOut, MemoryScheduleStore, ScheduleError, ScheduleStore,
    SchedulingService, Shift, ShiftSchedule, StoreResult, WeekMath, WeekSchedule, WeekTemplate,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn config() -> EngineConfig {
    EngineConfig {
        availability: AvailabilityConfig {
            seed: Some(17),
            ..AvailabilityConfig::default()
        },
        ..EngineConfig::default()
    }
}

fn service() -> SchedulingService<MemoryScheduleStore> {
    SchedulingService::new(MemoryScheduleStore::new(), config())
}

fn template() -> WeekTemplate {
    let mut template = WeekTemplate::default();
    template[Weekday::Mon] = DayTemplate::new(vec![Shift::new(t(9, 0), t(17, 0), 2)]);
    template
}

fn configured() -> SchedulingService<MemoryScheduleStore> {
    let service = service();
    service.set_default_template(&template()).unwrap();
    service
}

#[test]
fn timetable_requires_a_default_template() {
    let service = service();
    let err = service
        .get_timetable(d(2024, 3, 4), d(2024, 3, 10), &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, ScheduleError::NotConfigured));
    assert_eq!(err.outcome(), ErrorOutcome::NotFound);

    let err = service
        .get_days_timetable(d(2024, 3, 4), d(2024, 3, 10), &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, ScheduleError::NotConfigured));
}

#[test]
fn range_is_checked_before_the_store() {
    let err = service()
        .get_timetable(d(2024, 3, 10), d(2024, 3, 4), &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidRange { .. }));
}

#[test]
fn timetable_for_one_week() {
    let timetable = configured()
        .get_timetable(d(2024, 3, 4), d(2024, 3, 10), &CancelToken::new())
        .unwrap();
    assert_eq!(timetable.first_week_date, "2024-03-04");
    let week = timetable.week("2024-03-04").unwrap();
    assert_eq!(week.week_str, "Week 10");
    assert_eq!(week.template, template());
}

#[test]
fn days_timetable_for_two_days() {
    let days = configured()
        .get_days_timetable(d(2024, 3, 4), d(2024, 3, 6), &CancelToken::new())
        .unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days.day("2024-03-04").unwrap().required_employees(), 2);
    assert!(days.day("2024-03-05").unwrap().is_empty());
}

#[test]
fn invalid_template_is_rejected_and_not_stored() {
    let service = service();
    let mut bad = template();
    bad[Weekday::Tue] = DayTemplate::new(vec![Shift::new(t(18, 0), t(9, 0), 1)]);
    let err = service.set_default_template(&bad).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidTemplate(_)));
    assert_eq!(err.outcome(), ErrorOutcome::Rejected);
    assert!(matches!(
        service.default_template().unwrap_err(),
        ScheduleError::NotConfigured
    ));
}

#[test]
fn creating_an_employee_stores_generated_availability() {
    let service = service();
    let creation = Utc.with_ymd_and_hms(2024, 3, 6, 8, 0, 0).unwrap();
    let employee = Employee::new("ana@example.com", "Ana");
    let availability = service.create_employee(&employee, creation).unwrap();

    assert_eq!(availability.len(), 53);
    assert_eq!(service.get_employee("ana@example.com").unwrap(), employee);
    assert_eq!(service.employee_availability("ana@example.com").unwrap(), availability);
    assert_eq!(service.list_employees().unwrap(), vec![employee]);
}

#[test]
fn invalid_employee_is_rejected() {
    let err = service()
        .create_employee(&Employee::new("not-an-email", "Ana"), Utc::now())
        .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidEmployee(_)));
}

#[test]
fn deleting_an_employee_drops_availability() {
    let service = service();
    service
        .create_employee(&Employee::new("ana@example.com", "Ana"), Utc::now())
        .unwrap();
    service.delete_employee("ana@example.com").unwrap();
    assert!(matches!(
        service.get_employee("ana@example.com").unwrap_err(),
        ScheduleError::NotFound(_)
    ));
    assert!(matches!(
        service.employee_availability("ana@example.com").unwrap_err(),
        ScheduleError::NotFound(_)
    ));
}

#[test]
fn replacing_availability_of_unknown_employee_fails() {
    let service = service();
    let availability = service.generate_default_availability(Utc::now()).unwrap();
    let err = service
        .replace_employee_availability("ghost@example.com", &availability)
        .unwrap_err();
    assert_eq!(err.outcome(), ErrorOutcome::NotFound);
}

#[test]
fn replacing_availability_overwrites_it() {
    let service = service();
    let creation = Utc.with_ymd_and_hms(2024, 3, 6, 8, 0, 0).unwrap();
    let mut availability = service
        .create_employee(&Employee::new("ana@example.com", "Ana"), creation)
        .unwrap();
    let week = availability.weeks.get_mut("2024-03-04").unwrap();
    week.days[Weekday::Mon].status = AvailabilityStatus::Unavailable;
    service
        .replace_employee_availability("ana@example.com", &availability)
        .unwrap();
    let stored = service.employee_availability("ana@example.com").unwrap();
    assert_eq!(
        stored.weeks["2024-03-04"].days[Weekday::Mon].status,
        AvailabilityStatus::Unavailable
    );
}

#[test]
fn aggregated_availability_covers_all_employees() {
    for fan_out in [FanOut::Parallel, FanOut::Sequential] {
        let service = SchedulingService::new(
            MemoryScheduleStore::new(),
            EngineConfig {
                fan_out,
                ..config()
            },
        );
        let creation = Utc.with_ymd_and_hms(2024, 3, 6, 8, 0, 0).unwrap();
        for email in ["ana@example.com", "bo@example.com"] {
            service
                .create_employee(&Employee::new(email, "Someone"), creation)
                .unwrap();
        }
        // any day of the week resolves to its Monday
        let result = service
            .get_aggregated_availability_for_week(d(2024, 3, 9), &CancelToken::new())
            .unwrap();
        assert_eq!(result.week, "2024-03-04");
        assert_eq!(result.employees.len(), 2);
        assert_eq!(
            result.employees["bo@example.com"].days[Weekday::Mon].status,
            AvailabilityStatus::Available
        );
    }
}

#[test]
fn aggregation_outside_the_horizon_is_not_found() {
    let service = service();
    let creation = Utc.with_ymd_and_hms(2024, 3, 6, 8, 0, 0).unwrap();
    service
        .create_employee(&Employee::new("ana@example.com", "Ana"), creation)
        .unwrap();
    let err = service
        .get_aggregated_availability_for_week(d(2026, 1, 5), &CancelToken::new())
        .unwrap_err();
    assert_eq!(err.outcome(), ErrorOutcome::NotFound);
}

#[test]
fn expired_deadline_cancels_aggregation() {
    let service = service();
    let cancel = CancelToken::with_timeout(std::time::Duration::ZERO);
    let err = service
        .get_aggregated_availability_for_week(d(2024, 3, 4), &cancel)
        .unwrap_err();
    assert!(matches!(err, ScheduleError::Cancelled));
}

#[test]
fn week_schedule_round_trips_by_week() {
    let service = configured();
    let mut schedule = WeekSchedule::default();
    schedule[Weekday::Mon].shifts =
        vec![ShiftSchedule::new(t(9, 0), t(17, 0), ["ana@example.com"])];

    // stored under the Monday, readable from any day of the week
    service.set_week_schedule(d(2024, 3, 7), &schedule).unwrap();
    assert_eq!(service.get_week_schedule(d(2024, 3, 4)).unwrap(), schedule);
    assert!(matches!(
        service.get_week_schedule(d(2024, 3, 11)).unwrap_err(),
        ScheduleError::NotFound(_)
    ));

    let reconciled = service
        .reconciled_week(d(2024, 3, 10), &CancelToken::new())
        .unwrap();
    assert!(reconciled.has_schedule);
    assert_eq!(reconciled.total_shortfall(), 1);

    let unscheduled = service
        .reconciled_week(d(2024, 3, 11), &CancelToken::new())
        .unwrap();
    assert!(!unscheduled.has_schedule);
    assert_eq!(unscheduled.total_shortfall(), 2);
}

#[test]
fn invalid_schedule_is_rejected() {
    let mut schedule = WeekSchedule::default();
    schedule[Weekday::Mon].shifts = vec![ShiftSchedule::new(t(9, 0), t(17, 0), [" "])];
    let err = service()
        .set_week_schedule(d(2024, 3, 4), &schedule)
        .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidSchedule(_)));
}

#[test]
fn legacy_math_keys_availability_by_raw_date() {
    let service = SchedulingService::new(
        MemoryScheduleStore::new(),
        EngineConfig {
            week_math: WeekMath::Legacy52,
            ..config()
        },
    );
    let creation = Utc.with_ymd_and_hms(2024, 3, 6, 8, 0, 0).unwrap();
    service
        .create_employee(&Employee::new("ana@example.com", "Ana"), creation)
        .unwrap();
    let later = creation.date_naive() + Duration::days(14);
    let result = service
        .get_aggregated_availability_for_week(later, &CancelToken::new())
        .unwrap();
    assert_eq!(result.week, "2024-03-20");
}

/// Memory store that trips a token on every document read.
struct CancellingStore {
    inner: MemoryScheduleStore,
    cancel: CancelToken,
}

impl ScheduleStore for CancellingStore {
    fn get_document(&self, collection: Collection, key: &str) -> StoreResult<Option<String>> {
        self.cancel.cancel();
        self.inner.get_document(collection, key)
    }

    fn put_document(&self, collection: Collection, key: &str, json: String) -> StoreResult<()> {
        self.inner.put_document(collection, key, json)
    }

    fn remove_document(&self, collection: Collection, key: &str) -> StoreResult<bool> {
        self.inner.remove_document(collection, key)
    }

    fn document_keys(&self, collection: Collection) -> StoreResult<Vec<String>> {
        self.inner.document_keys(collection)
    }
}

#[test]
fn cancellation_while_loading_the_template_stops_expansion() {
    let inner = MemoryScheduleStore::new();
    inner.set_default_template(&template()).unwrap();
    let cancel = CancelToken::new();
    let service = SchedulingService::new(
        CancellingStore {
            inner,
            cancel: cancel.clone(),
        },
        config(),
    );

    // live when the call starts, cancelled by the template read
    let err = service
        .get_timetable(d(2024, 3, 4), d(2024, 6, 30), &cancel)
        .unwrap_err();
    assert!(matches!(err, ScheduleError::Cancelled));

    let cancel = CancelToken::new();
    let service = SchedulingService::new(
        CancellingStore {
            inner: MemoryScheduleStore::new(),
            cancel: cancel.clone(),
        },
        config(),
    );
    service.store().inner.set_default_template(&template()).unwrap();
    let err = service
        .get_days_timetable(d(2024, 3, 4), d(2024, 3, 20), &cancel)
        .unwrap_err();
    assert!(matches!(err, ScheduleError::Cancelled));
}
