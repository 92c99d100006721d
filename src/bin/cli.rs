use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shift_planner::export::{write_days_csv, write_range_csv};
use shift_planner::{
    CancelToken, Employee, EngineConfig, ErrorOutcome, MemoryScheduleStore, ScheduleError,
    ScheduleStore, SchedulingService, WeekSchedule, WeekTemplate, parse_key,
};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn print_help() {
    println!(
        "Commands:\n  help                                  Show this help\n  template load <json_path>             Replace the default timetable from a JSON file\n  template show                         Show the default timetable\n  timetable <from> <to> [csv]           Weekly timetable for a date range (YYYY-MM-DD)\n  days <from> <to> [csv]                Daily staffing for [from, to)\n  employee add <email> <name...>        Create an employee with default availability\n  employee list                         List employees\n  employee remove <email>               Remove an employee and their availability\n  availability <email> <week>           Show an employee's availability for a week\n  week-availability <week>              Availability of all employees for a week\n  schedule set <week> <json_path>       Replace the schedule of a week from a JSON file\n  schedule show <week>                  Show the stored schedule of a week\n  schedule reconcile <week>             Compare a week's schedule with the default timetable\n  quit|exit                             Exit"
    );
}

fn parse_date(input: Option<&str>) -> Result<NaiveDate, String> {
    let input = input.ok_or_else(|| "missing date (YYYY-MM-DD)".to_string())?;
    parse_key(input).map_err(|_| format!("Invalid date '{input}' (YYYY-MM-DD)"))
}

fn read_json<T: DeserializeOwned>(path: Option<&str>) -> Result<T, String> {
    let path = path.ok_or_else(|| "missing json path".to_string())?;
    let file = File::open(Path::new(path)).map_err(|e| format!("Cannot open {path}: {e}"))?;
    serde_json::from_reader(file).map_err(|e| format!("Invalid JSON in {path}: {e}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn describe(err: ScheduleError) -> String {
    match (&err, err.outcome()) {
        (ScheduleError::NotConfigured, _) => "Default timetable not yet set.".to_string(),
        (_, ErrorOutcome::NotFound) => format!("Not found: {err}"),
        (_, ErrorOutcome::Rejected) => format!("Rejected: {err}"),
        (_, ErrorOutcome::Failure) => {
            tracing::error!(error = %err, "command failed");
            format!("Error: {err}")
        }
    }
}

/// Runs one command line. Returns `Ok(false)` when the session should end.
fn execute<S: ScheduleStore>(service: &SchedulingService<S>, input: &str) -> Result<bool, String> {
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let cancel = CancelToken::new();

    match cmd {
        "help" => print_help(),
        "quit" | "exit" => return Ok(false),
        "template" => match parts.next() {
            Some("load") => {
                let template: WeekTemplate = read_json(parts.next())?;
                service.set_default_template(&template).map_err(describe)?;
                println!("Default timetable updated.");
            }
            Some("show") => {
                let template = service.default_template().map_err(describe)?;
                print_json(&template)?;
            }
            _ => println!("Usage: template <load <json_path>|show>"),
        },
        "timetable" => {
            let from = parse_date(parts.next())?;
            let to = parse_date(parts.next())?;
            let timetable = service.get_timetable(from, to, &cancel).map_err(describe)?;
            if parts.next() == Some("csv") {
                write_range_csv(&timetable, io::stdout()).map_err(|e| e.to_string())?;
            } else {
                print_json(&timetable)?;
            }
        }
        "days" => {
            let from = parse_date(parts.next())?;
            let to = parse_date(parts.next())?;
            let days = service
                .get_days_timetable(from, to, &cancel)
                .map_err(describe)?;
            if parts.next() == Some("csv") {
                write_days_csv(&days, io::stdout()).map_err(|e| e.to_string())?;
            } else {
                print_json(&days)?;
            }
        }
        "employee" => match parts.next() {
            Some("add") => {
                let email = parts.next().unwrap_or_default();
                let name = parts.collect::<Vec<_>>().join(" ");
                let employee = Employee::new(email, name);
                let availability = service
                    .create_employee(&employee, Utc::now())
                    .map_err(describe)?;
                println!(
                    "Created employee {} with {} weeks of availability.",
                    employee.email,
                    availability.len()
                );
            }
            Some("list") => {
                for employee in service.list_employees().map_err(describe)? {
                    println!("  {:<32} {}", employee.email, employee.name);
                }
            }
            Some("remove") => {
                let email = parts.next().ok_or("Usage: employee remove <email>")?;
                service.delete_employee(email).map_err(describe)?;
                println!("Removed employee {email}.");
            }
            _ => println!("Usage: employee <add <email> <name...>|list|remove <email>>"),
        },
        "availability" => {
            let email = parts.next().ok_or("Usage: availability <email> <week>")?;
            let week = parse_date(parts.next())?;
            let key = shift_planner::aggregate::availability_key(week, service.config().week_math);
            let availability = service.employee_availability(email).map_err(describe)?;
            match availability.week(&key) {
                Some(week) => print_json(week)?,
                None => println!("No availability for week {key}."),
            }
        }
        "week-availability" => {
            let week = parse_date(parts.next())?;
            let aggregated = service
                .get_aggregated_availability_for_week(week, &cancel)
                .map_err(describe)?;
            print_json(&aggregated)?;
        }
        "schedule" => match parts.next() {
            Some("set") => {
                let week = parse_date(parts.next())?;
                let schedule: WeekSchedule = read_json(parts.next())?;
                service.set_week_schedule(week, &schedule).map_err(describe)?;
                println!("Schedule stored for week {}.", shift_planner::week_key(week));
            }
            Some("show") => {
                let week = parse_date(parts.next())?;
                let schedule = service.get_week_schedule(week).map_err(describe)?;
                print_json(&schedule)?;
            }
            Some("reconcile") => {
                let week = parse_date(parts.next())?;
                let reconciled = service.reconciled_week(week, &cancel).map_err(describe)?;
                print_json(&reconciled)?;
                println!("Total shortfall: {}", reconciled.total_shortfall());
            }
            _ => println!("Usage: schedule <set <week> <json_path>|show <week>|reconcile <week>>"),
        },
        other => println!("Unknown command '{other}'. Type 'help' for commands."),
    }
    Ok(true)
}

fn run<S: ScheduleStore>(service: SchedulingService<S>) {
    println!("Shift Planner (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match execute(&service, input) {
            Ok(true) => {}
            Ok(false) => break,
            Err(message) => println!("{message}"),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    }
    .apply_env()?;

    match config.database_path.clone() {
        #[cfg(feature = "sqlite")]
        Some(path) => {
            let store = shift_planner::SqliteScheduleStore::new(&path)?;
            run(SchedulingService::new(store, config));
        }
        #[cfg(not(feature = "sqlite"))]
        Some(path) => {
            return Err(format!(
                "database {} configured but the sqlite feature is disabled",
                path.display()
            )
            .into());
        }
        None => run(SchedulingService::new(MemoryScheduleStore::new(), config)),
    }
    Ok(())
}
