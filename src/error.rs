use chrono::NaiveDate;
use thiserror::Error;

use crate::store::StoreError;

/// How an error should surface to whoever called the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOutcome {
    NotFound,
    Rejected,
    Failure,
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("default timetable not yet configured")]
    NotConfigured,

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid range {from}..{to}: {reason}")]
    InvalidRange {
        from: NaiveDate,
        to: NaiveDate,
        reason: &'static str,
    },

    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("invalid employee: {0}")]
    InvalidEmployee(String),

    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("{context}: {source}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },
}

impl ScheduleError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ScheduleError::NotFound(what.into())
    }

    pub fn store(context: impl Into<String>, source: StoreError) -> Self {
        ScheduleError::Store {
            context: context.into(),
            source,
        }
    }

    pub fn outcome(&self) -> ErrorOutcome {
        match self {
            ScheduleError::NotConfigured | ScheduleError::NotFound(_) => ErrorOutcome::NotFound,
            ScheduleError::InvalidRange { .. }
            | ScheduleError::InvalidTemplate(_)
            | ScheduleError::InvalidSchedule(_)
            | ScheduleError::InvalidEmployee(_) => ErrorOutcome::Rejected,
            ScheduleError::InternalInconsistency(_)
            | ScheduleError::Cancelled
            | ScheduleError::Store { .. } => ErrorOutcome::Failure,
        }
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
