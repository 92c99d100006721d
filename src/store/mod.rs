use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use thiserror::Error;

use crate::availability::EmployeeAvailability;
use crate::employee::Employee;
use crate::schedule::WeekSchedule;
use crate::template::WeekTemplate;

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryScheduleStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteScheduleStore;

/// Key of the default template inside the `configs` collection.
pub const DEFAULT_TEMPLATE_KEY: &str = "default-timetable";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("no document '{key}' in {collection}")]
    NotFound {
        collection: Collection,
        key: String,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document collections, one per kind of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Configs,
    Schedule,
    Employees,
    Availability,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Configs => "configs",
            Collection::Schedule => "schedule",
            Collection::Employees => "employees",
            Collection::Availability => "availability",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value document storage behind the scheduling engine.
///
/// Implementors provide the four JSON document primitives; the typed
/// accessors are built on top of them and may be overridden. Stores must be
/// safe to read from several threads at once.
pub trait ScheduleStore: Send + Sync {
    fn get_document(&self, collection: Collection, key: &str) -> StoreResult<Option<String>>;

    /// Insert or fully replace a document.
    fn put_document(&self, collection: Collection, key: &str, json: String) -> StoreResult<()>;

    /// Returns whether a document was removed.
    fn remove_document(&self, collection: Collection, key: &str) -> StoreResult<bool>;

    /// Keys of a collection in ascending order.
    fn document_keys(&self, collection: Collection) -> StoreResult<Vec<String>>;

    fn get_default_template(&self) -> StoreResult<WeekTemplate> {
        load(self, Collection::Configs, DEFAULT_TEMPLATE_KEY)
    }

    fn set_default_template(&self, template: &WeekTemplate) -> StoreResult<()> {
        save(self, Collection::Configs, DEFAULT_TEMPLATE_KEY, template)
    }

    fn get_employee_availability(&self, employee_id: &str) -> StoreResult<EmployeeAvailability> {
        load(self, Collection::Availability, employee_id)
    }

    fn set_employee_availability(
        &self,
        employee_id: &str,
        availability: &EmployeeAvailability,
    ) -> StoreResult<()> {
        save(self, Collection::Availability, employee_id, availability)
    }

    fn get_week_schedule(&self, week_key: &str) -> StoreResult<WeekSchedule> {
        load(self, Collection::Schedule, week_key)
    }

    fn set_week_schedule(&self, week_key: &str, schedule: &WeekSchedule) -> StoreResult<()> {
        save(self, Collection::Schedule, week_key, schedule)
    }

    fn list_employee_ids(&self) -> StoreResult<Vec<String>> {
        self.document_keys(Collection::Employees)
    }

    fn put_employee(&self, employee: &Employee) -> StoreResult<()> {
        save(self, Collection::Employees, &employee.email, employee)
    }

    fn get_employee(&self, email: &str) -> StoreResult<Employee> {
        load(self, Collection::Employees, email)
    }

    /// Removes the employee and their availability. Missing records are fine.
    fn delete_employee(&self, email: &str) -> StoreResult<()> {
        self.remove_document(Collection::Employees, email)?;
        self.remove_document(Collection::Availability, email)?;
        Ok(())
    }

    fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        self.list_employee_ids()?
            .iter()
            .map(|email| self.get_employee(email))
            .collect()
    }
}

fn load<S, T>(store: &S, collection: Collection, key: &str) -> StoreResult<T>
where
    S: ScheduleStore + ?Sized,
    T: DeserializeOwned,
{
    let json = store
        .get_document(collection, key)?
        .ok_or_else(|| StoreError::NotFound {
            collection,
            key: key.to_string(),
        })?;
    Ok(serde_json::from_str(&json)?)
}

fn save<S, T>(store: &S, collection: Collection, key: &str, value: &T) -> StoreResult<()>
where
    S: ScheduleStore + ?Sized,
    T: Serialize,
{
    let json = serde_json::to_string(value)?;
    store.put_document(collection, key, json)
}
