//! Read-side seam between the resolution engine and its event store.

use thiserror::Error;

use crate::date::DayWindow;
use crate::model::{DepartmentSummary, Employee, EmployeeSummary};
use crate::resolve::DayRecords;
use crate::types::{EmployeeKey, ValidationError};

/// Read-only queries the engine issues against an event store.
///
/// Implementations return whatever is committed at query time; no isolation
/// across calls is expected.
pub trait AttendanceStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Looks up an employee by id, uuid or handle, active or not.
    fn find_employee(&self, key: &EmployeeKey) -> Result<Option<Employee>, Self::Error>;

    /// Active employees in id order, optionally limited to one department.
    ///
    /// The outer error means the listing itself failed. A row that is listed
    /// but cannot be loaded carries its own error.
    fn active_employees(
        &self,
        department: Option<i64>,
    ) -> Result<Vec<ListedEmployee<Self::Error>>, Self::Error>;

    /// Department with a freshly counted number of active employees.
    fn department_summary(&self, id: i64) -> Result<Option<DepartmentSummary>, Self::Error>;

    /// Active entry/exit events created within `window` and active vacations
    /// covering `window.date`.
    fn day_records(&self, employee_id: i64, window: &DayWindow) -> Result<DayRecords, Self::Error>;
}

/// An employee named by a roster listing, with the outcome of loading the full row.
#[derive(Debug)]
pub struct ListedEmployee<E> {
    pub summary: EmployeeSummary,
    pub employee: Result<Employee, E>,
}

impl<E> ListedEmployee<E> {
    pub fn loaded(employee: Employee) -> Self {
        Self {
            summary: EmployeeSummary::from(&employee),
            employee: Ok(employee),
        }
    }
}

/// Errors surfaced by resolution requests.
#[derive(Debug, Error)]
pub enum AttendanceError {
    /// Caller supplied a date that does not exist.
    #[error(transparent)]
    InvalidDate(#[from] ValidationError),

    #[error("employee not found: {0}")]
    EmployeeNotFound(EmployeeKey),

    /// The store could not answer; distinct from "no records".
    #[error("data source unavailable")]
    DataSource(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to start resolution workers")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl AttendanceError {
    pub(crate) fn data_source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DataSource(Box::new(err))
    }
}
