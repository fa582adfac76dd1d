//! Roster aggregation: resolving many employees for one day.
//!
//! Store reads happen on the calling thread (`rusqlite` connections are not
//! `Sync`); the pure resolution step fans out over a bounded `rayon` pool.
//! Output order always follows the store's employee order.

use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::date::{DayWindow, parse_date};
use crate::model::{DepartmentSummary, EmployeeSummary};
use crate::resolve::{AttendanceRecord, DayRecords, ResolveOptions, resolve};
use crate::store::{AttendanceError, AttendanceStore};
use crate::types::EmployeeKey;

/// What happens to an employee whose row or records could not be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Keep the row, without attendance fields, carrying the error message.
    #[default]
    Flag,
    /// Drop the row.
    Omit,
}

/// One employee resolved for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeAttendance {
    #[serde(flatten)]
    pub employee: EmployeeSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentSummary>,
    #[serde(flatten)]
    pub record: AttendanceRecord,
}

/// One line of a roster. Exactly one of `attendance` and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    #[serde(flatten)]
    pub employee: EmployeeSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentSummary>,
    #[serde(flatten)]
    pub attendance: Option<AttendanceRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Parameters of a roster resolution.
#[derive(Debug, Clone)]
pub struct RosterRequest {
    pub date: NaiveDate,
    /// Restrict to one department; `None` means the whole organisation.
    pub department: Option<i64>,
    pub options: ResolveOptions,
    pub failure_policy: FailurePolicy,
    /// Upper bound on resolution threads.
    pub workers: usize,
}

/// Parses request date components before anything touches the store.
pub fn request_date(day: &str, month: &str, year: &str) -> Result<NaiveDate, AttendanceError> {
    Ok(parse_date(day, month, year)?)
}

/// Resolves a single employee, active or not.
pub fn resolve_employee<S: AttendanceStore>(
    store: &S,
    key: &EmployeeKey,
    date: NaiveDate,
    options: &ResolveOptions,
) -> Result<EmployeeAttendance, AttendanceError> {
    let employee = store
        .find_employee(key)
        .map_err(AttendanceError::data_source)?
        .ok_or_else(|| AttendanceError::EmployeeNotFound(key.clone()))?;

    let window = DayWindow::new(date, options.timezone);
    let mut departments = HashMap::new();
    let fetched = fetch(
        store,
        employee.id,
        employee.department_id,
        &window,
        options.variant.includes_location(),
        &mut departments,
    )
    .map_err(AttendanceError::data_source)?;

    Ok(EmployeeAttendance {
        employee: EmployeeSummary::from(&employee),
        department: fetched.department,
        record: resolve(&fetched.records, date, options),
    })
}

/// Resolves every active employee (optionally of one department) for a day.
///
/// Failing to list employees aborts the roster. A failure while loading a
/// single employee's row or records is handled per [`FailurePolicy`].
pub fn build_roster<S: AttendanceStore>(
    store: &S,
    request: &RosterRequest,
) -> Result<Vec<RosterRow>, AttendanceError> {
    let employees = store
        .active_employees(request.department)
        .map_err(AttendanceError::data_source)?;
    tracing::debug!(
        count = employees.len(),
        date = %request.date,
        department = ?request.department,
        "resolving roster"
    );

    let window = DayWindow::new(request.date, request.options.timezone);
    let include_department = request.options.variant.includes_location();
    let mut departments = HashMap::new();

    let fetched: Vec<(EmployeeSummary, Result<Fetched, String>)> = employees
        .into_iter()
        .map(|listed| {
            let outcome = listed
                .employee
                .and_then(|employee| {
                    fetch(
                        store,
                        employee.id,
                        employee.department_id,
                        &window,
                        include_department,
                        &mut departments,
                    )
                })
                .map_err(|err| err.to_string());
            (listed.summary, outcome)
        })
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(request.workers.max(1))
        .build()?;

    let rows: Vec<Option<RosterRow>> = pool.install(|| {
        fetched
            .into_par_iter()
            .map(|(employee, outcome)| resolve_row(employee, outcome, request))
            .collect()
    });

    Ok(rows.into_iter().flatten().collect())
}

#[derive(Debug)]
struct Fetched {
    department: Option<DepartmentSummary>,
    records: DayRecords,
}

fn fetch<S: AttendanceStore>(
    store: &S,
    employee_id: i64,
    department_id: Option<i64>,
    window: &DayWindow,
    include_department: bool,
    departments: &mut HashMap<i64, Option<DepartmentSummary>>,
) -> Result<Fetched, S::Error> {
    let department = match department_id {
        Some(id) if include_department => {
            if let Some(cached) = departments.get(&id) {
                cached.clone()
            } else {
                let summary = store.department_summary(id)?;
                departments.insert(id, summary.clone());
                summary
            }
        }
        _ => None,
    };

    let records = store.day_records(employee_id, window)?;
    Ok(Fetched {
        department,
        records,
    })
}

fn resolve_row(
    employee: EmployeeSummary,
    outcome: Result<Fetched, String>,
    request: &RosterRequest,
) -> Option<RosterRow> {
    match outcome {
        Ok(fetched) => Some(RosterRow {
            employee,
            department: fetched.department,
            attendance: Some(resolve(&fetched.records, request.date, &request.options)),
            error: None,
        }),
        Err(error) => match request.failure_policy {
            FailurePolicy::Omit => {
                tracing::warn!(employee = employee.id, %error, "omitting employee from roster");
                None
            }
            FailurePolicy::Flag => {
                tracing::warn!(employee = employee.id, %error, "flagging employee in roster");
                Some(RosterRow {
                    employee,
                    department: None,
                    attendance: None,
                    error: Some(error),
                })
            }
        },
    }
}
