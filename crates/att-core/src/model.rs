//! Stored entities: employees, organisational groupings and raw events.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{EntryStatus, ExitStatus};
use crate::types::{EmployeeUuid, Handle, ValidationError};

/// An organisational grouping of employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

/// A department together with its live active-employee count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentSummary {
    pub id: i64,
    pub name: String,
    pub active: bool,
    /// Number of active employees referencing this department.
    pub employees: i64,
}

/// A latitude/longitude pair, kept as the decimal text it was entered with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: String,
    pub longitude: String,
}

/// A named geofenced zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: i64,
    pub name: String,
    /// Boundary ring in insertion order.
    pub coordinates: Vec<Coordinate>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(ValidationError::UnknownStatus {
                kind: "gender",
                value: s.to_string(),
            }),
        }
    }
}

/// A person tracked by the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub uuid: EmployeeUuid,
    pub handle: Handle,
    pub full_name: String,
    /// Weak reference; cleared when the department is deleted.
    pub department_id: Option<i64>,
    pub position: String,
    pub gender: Option<Gender>,
    pub working_time: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub image: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub active: bool,
    pub created: DateTime<Utc>,
}

/// Identity fields echoed next to every resolved record.
///
/// Plain strings so a row can still be named when the rest of it fails to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub id: i64,
    pub uuid: String,
    pub handle: String,
    pub full_name: String,
}

impl From<&Employee> for EmployeeSummary {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            uuid: employee.uuid.as_str().to_owned(),
            handle: employee.handle.as_str().to_owned(),
            full_name: employee.full_name.clone(),
        }
    }
}

/// One recorded entry or exit attempt.
///
/// `id` is the store's monotonic sequence and breaks ties between events
/// created at the same instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEvent<S> {
    pub id: i64,
    pub employee_id: i64,
    pub area_id: Option<i64>,
    /// Name of the linked area, if the link still exists.
    pub area_name: Option<String>,
    pub status: S,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub image: Option<String>,
    pub created: DateTime<Utc>,
}

/// Entry attempt (access control).
pub type EntryEvent = ControlEvent<EntryStatus>;

/// Exit attempt (output control).
pub type ExitEvent = ControlEvent<ExitStatus>;

impl<S> ControlEvent<S> {
    /// Ordering key used to pick the latest event of a day.
    pub fn order_key(&self) -> (DateTime<Utc>, i64) {
        (self.created, self.id)
    }
}

/// An approved leave period, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationInterval {
    pub id: i64,
    pub employee_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub file: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl VacationInterval {
    /// Label used when a vacation is created without an explicit type.
    pub const DEFAULT_KIND: &'static str = "Mehnat ta'tili";

    /// Returns true if `date` lies within `[start, end]`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
