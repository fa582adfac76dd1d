//! Core domain logic for attendance tracking.
//!
//! This crate contains:
//! - Status resolution: reducing one employee's day of events to a status
//! - Roster aggregation: resolving every active employee for a day
//! - Geofencing: deciding the status of newly recorded attempts

pub mod date;
pub mod geofence;
pub mod model;
mod resolve;
mod roster;
pub mod status;
mod store;
pub mod types;

pub use date::DayWindow;
pub use model::{
    Area, ControlEvent, Coordinate, Department, DepartmentSummary, Employee, EmployeeSummary,
    EntryEvent, ExitEvent, Gender, VacationInterval,
};
pub use resolve::{
    AttendanceRecord, DayRecords, NO_TIME, ResolveOptions, UNKNOWN_AREA, VacationView, Variant,
    WEEKLY_OFF, resolve,
};
pub use roster::{
    EmployeeAttendance, FailurePolicy, RosterRequest, RosterRow, build_roster,
    request_date, resolve_employee,
};
pub use status::{EntryState, EntryStatus, ExitState, ExitStatus};
pub use store::{AttendanceError, AttendanceStore, ListedEmployee};
pub use types::{EmployeeKey, EmployeeUuid, Handle, ValidationError};
