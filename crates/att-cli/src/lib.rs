//! Attendance tracker CLI library.
//!
//! This crate provides the CLI interface for the attendance tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{
    AreaAction, Cli, Commands, DateArgs, DepartmentAction, EmployeeAction, GenderArg,
    RecordAction, RecordArgs, VacationAction,
};
pub use config::{Config, ConfigError};
