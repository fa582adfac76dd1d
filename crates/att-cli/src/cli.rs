//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Attendance tracker.
///
/// Records entry and exit attempts per employee and resolves them into a
/// daily attendance status, one employee at a time or as a roster.
#[derive(Debug, Parser)]
#[command(name = "att", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the database if needed and print its location.
    Init,

    /// Show database location and record counts.
    Status,

    /// Manage departments.
    #[command(subcommand)]
    Department(DepartmentAction),

    /// Manage geofenced areas.
    #[command(subcommand)]
    Area(AreaAction),

    /// Manage employees.
    #[command(subcommand)]
    Employee(EmployeeAction),

    /// Record an entry or exit attempt.
    #[command(subcommand)]
    Record(RecordAction),

    /// Manage vacations.
    #[command(subcommand)]
    Vacation(VacationAction),

    /// Resolve one employee's attendance for a day.
    Resolve {
        /// Employee id, uuid or handle.
        #[arg(long)]
        employee: String,

        #[command(flatten)]
        date: DateArgs,

        /// Omit area and exit fields; mark Mondays without entry as "x".
        #[arg(long)]
        compact: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Resolve every active employee for a day.
    Roster {
        /// Restrict to one department.
        #[arg(long)]
        department: Option<i64>,

        #[command(flatten)]
        date: DateArgs,

        /// Omit area, exit and department fields; mark Mondays without entry as "x".
        #[arg(long)]
        compact: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Day, month and year of a request. Missing parts default to today.
#[derive(Debug, Clone, Default, Args)]
pub struct DateArgs {
    #[arg(long)]
    pub day: Option<String>,

    #[arg(long)]
    pub month: Option<String>,

    #[arg(long)]
    pub year: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum DepartmentAction {
    /// Create a department.
    Add { name: String },

    /// List departments with their active employee count.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum AreaAction {
    /// Create an area from its boundary points.
    Add {
        name: String,

        /// Boundary point as LAT,LON (repeatable, in ring order).
        #[arg(long = "point", value_name = "LAT,LON")]
        points: Vec<String>,
    },

    /// List areas with their boundary points.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GenderArg {
    Male,
    Female,
}

#[derive(Debug, Subcommand)]
pub enum EmployeeAction {
    /// Create an employee.
    Add {
        /// Badge or passport number.
        #[arg(long)]
        handle: String,

        #[arg(long)]
        full_name: String,

        /// Department id.
        #[arg(long)]
        department: Option<i64>,

        #[arg(long, default_value = "")]
        position: String,

        #[arg(long, value_enum)]
        gender: Option<GenderArg>,

        /// Birth date (YYYY-MM-DD).
        #[arg(long)]
        birth_date: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Use this uuid instead of generating one.
        #[arg(long)]
        uuid: Option<String>,
    },

    /// List all employees.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Deactivate an employee (id, uuid or handle).
    Deactivate { employee: String },
}

/// Where and when an attempt happened.
#[derive(Debug, Clone, Args)]
pub struct RecordArgs {
    /// Employee id, uuid or handle.
    #[arg(long)]
    pub employee: String,

    /// Area the attempt was made at.
    #[arg(long)]
    pub area: Option<i64>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<String>,

    /// Reference to the captured photo.
    #[arg(long)]
    pub image: Option<String>,

    /// Creation instant (RFC 3339); defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum RecordAction {
    /// Record an entry attempt.
    Entry(RecordArgs),

    /// Record an exit attempt.
    Exit(RecordArgs),
}

#[derive(Debug, Subcommand)]
pub enum VacationAction {
    /// Add a vacation (inclusive dates, YYYY-MM-DD).
    Add {
        /// Employee id, uuid or handle.
        #[arg(long)]
        employee: String,

        #[arg(long)]
        start: String,

        #[arg(long)]
        end: String,

        /// Vacation type label.
        #[arg(long = "type")]
        kind: Option<String>,

        /// Reference to the supporting document.
        #[arg(long)]
        file: Option<String>,
    },

    /// List an employee's active vacations.
    List {
        /// Employee id, uuid or handle.
        #[arg(long)]
        employee: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Cancel a vacation by id.
    Cancel { id: i64 },
}

impl From<GenderArg> for att_core::Gender {
    fn from(gender: GenderArg) -> Self {
        match gender {
            GenderArg::Male => Self::Male,
            GenderArg::Female => Self::Female,
        }
    }
}
