//! Storage layer for attendance tracking.
//!
//! Persists employees, departments, geofenced areas, entry/exit events and
//! vacations using `rusqlite`, and answers the day-scoped queries the
//! resolution engine needs through [`AttendanceStore`].
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. Roster resolution reads
//! on the calling thread and only parallelises the pure resolution step.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Event and row timestamps are stored as TEXT in RFC 3339 UTC with millisecond
//! precision (e.g., `2024-03-04T04:15:00.000Z`), so lexicographic ordering matches
//! chronological ordering and day windows become plain range comparisons.
//!
//! Calendar dates (vacation bounds, birth dates) are stored as `YYYY-MM-DD`.
//!
//! ## Soft Deletion
//!
//! Every table with an `active` column is soft-deleted by clearing it. Inactive
//! events and vacations are invisible to the day-scoped queries; inactive
//! employees are left out of rosters and department counts.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use att_core::geofence::GeoPoint;
use att_core::{
    Area, AttendanceStore, ControlEvent, Coordinate, DayRecords, DayWindow, Department,
    DepartmentSummary, Employee, EmployeeKey, EmployeeUuid, EntryEvent, EntryStatus, ExitEvent,
    EmployeeSummary, ExitStatus, Gender, Handle, ListedEmployee, ValidationError, VacationInterval,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored timestamp or date could not be parsed.
    #[error("invalid time value in {table} row {id}: {value}")]
    TimeParse {
        table: &'static str,
        id: i64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored value is outside the domain vocabulary.
    #[error("invalid data in {table} row {id}")]
    InvalidRow {
        table: &'static str,
        id: i64,
        #[source]
        source: ValidationError,
    },
    /// Input rejected before it reached the database.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A new employee ready to be stored.
#[derive(Debug, Clone, Default)]
pub struct NewEmployee {
    /// Generated (v4) when absent.
    pub uuid: Option<String>,
    pub handle: String,
    pub full_name: String,
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
}

/// A new entry or exit attempt ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewControlEvent<S> {
    pub employee_id: i64,
    pub area_id: Option<i64>,
    pub status: S,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub image: Option<String>,
    pub created: DateTime<Utc>,
}

pub type NewEntry = NewControlEvent<EntryStatus>;
pub type NewExit = NewControlEvent<ExitStatus>;

/// A new vacation ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVacation {
    pub employee_id: i64,
    /// Defaults to [`VacationInterval::DEFAULT_KIND`].
    pub kind: Option<String>,
    pub file: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Row counts shown by `att status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub departments: i64,
    pub areas: i64,
    pub active_employees: i64,
    pub entries: i64,
    pub exits: i64,
    pub vacations: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlTable {
    Access,
    Output,
}

impl ControlTable {
    const fn name(self) -> &'static str {
        match self {
            Self::Access => "access_controls",
            Self::Output => "output_controls",
        }
    }
}

const EMPLOYEE_COLUMNS: &str = "id, uuid, handle, full_name, department_id, position, gender, \
     working_time, birth_date, image, country, city, town, address, phone, active, created";

const DATE_FORMAT: &str = "%Y-%m-%d";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &std::path::Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS departments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS areas (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1
            );

            -- latitude/longitude: decimal degrees kept as entered
            CREATE TABLE IF NOT EXISTS coordinates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                latitude TEXT NOT NULL,
                longitude TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS area_coordinates (
                area_id INTEGER NOT NULL,
                coordinate_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY (area_id, coordinate_id),
                FOREIGN KEY (area_id) REFERENCES areas(id) ON DELETE CASCADE,
                FOREIGN KEY (coordinate_id) REFERENCES coordinates(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                uuid TEXT NOT NULL UNIQUE,
                handle TEXT NOT NULL,
                full_name TEXT NOT NULL,
                department_id INTEGER,
                position TEXT NOT NULL DEFAULT '',
                gender TEXT,
                working_time TEXT DEFAULT '1',
                birth_date TEXT,
                image TEXT,
                country TEXT,
                city TEXT,
                town TEXT,
                address TEXT,
                phone TEXT,
                active INTEGER NOT NULL DEFAULT 1,
                created TEXT NOT NULL,
                updated TEXT NOT NULL,
                FOREIGN KEY (department_id) REFERENCES departments(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_employees_department ON employees(department_id, active);

            -- Entry attempts; status: arrived | late | failed | in_vocation
            CREATE TABLE IF NOT EXISTS access_controls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                employee_id INTEGER NOT NULL,
                area_id INTEGER,
                status TEXT NOT NULL,
                latitude TEXT,
                longitude TEXT,
                image TEXT,
                active INTEGER NOT NULL DEFAULT 1,
                created TEXT NOT NULL,
                updated TEXT NOT NULL,
                FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE,
                FOREIGN KEY (area_id) REFERENCES areas(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_access_controls_employee_created
                ON access_controls(employee_id, created);

            -- Exit attempts; status: gone | failed
            CREATE TABLE IF NOT EXISTS output_controls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                employee_id INTEGER NOT NULL,
                area_id INTEGER,
                status TEXT NOT NULL,
                latitude TEXT,
                longitude TEXT,
                image TEXT,
                active INTEGER NOT NULL DEFAULT 1,
                created TEXT NOT NULL,
                updated TEXT NOT NULL,
                FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE,
                FOREIGN KEY (area_id) REFERENCES areas(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_output_controls_employee_created
                ON output_controls(employee_id, created);

            CREATE TABLE IF NOT EXISTS vocations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                employee_id INTEGER NOT NULL,
                type TEXT NOT NULL,
                file TEXT,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                created TEXT NOT NULL,
                updated TEXT NOT NULL,
                CHECK (start_date <= end_date),
                FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_vocations_employee_range
                ON vocations(employee_id, start_date, end_date);
            ",
        )?;
        Ok(())
    }

    // ========== Departments ==========

    /// Creates a department.
    pub fn insert_department(&self, name: &str) -> Result<Department, DbError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty {
                field: "department name",
            }
            .into());
        }
        self.conn
            .execute("INSERT INTO departments (name) VALUES (?)", [name])?;
        Ok(Department {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            active: true,
        })
    }

    /// Lists departments ordered by ID, each with its live active-employee count.
    pub fn list_departments(&self) -> Result<Vec<DepartmentSummary>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT d.id, d.name, d.active,
                (SELECT COUNT(*) FROM employees e WHERE e.department_id = d.id AND e.active = 1)
            FROM departments d
            ORDER BY d.id ASC
            ",
        )?;
        let rows = stmt.query_map([], department_summary_from_row)?;
        let mut departments = Vec::new();
        for row in rows {
            departments.push(row?);
        }
        Ok(departments)
    }

    /// Counts active employees referencing a department.
    pub fn count_active_employees(&self, department_id: i64) -> Result<i64, DbError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM employees WHERE department_id = ? AND active = 1",
            [department_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ========== Areas ==========

    /// Creates an area with its boundary ring.
    ///
    /// Coordinates must parse as decimal degrees; their order is preserved.
    pub fn insert_area(&mut self, name: &str, coordinates: &[Coordinate]) -> Result<Area, DbError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty { field: "area name" }.into());
        }
        for coordinate in coordinates {
            GeoPoint::try_from(coordinate)?;
        }

        let tx = self.conn.transaction()?;
        tx.execute("INSERT INTO areas (name) VALUES (?)", [name])?;
        let area_id = tx.last_insert_rowid();
        {
            let mut coordinate_stmt =
                tx.prepare("INSERT INTO coordinates (latitude, longitude) VALUES (?, ?)")?;
            let mut link_stmt = tx.prepare(
                "INSERT INTO area_coordinates (area_id, coordinate_id, position) VALUES (?, ?, ?)",
            )?;
            for (position, coordinate) in (0_i64..).zip(coordinates) {
                let coordinate_id = coordinate_stmt
                    .insert(params![coordinate.latitude.trim(), coordinate.longitude.trim()])?;
                link_stmt.execute(params![area_id, coordinate_id, position])?;
            }
        }
        tx.commit()?;

        Ok(Area {
            id: area_id,
            name: name.to_string(),
            coordinates: coordinates
                .iter()
                .map(|c| Coordinate {
                    latitude: c.latitude.trim().to_string(),
                    longitude: c.longitude.trim().to_string(),
                })
                .collect(),
            active: true,
        })
    }

    /// Fetches one area with its coordinates.
    pub fn area(&self, id: i64) -> Result<Option<Area>, DbError> {
        let area = self
            .conn
            .query_row(
                "SELECT id, name, active FROM areas WHERE id = ?",
                [id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, bool>(2)?,
                    ))
                },
            )
            .optional()?;
        area.map(|(id, name, active)| self.with_coordinates(id, name, active))
            .transpose()
    }

    /// Lists areas ordered by ID.
    pub fn list_areas(&self) -> Result<Vec<Area>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, active FROM areas ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let name: String = row.get(1)?;
            let active: bool = row.get(2)?;
            Ok((id, name, active))
        })?;
        let mut areas = Vec::new();
        for row in rows {
            let (id, name, active) = row?;
            areas.push(self.with_coordinates(id, name, active)?);
        }
        Ok(areas)
    }

    fn with_coordinates(&self, id: i64, name: String, active: bool) -> Result<Area, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT c.latitude, c.longitude
            FROM area_coordinates ac
            JOIN coordinates c ON c.id = ac.coordinate_id
            WHERE ac.area_id = ?
            ORDER BY ac.position ASC
            ",
        )?;
        let rows = stmt.query_map([id], |row| {
            Ok(Coordinate {
                latitude: row.get(0)?,
                longitude: row.get(1)?,
            })
        })?;
        let mut coordinates = Vec::new();
        for row in rows {
            coordinates.push(row?);
        }
        Ok(Area {
            id,
            name,
            coordinates,
            active,
        })
    }

    // ========== Employees ==========

    /// Creates an employee, generating a uuid when none is supplied.
    ///
    /// A supplied uuid must be a real UUID and a handle must not read as an id
    /// or uuid, so every [`EmployeeKey`] names at most one kind of lookup.
    pub fn insert_employee(&self, new: &NewEmployee) -> Result<Employee, DbError> {
        let handle = Handle::unambiguous(new.handle.trim())?;
        let full_name = new.full_name.trim();
        if full_name.is_empty() {
            return Err(ValidationError::Empty { field: "full name" }.into());
        }
        let uuid = match new.uuid.as_deref() {
            Some(uuid) => EmployeeUuid::new(uuid)?,
            None => EmployeeUuid::generate(),
        };
        let now = format_timestamp(Utc::now());

        self.conn.execute(
            "
            INSERT INTO employees
            (uuid, handle, full_name, department_id, position, gender, working_time, birth_date,
             image, country, city, town, address, phone, created, updated)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                uuid.as_str(),
                handle.as_str(),
                full_name,
                new.department_id,
                new.position.trim(),
                new.gender.map(|g| g.as_str()),
                new.working_time.as_deref().unwrap_or("1"),
                new.birth_date.map(format_date),
                new.image,
                new.country,
                new.city,
                new.town,
                new.address,
                new.phone,
                now,
                now,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, uuid = %uuid, "inserted employee");
        self.find_employee(&EmployeeKey::Id(id))?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Looks up an employee by id, uuid or handle, active or not.
    ///
    /// Handles are not unique: the active employee with the lowest id wins,
    /// falling back to inactive ones.
    pub fn find_employee(&self, key: &EmployeeKey) -> Result<Option<Employee>, DbError> {
        let row = match key {
            EmployeeKey::Id(id) => self
                .conn
                .query_row(
                    &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?"),
                    [id],
                    EmployeeRow::from_row,
                )
                .optional()?,
            EmployeeKey::Uuid(uuid) => self
                .conn
                .query_row(
                    &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE uuid = ?"),
                    [uuid.as_str()],
                    EmployeeRow::from_row,
                )
                .optional()?,
            EmployeeKey::Handle(handle) => self
                .conn
                .query_row(
                    &format!(
                        "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE handle = ?
                         ORDER BY active DESC, id ASC LIMIT 1"
                    ),
                    [handle.as_str()],
                    EmployeeRow::from_row,
                )
                .optional()?,
        };
        row.map(EmployeeRow::into_employee).transpose()
    }

    /// Lists all employees, active or not, ordered by ID.
    pub fn list_employees(&self) -> Result<Vec<Employee>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map([], EmployeeRow::from_row)?;
        let mut employees = Vec::new();
        for row in rows {
            employees.push(row?.into_employee()?);
        }
        Ok(employees)
    }

    /// Sets an employee's active flag. Returns false if no employee matched.
    pub fn set_employee_active(&self, key: &EmployeeKey, active: bool) -> Result<bool, DbError> {
        let now = format_timestamp(Utc::now());
        let changed = match key {
            EmployeeKey::Id(id) => self.conn.execute(
                "UPDATE employees SET active = ?, updated = ? WHERE id = ?",
                params![active, now, id],
            )?,
            EmployeeKey::Uuid(uuid) => self.conn.execute(
                "UPDATE employees SET active = ?, updated = ? WHERE uuid = ?",
                params![active, now, uuid.as_str()],
            )?,
            EmployeeKey::Handle(_) => match self.find_employee(key)? {
                Some(employee) => self.conn.execute(
                    "UPDATE employees SET active = ?, updated = ? WHERE id = ?",
                    params![active, now, employee.id],
                )?,
                None => 0,
            },
        };
        Ok(changed > 0)
    }

    // ========== Entry / exit events ==========

    /// Appends an entry attempt.
    pub fn append_entry(&self, event: &NewEntry) -> Result<EntryEvent, DbError> {
        self.append_control(ControlTable::Access, event, event.status.as_str())
    }

    /// Appends an exit attempt.
    pub fn append_exit(&self, event: &NewExit) -> Result<ExitEvent, DbError> {
        self.append_control(ControlTable::Output, event, event.status.as_str())
    }

    fn append_control<S: Copy>(
        &self,
        table: ControlTable,
        event: &NewControlEvent<S>,
        status: &str,
    ) -> Result<ControlEvent<S>, DbError> {
        let created = format_timestamp(event.created);
        let now = format_timestamp(Utc::now());
        self.conn.execute(
            &format!(
                "
                INSERT INTO {}
                (employee_id, area_id, status, latitude, longitude, image, created, updated)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ",
                table.name()
            ),
            params![
                event.employee_id,
                event.area_id,
                status,
                event.latitude,
                event.longitude,
                event.image,
                created,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        let area_name = match event.area_id {
            Some(area_id) => self
                .conn
                .query_row("SELECT name FROM areas WHERE id = ?", [area_id], |row| {
                    row.get(0)
                })
                .optional()?,
            None => None,
        };
        tracing::debug!(table = table.name(), id, employee = event.employee_id, %status, "appended event");

        Ok(ControlEvent {
            id,
            employee_id: event.employee_id,
            area_id: event.area_id,
            area_name,
            status: event.status,
            latitude: event.latitude.clone(),
            longitude: event.longitude.clone(),
            image: event.image.clone(),
            created: parse_timestamp(table.name(), id, &created)?,
        })
    }

    /// Active entry attempts of an employee created within `[start, end)`.
    pub fn entries_between(
        &self,
        employee_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EntryEvent>, DbError> {
        self.control_events_between(ControlTable::Access, employee_id, start, end)
    }

    /// Active exit attempts of an employee created within `[start, end)`.
    pub fn exits_between(
        &self,
        employee_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ExitEvent>, DbError> {
        self.control_events_between(ControlTable::Output, employee_id, start, end)
    }

    fn control_events_between<S>(
        &self,
        table: ControlTable,
        employee_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ControlEvent<S>>, DbError>
    where
        S: std::str::FromStr<Err = ValidationError>,
    {
        if end <= start {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT c.id, c.employee_id, c.area_id, a.name, c.status, c.latitude, c.longitude,
                c.image, c.created
            FROM {} c
            LEFT JOIN areas a ON a.id = c.area_id
            WHERE c.employee_id = ? AND c.active = 1 AND c.created >= ? AND c.created < ?
            ORDER BY c.created ASC, c.id ASC
            ",
            table.name()
        ))?;
        let rows = stmt.query_map(
            params![employee_id, format_timestamp(start), format_timestamp(end)],
            |row| {
                Ok(ControlRow {
                    id: row.get(0)?,
                    employee_id: row.get(1)?,
                    area_id: row.get(2)?,
                    area_name: row.get(3)?,
                    status: row.get(4)?,
                    latitude: row.get(5)?,
                    longitude: row.get(6)?,
                    image: row.get(7)?,
                    created: row.get(8)?,
                })
            },
        )?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_event(table)?);
        }
        Ok(events)
    }

    /// Sets an entry event's active flag. Returns false if no event matched.
    pub fn set_entry_active(&self, id: i64, active: bool) -> Result<bool, DbError> {
        self.set_active(ControlTable::Access.name(), id, active)
    }

    /// Sets an exit event's active flag. Returns false if no event matched.
    pub fn set_exit_active(&self, id: i64, active: bool) -> Result<bool, DbError> {
        self.set_active(ControlTable::Output.name(), id, active)
    }

    fn set_active(&self, table: &'static str, id: i64, active: bool) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            &format!("UPDATE {table} SET active = ?, updated = ? WHERE id = ?"),
            params![active, format_timestamp(Utc::now()), id],
        )?;
        Ok(changed > 0)
    }

    // ========== Vacations ==========

    /// Creates a vacation. Rejects intervals that end before they start.
    pub fn insert_vacation(&self, vacation: &NewVacation) -> Result<VacationInterval, DbError> {
        if vacation.start > vacation.end {
            return Err(ValidationError::InvertedInterval {
                start: format_date(vacation.start),
                end: format_date(vacation.end),
            }
            .into());
        }
        let kind = vacation
            .kind
            .as_deref()
            .map(str::trim)
            .filter(|kind| !kind.is_empty())
            .unwrap_or(VacationInterval::DEFAULT_KIND);
        let now = format_timestamp(Utc::now());

        self.conn.execute(
            "
            INSERT INTO vocations (employee_id, type, file, start_date, end_date, created, updated)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                vacation.employee_id,
                kind,
                vacation.file,
                format_date(vacation.start),
                format_date(vacation.end),
                now,
                now,
            ],
        )?;

        Ok(VacationInterval {
            id: self.conn.last_insert_rowid(),
            employee_id: vacation.employee_id,
            kind: kind.to_string(),
            file: vacation.file.clone(),
            start: vacation.start,
            end: vacation.end,
        })
    }

    /// Active vacations of an employee whose inclusive range contains `date`.
    pub fn vacations_covering(
        &self,
        employee_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<VacationInterval>, DbError> {
        self.query_vacations(
            "
            SELECT id, employee_id, type, file, start_date, end_date
            FROM vocations
            WHERE employee_id = ?1 AND active = 1 AND start_date <= ?2 AND end_date >= ?2
            ORDER BY start_date ASC, id ASC
            ",
            params![employee_id, format_date(date)],
        )
    }

    /// Active vacations of an employee ordered by start date.
    pub fn list_vacations(&self, employee_id: i64) -> Result<Vec<VacationInterval>, DbError> {
        self.query_vacations(
            "
            SELECT id, employee_id, type, file, start_date, end_date
            FROM vocations
            WHERE employee_id = ? AND active = 1
            ORDER BY start_date ASC, id ASC
            ",
            params![employee_id],
        )
    }

    /// Sets a vacation's active flag. Returns false if no vacation matched.
    pub fn set_vacation_active(&self, id: i64, active: bool) -> Result<bool, DbError> {
        self.set_active("vocations", id, active)
    }

    fn query_vacations(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<VacationInterval>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok(VacationRow {
                id: row.get(0)?,
                employee_id: row.get(1)?,
                kind: row.get(2)?,
                file: row.get(3)?,
                start: row.get(4)?,
                end: row.get(5)?,
            })
        })?;
        let mut vacations = Vec::new();
        for row in rows {
            vacations.push(row?.into_vacation()?);
        }
        Ok(vacations)
    }

    // ========== Summary ==========

    /// Counts rows for a status overview.
    pub fn counts(&self) -> Result<StoreCounts, DbError> {
        let count = |sql: &str| -> Result<i64, DbError> {
            Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
        };
        Ok(StoreCounts {
            departments: count("SELECT COUNT(*) FROM departments")?,
            areas: count("SELECT COUNT(*) FROM areas")?,
            active_employees: count("SELECT COUNT(*) FROM employees WHERE active = 1")?,
            entries: count("SELECT COUNT(*) FROM access_controls WHERE active = 1")?,
            exits: count("SELECT COUNT(*) FROM output_controls WHERE active = 1")?,
            vacations: count("SELECT COUNT(*) FROM vocations WHERE active = 1")?,
        })
    }
}

impl AttendanceStore for Database {
    type Error = DbError;

    fn find_employee(&self, key: &EmployeeKey) -> Result<Option<Employee>, DbError> {
        Self::find_employee(self, key)
    }

    fn active_employees(
        &self,
        department: Option<i64>,
    ) -> Result<Vec<ListedEmployee<DbError>>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {EMPLOYEE_COLUMNS}
            FROM employees
            WHERE active = 1 AND (?1 IS NULL OR department_id = ?1)
            ORDER BY id ASC
            "
        ))?;
        let rows = stmt.query_map([department], |row| {
            let summary = EmployeeSummary {
                id: row.get(0)?,
                uuid: row.get(1)?,
                handle: row.get(2)?,
                full_name: row.get(3)?,
            };
            Ok((summary, EmployeeRow::from_row(row)))
        })?;

        let mut employees = Vec::new();
        for row in rows {
            let (summary, full) = row?;
            let employee = full
                .map_err(DbError::from)
                .and_then(EmployeeRow::into_employee);
            if let Err(err) = &employee {
                tracing::warn!(employee = summary.id, error = %err, "unreadable employee row");
            }
            employees.push(ListedEmployee { summary, employee });
        }
        Ok(employees)
    }

    fn department_summary(&self, id: i64) -> Result<Option<DepartmentSummary>, DbError> {
        let summary = self
            .conn
            .query_row(
                "
                SELECT d.id, d.name, d.active,
                    (SELECT COUNT(*) FROM employees e WHERE e.department_id = d.id AND e.active = 1)
                FROM departments d
                WHERE d.id = ?
                ",
                [id],
                department_summary_from_row,
            )
            .optional()?;
        Ok(summary)
    }

    fn day_records(&self, employee_id: i64, window: &DayWindow) -> Result<DayRecords, DbError> {
        let records = DayRecords {
            entries: self.entries_between(employee_id, window.start, window.end)?,
            exits: self.exits_between(employee_id, window.start, window.end)?,
            vacations: self.vacations_covering(employee_id, window.date)?,
        };
        tracing::debug!(
            employee = employee_id,
            date = %window.date,
            entries = records.entries.len(),
            exits = records.exits.len(),
            vacations = records.vacations.len(),
            "fetched day records"
        );
        Ok(records)
    }
}

fn department_summary_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DepartmentSummary> {
    Ok(DepartmentSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        active: row.get(2)?,
        employees: row.get(3)?,
    })
}

#[derive(Debug)]
struct EmployeeRow {
    id: i64,
    uuid: String,
    handle: String,
    full_name: String,
    department_id: Option<i64>,
    position: String,
    gender: Option<String>,
    working_time: Option<String>,
    birth_date: Option<String>,
    image: Option<String>,
    country: Option<String>,
    city: Option<String>,
    town: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    active: bool,
    created: String,
}

impl EmployeeRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            uuid: row.get(1)?,
            handle: row.get(2)?,
            full_name: row.get(3)?,
            department_id: row.get(4)?,
            position: row.get(5)?,
            gender: row.get(6)?,
            working_time: row.get(7)?,
            birth_date: row.get(8)?,
            image: row.get(9)?,
            country: row.get(10)?,
            city: row.get(11)?,
            town: row.get(12)?,
            address: row.get(13)?,
            phone: row.get(14)?,
            active: row.get(15)?,
            created: row.get(16)?,
        })
    }

    fn into_employee(self) -> Result<Employee, DbError> {
        const TABLE: &str = "employees";
        let id = self.id;
        let invalid = |source| DbError::InvalidRow {
            table: TABLE,
            id,
            source,
        };
        Ok(Employee {
            id,
            uuid: EmployeeUuid::new(self.uuid).map_err(invalid)?,
            handle: Handle::new(self.handle).map_err(invalid)?,
            full_name: self.full_name,
            department_id: self.department_id,
            position: self.position,
            gender: self
                .gender
                .as_deref()
                .map(str::parse::<Gender>)
                .transpose()
                .map_err(invalid)?,
            working_time: self.working_time,
            birth_date: self
                .birth_date
                .as_deref()
                .map(|value| parse_date(TABLE, id, value))
                .transpose()?,
            image: self.image,
            country: self.country,
            city: self.city,
            town: self.town,
            address: self.address,
            phone: self.phone,
            active: self.active,
            created: parse_timestamp(TABLE, id, &self.created)?,
        })
    }
}

#[derive(Debug)]
struct ControlRow {
    id: i64,
    employee_id: i64,
    area_id: Option<i64>,
    area_name: Option<String>,
    status: String,
    latitude: Option<String>,
    longitude: Option<String>,
    image: Option<String>,
    created: String,
}

impl ControlRow {
    fn into_event<S>(self, table: ControlTable) -> Result<ControlEvent<S>, DbError>
    where
        S: std::str::FromStr<Err = ValidationError>,
    {
        let status = self.status.parse().map_err(|source| DbError::InvalidRow {
            table: table.name(),
            id: self.id,
            source,
        })?;
        Ok(ControlEvent {
            id: self.id,
            employee_id: self.employee_id,
            area_id: self.area_id,
            area_name: self.area_name,
            status,
            latitude: self.latitude,
            longitude: self.longitude,
            image: self.image,
            created: parse_timestamp(table.name(), self.id, &self.created)?,
        })
    }
}

#[derive(Debug)]
struct VacationRow {
    id: i64,
    employee_id: i64,
    kind: String,
    file: Option<String>,
    start: String,
    end: String,
}

impl VacationRow {
    fn into_vacation(self) -> Result<VacationInterval, DbError> {
        Ok(VacationInterval {
            id: self.id,
            employee_id: self.employee_id,
            start: parse_date("vocations", self.id, &self.start)?,
            end: parse_date("vocations", self.id, &self.end)?,
            kind: self.kind,
            file: self.file,
        })
    }
}

fn parse_timestamp(table: &'static str, id: i64, value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimeParse {
            table,
            id,
            value: value.to_string(),
            source,
        })
}

fn parse_date(table: &'static str, id: i64, value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| DbError::TimeParse {
        table,
        id,
        value: value.to_string(),
        source,
    })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use att_core::{
        EntryState, ExitState, FailurePolicy, ResolveOptions, RosterRequest, build_roster,
        resolve_employee,
    };
    use chrono_tz::Asia::Tashkent;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn coordinate(latitude: &str, longitude: &str) -> Coordinate {
        Coordinate {
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
        }
    }

    fn new_employee(handle: &str, department_id: Option<i64>) -> NewEmployee {
        NewEmployee {
            handle: handle.to_string(),
            full_name: format!("Employee {handle}"),
            department_id,
            position: "Engineer".to_string(),
            ..NewEmployee::default()
        }
    }

    fn entry(employee_id: i64, area_id: Option<i64>, status: EntryStatus, created: &str) -> NewEntry {
        NewControlEvent {
            employee_id,
            area_id,
            status,
            latitude: Some("41.3111".to_string()),
            longitude: Some("69.2797".to_string()),
            image: None,
            created: utc(created),
        }
    }

    fn exit(employee_id: i64, status: ExitStatus, created: &str) -> NewExit {
        NewControlEvent {
            employee_id,
            area_id: None,
            status,
            latitude: None,
            longitude: None,
            image: None,
            created: utc(created),
        }
    }

    fn vacation(employee_id: i64, start: NaiveDate, end: NaiveDate) -> NewVacation {
        NewVacation {
            employee_id,
            kind: None,
            file: None,
            start,
            end,
        }
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    fn index_names(conn: &Connection, table: &str) -> HashSet<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA index_list({table})"))
            .expect("prepare index_list");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query index_list");
        rows.map(|row| row.expect("index_list row")).collect()
    }

    /// (referenced table, from column, on delete action)
    fn foreign_keys(conn: &Connection, table: &str) -> Vec<(String, String, String)> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA foreign_key_list({table})"))
            .expect("prepare foreign_key_list");
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .expect("query foreign_key_list");
        let mut keys: Vec<_> = rows.map(|row| row.expect("foreign_key_list row")).collect();
        keys.sort();
        keys
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        assert_eq!(
            table_columns(&db.conn, "access_controls"),
            vec![
                "id",
                "employee_id",
                "area_id",
                "status",
                "latitude",
                "longitude",
                "image",
                "active",
                "created",
                "updated",
            ]
        );
        assert_eq!(
            table_columns(&db.conn, "vocations"),
            vec![
                "id",
                "employee_id",
                "type",
                "file",
                "start_date",
                "end_date",
                "active",
                "created",
                "updated",
            ]
        );
        assert_eq!(
            table_columns(&db.conn, "area_coordinates"),
            vec!["area_id", "coordinate_id", "position"]
        );

        assert!(index_names(&db.conn, "access_controls")
            .contains("idx_access_controls_employee_created"));
        assert!(index_names(&db.conn, "output_controls")
            .contains("idx_output_controls_employee_created"));
        assert!(index_names(&db.conn, "vocations").contains("idx_vocations_employee_range"));

        assert_eq!(
            foreign_keys(&db.conn, "access_controls"),
            vec![
                ("areas".to_string(), "area_id".to_string(), "SET NULL".to_string()),
                ("employees".to_string(), "employee_id".to_string(), "CASCADE".to_string()),
            ]
        );
        assert_eq!(
            foreign_keys(&db.conn, "employees"),
            vec![(
                "departments".to_string(),
                "department_id".to_string(),
                "SET NULL".to_string()
            )]
        );
    }

    #[test]
    fn insert_employee_generates_distinct_uuids() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_employee(&new_employee("AA0000001", None)).unwrap();
        let second = db.insert_employee(&new_employee("AA0000002", None)).unwrap();

        assert_ne!(first.uuid, second.uuid);
        assert!(EmployeeUuid::new(first.uuid.as_str()).is_ok());
        assert!(first.active);
        assert_eq!(first.working_time.as_deref(), Some("1"));
    }

    #[test]
    fn insert_employee_keeps_supplied_uuid_and_rejects_duplicates() {
        let db = Database::open_in_memory().unwrap();
        let mut new = new_employee("AA0000001", None);
        new.uuid = Some("5f0c7a52-2b7e-4d0e-9a53-0b0f0f7d1c11".to_string());
        new.gender = Some(Gender::Female);
        new.birth_date = Some(date(1990, 6, 15));

        let employee = db.insert_employee(&new).unwrap();
        assert_eq!(employee.uuid.as_str(), "5f0c7a52-2b7e-4d0e-9a53-0b0f0f7d1c11");
        assert_eq!(employee.gender, Some(Gender::Female));
        assert_eq!(employee.birth_date, Some(date(1990, 6, 15)));

        let err = db.insert_employee(&new).unwrap_err();
        assert!(matches!(err, DbError::Sqlite(_)));
    }

    #[test]
    fn insert_employee_rejects_malformed_uuid() {
        let db = Database::open_in_memory().unwrap();
        db.insert_employee(&new_employee("AA0000001", None)).unwrap();

        // "1" would otherwise be looked up as employee #1
        let mut new = new_employee("AA0000002", None);
        new.uuid = Some("1".to_string());
        let err = db.insert_employee(&new).unwrap_err();
        assert_eq!(err.to_string(), r#"invalid uuid: "1""#);
        assert_eq!(db.list_employees().unwrap().len(), 1);

        new.uuid = Some(" 5F0C7A52-2B7E-4D0E-9A53-0B0F0F7D1C11 ".to_string());
        let employee = db.insert_employee(&new).unwrap();
        assert_eq!(employee.uuid.as_str(), "5f0c7a52-2b7e-4d0e-9a53-0b0f0f7d1c11");
        let key: EmployeeKey = "5f0c7a52-2b7e-4d0e-9a53-0b0f0f7d1c11".parse().unwrap();
        assert_eq!(db.find_employee(&key).unwrap().map(|e| e.id), Some(employee.id));
    }

    #[test]
    fn insert_employee_rejects_handles_that_read_as_keys() {
        let db = Database::open_in_memory().unwrap();
        let err = db.insert_employee(&new_employee("1234567", None)).unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::AmbiguousHandle { .. })
        ));
    }

    #[test]
    fn find_employee_by_handle_prefers_active_then_lowest_id() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_employee(&new_employee("AA0000001", None)).unwrap();
        let second = db.insert_employee(&new_employee("AA0000001", None)).unwrap();
        let key: EmployeeKey = "AA0000001".parse().unwrap();

        assert_eq!(db.find_employee(&key).unwrap().map(|e| e.id), Some(first.id));
        assert!(db.set_employee_active(&key, false).unwrap());
        assert_eq!(db.find_employee(&key).unwrap().map(|e| e.id), Some(second.id));
        assert!(
            !db.find_employee(&EmployeeKey::Id(first.id))
                .unwrap()
                .unwrap()
                .active
        );
        assert_eq!(
            db.find_employee(&"ZZ9999999".parse().unwrap()).unwrap(),
            None
        );
    }

    #[test]
    fn insert_employee_rejects_blank_fields() {
        let db = Database::open_in_memory().unwrap();
        let mut new = new_employee("  ", None);
        assert!(matches!(
            db.insert_employee(&new),
            Err(DbError::Validation(ValidationError::Empty { field: "handle" }))
        ));

        new.handle = "AA0000001".to_string();
        new.full_name = String::new();
        assert!(matches!(
            db.insert_employee(&new),
            Err(DbError::Validation(ValidationError::Empty { field: "full name" }))
        ));
    }

    #[test]
    fn find_employee_by_id_or_uuid() {
        let db = Database::open_in_memory().unwrap();
        let employee = db.insert_employee(&new_employee("AA0000001", None)).unwrap();

        let by_id = db.find_employee(&EmployeeKey::Id(employee.id)).unwrap();
        let by_uuid = db
            .find_employee(&EmployeeKey::Uuid(employee.uuid.clone()))
            .unwrap();
        assert_eq!(by_id.as_ref(), Some(&employee));
        assert_eq!(by_uuid, Some(employee));
        assert_eq!(db.find_employee(&EmployeeKey::Id(99)).unwrap(), None);
    }

    #[test]
    fn deactivated_employees_leave_rosters_and_counts() {
        let db = Database::open_in_memory().unwrap();
        let dept = db.insert_department("Accounting").unwrap();
        let a = db.insert_employee(&new_employee("AA0000001", Some(dept.id))).unwrap();
        let b = db.insert_employee(&new_employee("AA0000002", Some(dept.id))).unwrap();
        db.insert_employee(&new_employee("AA0000003", None)).unwrap();

        assert_eq!(db.count_active_employees(dept.id).unwrap(), 2);
        assert!(db.set_employee_active(&EmployeeKey::Id(b.id), false).unwrap());
        assert_eq!(db.count_active_employees(dept.id).unwrap(), 1);

        let active: Vec<i64> = db
            .active_employees(Some(dept.id))
            .unwrap()
            .iter()
            .map(|listed| listed.summary.id)
            .collect();
        assert_eq!(active, vec![a.id]);
        assert_eq!(db.active_employees(None).unwrap().len(), 2);
        assert_eq!(db.list_employees().unwrap().len(), 3);
        assert!(!db.set_employee_active(&EmployeeKey::Id(99), false).unwrap());
    }

    #[test]
    fn department_counts_are_live() {
        let db = Database::open_in_memory().unwrap();
        let dept = db.insert_department("Security").unwrap();
        assert_eq!(db.department_summary(dept.id).unwrap().unwrap().employees, 0);

        db.insert_employee(&new_employee("AA0000001", Some(dept.id))).unwrap();
        let listed = db.list_departments().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Security");
        assert_eq!(listed[0].employees, 1);
        assert_eq!(db.department_summary(99).unwrap(), None);
    }

    #[test]
    fn deleting_department_clears_employee_reference() {
        let db = Database::open_in_memory().unwrap();
        let dept = db.insert_department("Security").unwrap();
        let employee = db.insert_employee(&new_employee("AA0000001", Some(dept.id))).unwrap();

        db.conn
            .execute("DELETE FROM departments WHERE id = ?", [dept.id])
            .unwrap();

        let reloaded = db.find_employee(&EmployeeKey::Id(employee.id)).unwrap().unwrap();
        assert_eq!(reloaded.department_id, None);
    }

    #[test]
    fn area_coordinates_keep_insertion_order() {
        let mut db = Database::open_in_memory().unwrap();
        let ring = vec![
            coordinate("41.0", "69.0"),
            coordinate("41.0", "69.5"),
            coordinate("41.5", "69.5"),
            coordinate("41.5", "69.0"),
        ];
        let area = db.insert_area("Main Gate", &ring).unwrap();

        let loaded = db.area(area.id).unwrap().unwrap();
        assert_eq!(loaded.coordinates, ring);
        assert_eq!(db.list_areas().unwrap(), vec![loaded]);
        assert_eq!(db.area(99).unwrap(), None);
    }

    #[test]
    fn insert_area_rejects_bad_coordinates() {
        let mut db = Database::open_in_memory().unwrap();
        let err = db
            .insert_area("Gate", &[coordinate("91", "69.0")])
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::InvalidCoordinate { axis: "latitude", .. })
        ));
        assert!(db.list_areas().unwrap().is_empty());
    }

    #[test]
    fn appended_events_carry_area_name() {
        let mut db = Database::open_in_memory().unwrap();
        let area = db.insert_area("Main Gate", &[]).unwrap();
        let employee = db.insert_employee(&new_employee("AA0000001", None)).unwrap();

        let event = db
            .append_entry(&entry(
                employee.id,
                Some(area.id),
                EntryStatus::Arrived,
                "2024-03-05T03:50:00Z",
            ))
            .unwrap();
        assert_eq!(event.area_name.as_deref(), Some("Main Gate"));
        assert_eq!(event.created, utc("2024-03-05T03:50:00Z"));

        let stored = db
            .entries_between(employee.id, utc("2024-03-05T00:00:00Z"), utc("2024-03-06T00:00:00Z"))
            .unwrap();
        assert_eq!(stored, vec![event]);
    }

    #[test]
    fn day_records_bucket_by_local_day() {
        let db = Database::open_in_memory().unwrap();
        let employee = db.insert_employee(&new_employee("AA0000001", None)).unwrap();
        // 23:30 on the 5th in Tashkent
        db.append_entry(&entry(employee.id, None, EntryStatus::Late, "2024-03-05T18:30:00Z"))
            .unwrap();
        // 00:30 on the 6th in Tashkent
        db.append_exit(&exit(employee.id, ExitStatus::Gone, "2024-03-05T19:30:00Z"))
            .unwrap();

        let fifth = db
            .day_records(employee.id, &DayWindow::new(date(2024, 3, 5), Tashkent))
            .unwrap();
        assert_eq!(fifth.entries.len(), 1);
        assert!(fifth.exits.is_empty());

        let sixth = db
            .day_records(employee.id, &DayWindow::new(date(2024, 3, 6), Tashkent))
            .unwrap();
        assert!(sixth.entries.is_empty());
        assert_eq!(sixth.exits.len(), 1);
    }

    #[test]
    fn window_end_is_exclusive() {
        let db = Database::open_in_memory().unwrap();
        let employee = db.insert_employee(&new_employee("AA0000001", None)).unwrap();
        db.append_entry(&entry(employee.id, None, EntryStatus::Arrived, "2024-03-05T19:00:00Z"))
            .unwrap();

        let window = DayWindow::new(date(2024, 3, 5), Tashkent);
        assert!(db.day_records(employee.id, &window).unwrap().entries.is_empty());
        let next = DayWindow::new(date(2024, 3, 6), Tashkent);
        assert_eq!(db.day_records(employee.id, &next).unwrap().entries.len(), 1);
    }

    #[test]
    fn soft_deleted_records_are_invisible() {
        let db = Database::open_in_memory().unwrap();
        let employee = db.insert_employee(&new_employee("AA0000001", None)).unwrap();
        let event = db
            .append_entry(&entry(employee.id, None, EntryStatus::Arrived, "2024-03-05T04:00:00Z"))
            .unwrap();
        let leave = db
            .insert_vacation(&vacation(employee.id, date(2024, 3, 1), date(2024, 3, 10)))
            .unwrap();

        assert!(db.set_entry_active(event.id, false).unwrap());
        assert!(db.set_vacation_active(leave.id, false).unwrap());
        assert!(!db.set_exit_active(99, false).unwrap());

        let records = db
            .day_records(employee.id, &DayWindow::new(date(2024, 3, 5), Tashkent))
            .unwrap();
        assert_eq!(records, DayRecords::default());
    }

    #[test]
    fn vacations_covering_is_inclusive() {
        let db = Database::open_in_memory().unwrap();
        let employee = db.insert_employee(&new_employee("AA0000001", None)).unwrap();
        let leave = db
            .insert_vacation(&vacation(employee.id, date(2024, 3, 1), date(2024, 3, 10)))
            .unwrap();
        assert_eq!(leave.kind, VacationInterval::DEFAULT_KIND);

        assert_eq!(db.vacations_covering(employee.id, date(2024, 3, 1)).unwrap().len(), 1);
        assert_eq!(db.vacations_covering(employee.id, date(2024, 3, 10)).unwrap().len(), 1);
        assert!(db.vacations_covering(employee.id, date(2024, 3, 11)).unwrap().is_empty());
        assert!(db.vacations_covering(employee.id, date(2024, 2, 29)).unwrap().is_empty());
        assert_eq!(db.list_vacations(employee.id).unwrap(), vec![leave]);
    }

    #[test]
    fn inverted_vacation_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let employee = db.insert_employee(&new_employee("AA0000001", None)).unwrap();

        let err = db
            .insert_vacation(&vacation(employee.id, date(2024, 3, 10), date(2024, 3, 1)))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "vacation ends (2024-03-01) before it starts (2024-03-10)"
        );
        assert_eq!(db.counts().unwrap().vacations, 0);
    }

    #[test]
    fn deleted_area_resolves_as_unknown() {
        let mut db = Database::open_in_memory().unwrap();
        let area = db.insert_area("Main Gate", &[]).unwrap();
        let employee = db.insert_employee(&new_employee("AA0000001", None)).unwrap();
        db.append_entry(&entry(
            employee.id,
            Some(area.id),
            EntryStatus::Arrived,
            "2024-03-05T03:50:00Z",
        ))
        .unwrap();

        db.conn
            .execute("DELETE FROM areas WHERE id = ?", [area.id])
            .unwrap();

        let resolved = resolve_employee(
            &db,
            &EmployeeKey::Id(employee.id),
            date(2024, 3, 5),
            &ResolveOptions::default(),
        )
        .unwrap();
        assert_eq!(resolved.record.entry_status, EntryState::Arrived);
        assert_eq!(resolved.record.entry_area.as_deref(), Some("Noma'lum"));
    }

    #[test]
    fn resolves_late_arrival_end_to_end() {
        let mut db = Database::open_in_memory().unwrap();
        let dept = db.insert_department("Accounting").unwrap();
        let area = db.insert_area("Main Gate", &[]).unwrap();
        let employee = db.insert_employee(&new_employee("AA0000001", Some(dept.id))).unwrap();
        db.append_entry(&entry(
            employee.id,
            Some(area.id),
            EntryStatus::Late,
            "2024-03-05T04:15:00Z",
        ))
        .unwrap();
        db.append_exit(&exit(employee.id, ExitStatus::Gone, "2024-03-05T13:02:00Z"))
            .unwrap();

        let resolved = resolve_employee(
            &db,
            &EmployeeKey::Uuid(employee.uuid.clone()),
            date(2024, 3, 5),
            &ResolveOptions::default(),
        )
        .unwrap();
        assert_eq!(resolved.record.entry_status, EntryState::Late);
        assert_eq!(resolved.record.entry_time, "09:15");
        assert_eq!(resolved.record.entry_area.as_deref(), Some("Main Gate"));
        assert_eq!(resolved.record.exit_status, Some(ExitState::Gone));
        assert_eq!(resolved.record.exit_time.as_deref(), Some("18:02"));
        assert_eq!(resolved.department.unwrap().employees, 1);
    }

    #[test]
    fn roster_over_database_matches_single_resolution() {
        let db = Database::open_in_memory().unwrap();
        let dept = db.insert_department("Accounting").unwrap();
        let a = db.insert_employee(&new_employee("AA0000001", Some(dept.id))).unwrap();
        let b = db.insert_employee(&new_employee("AA0000002", Some(dept.id))).unwrap();
        db.append_entry(&entry(a.id, None, EntryStatus::Arrived, "2024-03-05T03:40:00Z"))
            .unwrap();
        db.insert_vacation(&vacation(b.id, date(2024, 3, 4), date(2024, 3, 6)))
            .unwrap();

        let request = RosterRequest {
            date: date(2024, 3, 5),
            department: Some(dept.id),
            options: ResolveOptions::default(),
            failure_policy: FailurePolicy::Flag,
            workers: 2,
        };
        let rows = build_roster(&db, &request).unwrap();
        assert_eq!(rows.len(), 2);

        for row in &rows {
            let single = resolve_employee(
                &db,
                &EmployeeKey::Id(row.employee.id),
                request.date,
                &request.options,
            )
            .unwrap();
            assert_eq!(row.attendance.as_ref(), Some(&single.record));
            assert_eq!(row.department, single.department);
        }
        let second = rows[1].attendance.as_ref().unwrap();
        assert_eq!(second.entry_status, EntryState::InVocation);
        assert_eq!(second.exit_status, Some(ExitState::InVocation));
    }

    #[test]
    fn counts_track_active_rows() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_department("Accounting").unwrap();
        db.insert_area("Main Gate", &[]).unwrap();
        let employee = db.insert_employee(&new_employee("AA0000001", None)).unwrap();
        db.append_entry(&entry(employee.id, None, EntryStatus::Arrived, "2024-03-05T03:40:00Z"))
            .unwrap();
        db.append_exit(&exit(employee.id, ExitStatus::Failed, "2024-03-05T13:00:00Z"))
            .unwrap();

        assert_eq!(
            db.counts().unwrap(),
            StoreCounts {
                departments: 1,
                areas: 1,
                active_employees: 1,
                entries: 1,
                exits: 1,
                vacations: 0,
            }
        );
    }

    #[test]
    fn file_database_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("att.db");

        let uuid = {
            let db = Database::open(&path).unwrap();
            db.insert_employee(&new_employee("AA0000001", None))
                .unwrap()
                .uuid
        };

        let db = Database::open(&path).unwrap();
        let found = db.find_employee(&EmployeeKey::Uuid(uuid)).unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn unreadable_employee_row_does_not_abort_roster() {
        let db = Database::open_in_memory().unwrap();
        let ok = db.insert_employee(&new_employee("AA0000001", None)).unwrap();
        let broken = db.insert_employee(&new_employee("AA0000002", None)).unwrap();
        db.append_entry(&entry(ok.id, None, EntryStatus::Arrived, "2024-03-05T03:40:00Z"))
            .unwrap();
        db.conn
            .execute("UPDATE employees SET gender = 'other' WHERE id = ?", [broken.id])
            .unwrap();

        let listed = db.active_employees(None).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].employee.is_ok());
        assert!(matches!(
            listed[1].employee,
            Err(DbError::InvalidRow {
                table: "employees",
                ..
            })
        ));

        let mut request = RosterRequest {
            date: date(2024, 3, 5),
            department: None,
            options: ResolveOptions::default(),
            failure_policy: FailurePolicy::Flag,
            workers: 2,
        };
        let rows = build_roster(&db, &request).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].attendance.as_ref().map(|record| record.entry_status),
            Some(EntryState::Arrived)
        );
        assert_eq!(rows[1].employee.handle, "AA0000002");
        assert_eq!(rows[1].attendance, None);
        assert_eq!(
            rows[1].error.as_deref(),
            Some(format!("invalid data in employees row {}", broken.id).as_str())
        );

        request.failure_policy = FailurePolicy::Omit;
        let rows = build_roster(&db, &request).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].employee.id, ok.id);
    }

    #[test]
    fn corrupt_status_surfaces_as_invalid_row() {
        let db = Database::open_in_memory().unwrap();
        let employee = db.insert_employee(&new_employee("AA0000001", None)).unwrap();
        db.conn
            .execute(
                "INSERT INTO output_controls (employee_id, status, created, updated)
                 VALUES (?, 'arrived', '2024-03-05T10:00:00.000Z', '2024-03-05T10:00:00.000Z')",
                [employee.id],
            )
            .unwrap();

        let err = db
            .day_records(employee.id, &DayWindow::new(date(2024, 3, 5), Tashkent))
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::InvalidRow {
                table: "output_controls",
                ..
            }
        ));
    }
}
