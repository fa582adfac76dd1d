//! Attendance status resolution.
//!
//! Reduces one employee's records for one calendar day into an
//! [`AttendanceRecord`].
//!
//! # Rules
//!
//! 1. The latest entry event of the day (by creation instant, then id) supplies
//!    the entry status, time and area.
//! 2. Without an entry event, an overlapping vacation yields `in_vocation`.
//! 3. Otherwise the employee `did_not_come`. The compact variant marks Mondays
//!    with `"x"` instead of the empty time.
//! 4. Exit resolves the same way, defaulting to `at_work`.
//! 5. Every overlapping vacation is listed regardless of the above.
//!
//! Resolution never fails: missing data degrades to the defaults above.

use chrono::{Datelike, NaiveDate, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::date::{DayWindow, format_day};
use crate::model::{ControlEvent, EntryEvent, ExitEvent, VacationInterval};
use crate::status::{EntryState, ExitState};

/// Time shown when no event was recorded.
pub const NO_TIME: &str = "-:-";

/// Weekly-off marker shown by the compact variant on Mondays without an entry.
pub const WEEKLY_OFF: &str = "x";

/// Area shown when an event has no linked area, or there is no event.
pub const UNKNOWN_AREA: &str = "Noma'lum";

const TIME_FORMAT: &str = "%H:%M";

/// Shape of the resolved record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Entry, area, exit and vacation fields.
    #[default]
    Full,
    /// Entry time and vacations only, with the Monday weekly-off marker.
    Compact,
}

impl Variant {
    /// Whether area, exit and department fields are part of the output.
    pub const fn includes_location(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Context for a resolution that would otherwise be ambient request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Timezone used for day bucketing and displayed times.
    pub timezone: Tz,
    pub variant: Variant,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Tashkent,
            variant: Variant::Full,
        }
    }
}

/// Records fetched for one employee and one day, in no particular order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayRecords {
    pub entries: Vec<EntryEvent>,
    pub exits: Vec<ExitEvent>,
    pub vacations: Vec<VacationInterval>,
}

/// A vacation as displayed next to a resolved day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationView {
    #[serde(rename = "type")]
    pub kind: String,
    /// `DD-MM-YYYY`
    pub start: String,
    /// `DD-MM-YYYY`
    pub end: String,
}

impl From<&VacationInterval> for VacationView {
    fn from(v: &VacationInterval) -> Self {
        Self {
            kind: v.kind.clone(),
            start: format_day(v.start),
            end: format_day(v.end),
        }
    }
}

/// Resolved attendance of one employee on one day.
///
/// Area and exit fields are `None` only for [`Variant::Compact`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(rename = "attendance_access")]
    pub entry_status: EntryState,
    #[serde(rename = "attendance_access_time")]
    pub entry_time: String,
    #[serde(
        rename = "attendance_access_area",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub entry_area: Option<String>,
    #[serde(
        rename = "attendance_output",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub exit_status: Option<ExitState>,
    #[serde(
        rename = "attendance_output_time",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub exit_time: Option<String>,
    #[serde(rename = "vocation", default, skip_serializing_if = "Option::is_none")]
    pub vocations: Option<Vec<VacationView>>,
}

/// Resolves the attendance of one employee on `date`.
///
/// Records outside `date` (in `options.timezone`) are ignored, so passing a
/// superset of the day's records is harmless.
pub fn resolve(records: &DayRecords, date: NaiveDate, options: &ResolveOptions) -> AttendanceRecord {
    let tz = options.timezone;
    let window = DayWindow::new(date, tz);

    let mut vacations: Vec<&VacationInterval> = records
        .vacations
        .iter()
        .filter(|v| v.covers(date))
        .collect();
    vacations.sort_by_key(|v| (v.start, v.id));
    let on_vacation = !vacations.is_empty();

    let entry = latest(&records.entries, &window);
    let (entry_status, entry_time, entry_area) = match entry {
        Some(event) => (
            EntryState::from(event.status),
            format_time(event, tz),
            event.area_name.clone(),
        ),
        None if on_vacation => (EntryState::InVocation, NO_TIME.to_string(), None),
        None => {
            let time = if options.variant == Variant::Compact && date.weekday() == Weekday::Mon {
                WEEKLY_OFF
            } else {
                NO_TIME
            };
            (EntryState::DidNotCome, time.to_string(), None)
        }
    };

    let (exit_status, exit_time) = match latest(&records.exits, &window) {
        Some(event) => (ExitState::from(event.status), format_time(event, tz)),
        None if on_vacation => (ExitState::InVocation, NO_TIME.to_string()),
        None => (ExitState::AtWork, NO_TIME.to_string()),
    };

    let vocations =
        on_vacation.then(|| vacations.into_iter().map(VacationView::from).collect());

    if options.variant.includes_location() {
        AttendanceRecord {
            entry_status,
            entry_time,
            entry_area: Some(entry_area.unwrap_or_else(|| UNKNOWN_AREA.to_string())),
            exit_status: Some(exit_status),
            exit_time: Some(exit_time),
            vocations,
        }
    } else {
        AttendanceRecord {
            entry_status,
            entry_time,
            entry_area: None,
            exit_status: None,
            exit_time: None,
            vocations,
        }
    }
}

fn latest<'a, S>(events: &'a [ControlEvent<S>], window: &DayWindow) -> Option<&'a ControlEvent<S>> {
    events
        .iter()
        .filter(|event| window.contains(event.created))
        .max_by_key(|event| event.order_key())
}

fn format_time<S>(event: &ControlEvent<S>, tz: Tz) -> String {
    event.created.with_timezone(&tz).format(TIME_FORMAT).to_string()
}
