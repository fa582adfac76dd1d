//! Calendar-day handling: parsing caller input and bucketing instants by local day.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::types::ValidationError;

/// Display format for vacation bounds.
pub const DAY_FORMAT: &str = "%d-%m-%Y";

/// Parses a calendar date from separate day, month and year components.
///
/// Surrounding whitespace is ignored. Anything that is not a real calendar
/// date (including `31-02-2024`) is rejected.
pub fn parse_date(day: &str, month: &str, year: &str) -> Result<NaiveDate, ValidationError> {
    let invalid = || ValidationError::InvalidDate {
        day: day.to_string(),
        month: month.to_string(),
        year: year.to_string(),
    };

    let d: u32 = day.trim().parse().map_err(|_| invalid())?;
    let m: u32 = month.trim().parse().map_err(|_| invalid())?;
    let y: i32 = year.trim().parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid)
}

/// Today's date as seen in `tz`.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Formats a date as `DD-MM-YYYY`.
pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// The UTC instants making up one local calendar day, as a half-open interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Computes the window for `date` in timezone `tz`.
    pub fn new(date: NaiveDate, tz: Tz) -> Self {
        let start = local_midnight_to_utc(date, tz);
        let end = date
            .succ_opt()
            .map_or(start, |next| local_midnight_to_utc(next, tz));
        Self { date, start, end }
    }

    /// Returns true if `instant` falls on this local day.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
fn local_midnight_to_utc(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // Spring-forward gap at midnight: 1am local exists
            let one_am = midnight + Duration::hours(1);
            tz.from_local_datetime(&one_am).earliest().map_or_else(
                || Utc.from_utc_datetime(&midnight),
                |dt| dt.with_timezone(&Utc),
            )
        }
    }
}
