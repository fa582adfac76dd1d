//! Geofence membership and the status producers assign to new events.
//!
//! Nothing here is consulted by the resolver; these run upstream, when an
//! entry or exit attempt is recorded.

use chrono::NaiveTime;

use crate::model::{Area, Coordinate};
use crate::status::{EntryStatus, ExitStatus};
use crate::types::ValidationError;

/// A parsed latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Parses decimal-degree text, rejecting values outside the valid range.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            latitude: parse_axis("latitude", latitude, 90.0)?,
            longitude: parse_axis("longitude", longitude, 180.0)?,
        })
    }
}

impl TryFrom<&Coordinate> for GeoPoint {
    type Error = ValidationError;

    fn try_from(c: &Coordinate) -> Result<Self, Self::Error> {
        Self::parse(&c.latitude, &c.longitude)
    }
}

fn parse_axis(axis: &'static str, value: &str, limit: f64) -> Result<f64, ValidationError> {
    let invalid = || ValidationError::InvalidCoordinate {
        axis,
        value: value.to_string(),
    };
    let parsed: f64 = value.trim().parse().map_err(|_| invalid())?;
    if !parsed.is_finite() || parsed.abs() > limit {
        return Err(invalid());
    }
    Ok(parsed)
}

impl Area {
    /// Returns true if `point` lies inside this area's boundary ring.
    pub fn contains(&self, point: GeoPoint) -> Result<bool, ValidationError> {
        let ring = self
            .coordinates
            .iter()
            .map(GeoPoint::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ring_contains(&ring, point))
    }
}

/// Even-odd ray casting. Rings with fewer than three points contain nothing.
pub fn ring_contains(ring: &[GeoPoint], point: GeoPoint) -> bool {
    let Some(&last) = ring.last() else {
        return false;
    };
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut prev = last;
    for &cur in ring {
        if (cur.latitude > point.latitude) != (prev.latitude > point.latitude) {
            let crossing = (prev.longitude - cur.longitude) * (point.latitude - cur.latitude)
                / (prev.latitude - cur.latitude)
                + cur.longitude;
            if point.longitude < crossing {
                inside = !inside;
            }
        }
        prev = cur;
    }
    inside
}

/// Status for a new entry attempt.
///
/// A failed location check wins over everything, then an ongoing vacation,
/// then lateness (strictly after `late_after`, local time).
pub fn classify_entry(
    inside: bool,
    on_vacation: bool,
    local_time: NaiveTime,
    late_after: NaiveTime,
) -> EntryStatus {
    if !inside {
        EntryStatus::Failed
    } else if on_vacation {
        EntryStatus::InVocation
    } else if local_time > late_after {
        EntryStatus::Late
    } else {
        EntryStatus::Arrived
    }
}

/// Status for a new exit attempt.
pub const fn classify_exit(inside: bool) -> ExitStatus {
    if inside {
        ExitStatus::Gone
    } else {
        ExitStatus::Failed
    }
}
