//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The day/month/year triple does not name a calendar date.
    #[error("invalid date: day={day:?} month={month:?} year={year:?}")]
    InvalidDate {
        day: String,
        month: String,
        year: String,
    },

    /// A latitude or longitude could not be parsed or is out of range.
    #[error("invalid {axis}: {value:?}")]
    InvalidCoordinate { axis: &'static str, value: String },

    /// A vacation ends before it starts.
    #[error("vacation ends ({end}) before it starts ({start})")]
    InvertedInterval { start: String, end: String },

    /// A status string is not part of the vocabulary.
    #[error("unknown {kind}: {value}")]
    UnknownStatus { kind: &'static str, value: String },

    /// The value is not a UUID.
    #[error("invalid uuid: {value:?}")]
    InvalidUuid { value: String },

    /// A handle that would be read back as an employee id or uuid.
    #[error("handle {value:?} is indistinguishable from an employee id or uuid")]
    AmbiguousHandle { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal $(, normalize = $normalize:path)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new value after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                $(let id = $normalize(&id)?;)?
                Ok(Self(id))
            }

            /// Returns the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated employee UUID, kept in lowercase hyphenated form.
    ///
    /// Generated when the employee is created and echoed in every attendance row.
    EmployeeUuid, "employee uuid", normalize = canonical_uuid
);

define_string_id!(
    /// A validated employee handle (badge or passport number).
    Handle, "handle"
);

fn canonical_uuid(value: &str) -> Result<String, ValidationError> {
    Uuid::parse_str(value.trim())
        .map(|uuid| uuid.hyphenated().to_string())
        .map_err(|_| ValidationError::InvalidUuid {
            value: value.to_string(),
        })
}

impl EmployeeUuid {
    /// Generates a fresh random uuid.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }
}

/// How a caller refers to an employee.
///
/// Parsed from text: an integer is a database id, a UUID is an employee uuid,
/// anything else is a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeKey {
    Id(i64),
    Uuid(EmployeeUuid),
    /// Handles are not unique; lookups prefer active employees, then the lowest id.
    Handle(Handle),
}

impl FromStr for EmployeeKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i64>() {
            return Ok(Self::Id(id));
        }
        if let Ok(uuid) = EmployeeUuid::new(s) {
            return Ok(Self::Uuid(uuid));
        }
        Handle::new(s).map(Self::Handle)
    }
}

impl Handle {
    /// Validates a handle for a new employee: it must not parse as an id or uuid.
    pub fn unambiguous(value: impl Into<String>) -> Result<Self, ValidationError> {
        let handle = Self::new(value)?;
        match handle.as_str().parse::<EmployeeKey>() {
            Ok(EmployeeKey::Handle(_)) => Ok(handle),
            _ => Err(ValidationError::AmbiguousHandle { value: handle.0 }),
        }
    }
}

impl fmt::Display for EmployeeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Uuid(uuid) => write!(f, "{uuid}"),
            Self::Handle(handle) => write!(f, "handle {handle}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_uuid_rejects_empty_and_malformed() {
        assert!(EmployeeUuid::new("").is_err());
        assert!(EmployeeUuid::new("   ").is_err());
        assert_eq!(
            EmployeeUuid::new("1").unwrap_err(),
            ValidationError::InvalidUuid { value: "1".into() }
        );
        assert!(EmployeeUuid::new("0b6f3c1e").is_err());
    }

    #[test]
    fn employee_uuid_is_canonicalised() {
        let uuid = EmployeeUuid::new(" 5F0C7A522B7E4D0E9A530B0F0F7D1C11 ").unwrap();
        assert_eq!(uuid.as_str(), "5f0c7a52-2b7e-4d0e-9a53-0b0f0f7d1c11");
        assert_eq!(EmployeeUuid::generate().as_str().len(), 36);
    }

    #[test]
    fn display_respects_width() {
        let handle = Handle::new("AA0000001").unwrap();
        assert_eq!(format!("[{handle:<12}]"), "[AA0000001   ]");
        assert_eq!(format!("[{handle:>11}]"), "[  AA0000001]");
    }

    #[test]
    fn handle_serde_rejects_empty() {
        let result: Result<Handle, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());

        let parsed: Handle = serde_json::from_str("\"AA1234567\"").unwrap();
        assert_eq!(parsed.as_str(), "AA1234567");
    }

    #[test]
    fn employee_key_parses_ids_uuids_and_handles() {
        assert_eq!("42".parse::<EmployeeKey>().unwrap(), EmployeeKey::Id(42));
        assert_eq!(" 7 ".parse::<EmployeeKey>().unwrap(), EmployeeKey::Id(7));

        let key: EmployeeKey = "5f0c7a52-2b7e-4d0e-9a53-0b0f0f7d1c11".parse().unwrap();
        assert_eq!(
            key,
            EmployeeKey::Uuid(EmployeeUuid::new("5f0c7a52-2b7e-4d0e-9a53-0b0f0f7d1c11").unwrap())
        );

        assert_eq!(
            "AA0000001".parse::<EmployeeKey>().unwrap(),
            EmployeeKey::Handle(Handle::new("AA0000001").unwrap())
        );
        assert!("".parse::<EmployeeKey>().is_err());
    }

    #[test]
    fn handles_that_look_like_keys_are_rejected() {
        assert!(Handle::unambiguous("AA0000001").is_ok());
        assert_eq!(
            Handle::unambiguous("1234567").unwrap_err(),
            ValidationError::AmbiguousHandle {
                value: "1234567".into()
            }
        );
        assert!(Handle::unambiguous("5f0c7a52-2b7e-4d0e-9a53-0b0f0f7d1c11").is_err());
    }

    #[test]
    fn invalid_date_message_names_components() {
        let err = ValidationError::InvalidDate {
            day: "31".into(),
            month: "2".into(),
            year: "2024".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"invalid date: day="31" month="2" year="2024""#
        );
    }
}
