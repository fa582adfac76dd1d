//! Status vocabulary for stored events and resolved attendance.
//!
//! Stored statuses ([`EntryStatus`], [`ExitStatus`]) are what producers write
//! into the event tables. Resolved states ([`EntryState`], [`ExitState`]) add
//! the defaults the resolver falls back to when a day has no event.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Generates a string-backed status enum with `Display`, `FromStr` and serde.
macro_rules! define_status {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// String representation for database storage and JSON output.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ValidationError::UnknownStatus {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

define_status!(
    /// Status recorded on an entry event by its producer.
    EntryStatus, "entry status" {
        Arrived => "arrived",
        Late => "late",
        Failed => "failed",
        InVocation => "in_vocation",
    }
);

define_status!(
    /// Status recorded on an exit event by its producer.
    ExitStatus, "exit status" {
        Gone => "gone",
        Failed => "failed",
    }
);

define_status!(
    /// Resolved entry state for one employee on one day.
    EntryState, "entry state" {
        DidNotCome => "did_not_come",
        Arrived => "arrived",
        Late => "late",
        Failed => "failed",
        InVocation => "in_vocation",
    }
);

define_status!(
    /// Resolved exit state for one employee on one day.
    ///
    /// `AtWork` is the steady state when no exit was recorded.
    ExitState, "exit state" {
        AtWork => "at_work",
        Gone => "gone",
        Failed => "failed",
        InVocation => "in_vocation",
    }
);

impl From<EntryStatus> for EntryState {
    fn from(status: EntryStatus) -> Self {
        match status {
            EntryStatus::Arrived => Self::Arrived,
            EntryStatus::Late => Self::Late,
            EntryStatus::Failed => Self::Failed,
            EntryStatus::InVocation => Self::InVocation,
        }
    }
}

impl From<ExitStatus> for ExitState {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Gone => Self::Gone,
            ExitStatus::Failed => Self::Failed,
        }
    }
}
