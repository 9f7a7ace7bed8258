//! Core types for the roster pipeline
//!
//! This module defines the unit record produced by the parser and edited
//! in the session, plus the closed status and location sets exposed to
//! the editing surface.

use crate::error::RosterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operational status of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    /// Deployed and available
    #[default]
    InField,
    /// Deployed but engaged
    Busy,
    /// Unavailable
    OutOfService,
}

impl UnitStatus {
    /// All statuses, in the order the editing surface lists them
    pub const ALL: [UnitStatus; 3] = [
        UnitStatus::InField,
        UnitStatus::Busy,
        UnitStatus::OutOfService,
    ];

    /// Arabic label shown to the operator
    pub fn label(self) -> &'static str {
        match self {
            UnitStatus::InField => "في الميدان",
            UnitStatus::Busy => "مشغول",
            UnitStatus::OutOfService => "خارج الخدمة",
        }
    }

    /// Stable key used in JSON (`in_field`, `busy`, `out_of_service`)
    pub fn key(self) -> &'static str {
        match self {
            UnitStatus::InField => "in_field",
            UnitStatus::Busy => "busy",
            UnitStatus::OutOfService => "out_of_service",
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UnitStatus {
    type Err = RosterError;

    /// Accepts either the Arabic label or the snake_case name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        UnitStatus::ALL
            .into_iter()
            .find(|status| status.label() == s || status.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| RosterError::UnknownStatus(s.to_string()))
    }
}

/// District names a unit can be assigned to. The empty string means "none".
pub const LOCATIONS: [&str; 8] = [
    "",
    "الغرب",
    "الشرق",
    "وسط",
    "الجنوب",
    "الشمال",
    "ساندي",
    "بوليتو",
];

/// Display text for the empty location option
pub const NO_LOCATION_LABEL: &str = "-- لا شيء --";

/// Check whether a location belongs to the fixed district set
pub fn is_known_location(location: &str) -> bool {
    LOCATIONS.contains(&location)
}

/// One roster entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitRecord {
    /// Free text name, Arabic and/or Latin, possibly empty
    #[serde(default)]
    pub name: String,
    /// Normalized `LETTERS-DIGITS` code, an unstructured fallback, or empty
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub status: UnitStatus,
    /// One of [`LOCATIONS`]; empty when unassigned
    #[serde(default)]
    pub location: String,
}

impl UnitRecord {
    /// An empty in-field row, as added by the editing surface
    pub fn blank() -> Self {
        Self::default()
    }

    /// True when both name and code are empty or whitespace
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.code.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_round_trip_through_from_str() {
        for status in UnitStatus::ALL {
            assert_eq!(status.label().parse::<UnitStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_accepts_snake_case_names() {
        assert_eq!("busy".parse::<UnitStatus>().unwrap(), UnitStatus::Busy);
        assert_eq!(
            "OUT_OF_SERVICE".parse::<UnitStatus>().unwrap(),
            UnitStatus::OutOfService
        );
        assert!(matches!(
            "parked".parse::<UnitStatus>(),
            Err(RosterError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&UnitStatus::OutOfService).unwrap();
        assert_eq!(json, "\"out_of_service\"");
    }

    #[test]
    fn test_unit_record_defaults_when_fields_missing() {
        let unit: UnitRecord = serde_json::from_str(r#"{"name":"وحدة 3"}"#).unwrap();
        assert_eq!(unit.name, "وحدة 3");
        assert_eq!(unit.code, "");
        assert_eq!(unit.status, UnitStatus::InField);
        assert_eq!(unit.location, "");
    }

    #[test]
    fn test_blank_record() {
        let unit = UnitRecord::blank();
        assert!(unit.is_blank());
        assert_eq!(unit.status, UnitStatus::InField);

        let spaced = UnitRecord {
            name: "  ".to_string(),
            code: " ".to_string(),
            ..UnitRecord::blank()
        };
        assert!(spaced.is_blank());
    }

    #[test]
    fn test_known_locations() {
        assert!(is_known_location(""));
        assert!(is_known_location("الشرق"));
        assert!(!is_known_location("القاهرة"));
    }
}
