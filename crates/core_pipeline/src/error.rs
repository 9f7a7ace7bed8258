//! Error types for the roster pipeline

use thiserror::Error;

/// Errors raised by report rendering and session editing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    /// Recipient or deputy missing at render time
    #[error("{field} is required (name + code)")]
    Validation { field: &'static str },

    #[error("unit index {index} out of range (list has {len} units)")]
    UnitIndex { index: usize, len: usize },

    #[error("unknown location: {0}")]
    UnknownLocation(String),

    #[error("unknown status: {0}")]
    UnknownStatus(String),
}

impl RosterError {
    /// Arabic notice shown to the operator, when the error has one
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            RosterError::Validation { .. } => Some("الرجاء كتابة المستلم والنائب (الاسم + الكود)"),
            _ => None,
        }
    }
}
