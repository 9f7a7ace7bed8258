//! Duplicate collapsing for parsed units

use crate::types::UnitRecord;
use std::collections::HashSet;
use tracing::debug;

fn dedup_key(unit: &UnitRecord) -> String {
    format!("{}|{}", unit.code, unit.name).trim().to_string()
}

/// Keep the first unit seen for each (code, name) pair, in original order
pub fn dedup_units(units: Vec<UnitRecord>) -> Vec<UnitRecord> {
    let before = units.len();
    let mut seen = HashSet::new();
    let unique: Vec<UnitRecord> = units
        .into_iter()
        .filter(|unit| seen.insert(dedup_key(unit)))
        .collect();

    if unique.len() < before {
        debug!(dropped = before - unique.len(), "collapsed duplicate units");
    }
    unique
}
