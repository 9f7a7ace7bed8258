//! In-memory handover session
//!
//! Holds the recipient, deputy and the editable unit list for one operator.
//! The session is owned by whoever drives it (the CLI or the server state);
//! nothing here is global.

use crate::error::RosterError;
use crate::ocr::{OcrEngine, LANGUAGE_HINT};
use crate::pipeline::extract_units;
use crate::report::render_report;
use crate::types::{is_known_location, UnitRecord, UnitStatus};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Result of feeding an image or transcript into the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "count", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    /// At least one unit was extracted
    Extracted(usize),
    /// Extraction ran but produced no usable units
    Empty,
    /// The OCR engine failed; the unit list was left untouched
    Failed,
}

impl ExtractionOutcome {
    /// Arabic notice shown to the operator
    pub fn notice(self) -> &'static str {
        match self {
            ExtractionOutcome::Extracted(_) => "تم استخراج القائمة",
            ExtractionOutcome::Empty => "لم يُستخرج أي عناصر",
            ExtractionOutcome::Failed => {
                "تعذّر استخراج النص — جرّب صورة أوضح أو عدّل القائمة يدوياً."
            }
        }
    }

    fn from_count(count: usize) -> Self {
        if count == 0 {
            ExtractionOutcome::Empty
        } else {
            ExtractionOutcome::Extracted(count)
        }
    }
}

/// Editable handover state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// "Name | Code" of the person taking over
    pub recipient: String,
    /// "Name | Code" of the deputy
    pub deputy: String,
    units: Vec<UnitRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn units(&self) -> &[UnitRecord] {
        &self.units
    }

    /// Replace the unit list with units parsed from a transcript
    pub fn load_transcript(&mut self, raw_text: &str) -> ExtractionOutcome {
        self.units = extract_units(raw_text);
        ExtractionOutcome::from_count(self.units.len())
    }

    /// Run OCR on an image and replace the unit list with the result
    ///
    /// An OCR failure is logged and reported as [`ExtractionOutcome::Failed`]
    /// without touching the current list.
    pub async fn ingest_image(
        &mut self,
        engine: &dyn OcrEngine,
        image: &[u8],
    ) -> ExtractionOutcome {
        let recognized = engine.recognize(image, LANGUAGE_HINT).await;
        self.apply_recognition(recognized)
    }

    /// Apply the result of an OCR call made elsewhere
    ///
    /// Recognized text replaces the unit list; an error leaves it untouched.
    pub fn apply_recognition(&mut self, recognized: anyhow::Result<String>) -> ExtractionOutcome {
        match recognized {
            Ok(text) => {
                let outcome = self.load_transcript(&text);
                info!(?outcome, "image ingested");
                outcome
            }
            Err(e) => {
                warn!(error = %e, "text extraction failed");
                ExtractionOutcome::Failed
            }
        }
    }

    /// Append a blank in-field unit, returning its index
    pub fn add_unit(&mut self) -> usize {
        self.units.push(UnitRecord::blank());
        self.units.len() - 1
    }

    pub fn remove_unit(&mut self, index: usize) -> Result<UnitRecord, RosterError> {
        self.check_index(index)?;
        Ok(self.units.remove(index))
    }

    /// Replace a unit wholesale, validating its location
    pub fn replace_unit(&mut self, index: usize, unit: UnitRecord) -> Result<(), RosterError> {
        self.check_index(index)?;
        if !is_known_location(&unit.location) {
            return Err(RosterError::UnknownLocation(unit.location));
        }
        self.units[index] = unit;
        Ok(())
    }

    pub fn set_name(&mut self, index: usize, name: &str) -> Result<(), RosterError> {
        self.unit_mut(index)?.name = name.to_string();
        Ok(())
    }

    /// Set a unit code as typed; manual edits are not normalized
    pub fn set_code(&mut self, index: usize, code: &str) -> Result<(), RosterError> {
        self.unit_mut(index)?.code = code.to_string();
        Ok(())
    }

    pub fn set_status(&mut self, index: usize, status: UnitStatus) -> Result<(), RosterError> {
        self.unit_mut(index)?.status = status;
        Ok(())
    }

    pub fn set_location(&mut self, index: usize, location: &str) -> Result<(), RosterError> {
        if !is_known_location(location) {
            return Err(RosterError::UnknownLocation(location.to_string()));
        }
        self.unit_mut(index)?.location = location.to_string();
        Ok(())
    }

    /// Render the handover report from the current state
    pub fn render(&self) -> Result<String, RosterError> {
        render_report(&self.recipient, &self.deputy, &self.units)
    }

    fn check_index(&self, index: usize) -> Result<(), RosterError> {
        if index < self.units.len() {
            Ok(())
        } else {
            Err(RosterError::UnitIndex {
                index,
                len: self.units.len(),
            })
        }
    }

    fn unit_mut(&mut self, index: usize) -> Result<&mut UnitRecord, RosterError> {
        let len = self.units.len();
        self.units
            .get_mut(index)
            .ok_or(RosterError::UnitIndex { index, len })
    }
}
