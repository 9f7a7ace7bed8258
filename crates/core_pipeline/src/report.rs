//! Handover report rendering
//!
//! Produces the fixed bilingual operations handover text from the recipient,
//! the deputy and a snapshot of the unit list. The recipient is counted in
//! the field total but never listed as a row.

use crate::error::RosterError;
use crate::types::{UnitRecord, UnitStatus};
use tracing::debug;

const HEADER: &str = "📌 استلام العمليات 📌";
const RECIPIENT_LABEL: &str = "المستلم : ";
const DEPUTY_LABEL: &str = "النائب : ";
const FIELD_LABEL: &str = "عدد و اسماء الوحدات الاسعافيه في الميدان :";
const OUT_OF_SERVICE_LABEL: &str = "خارج الخدمة : ";
const FOOTER: &str = "🎙️ تم استلام العمليات و جاهزون للتعامل مع البلاغات";
const NOTES: &str = "الملاحظات : تحديث";

/// Name component of a "Name | Code" field
fn name_part(person: &str) -> &str {
    person.split('|').next().unwrap_or_default().trim()
}

fn field_row(unit: &UnitRecord) -> String {
    let name = unit.name.trim();
    let code = unit.code.trim();
    let base = match (name.is_empty(), code.is_empty()) {
        (false, false) => format!("{} | {}", name, code),
        (false, true) => name.to_string(),
        (true, false) => code.to_string(),
        (true, true) => String::new(),
    };

    let mut annotations = Vec::new();
    if unit.status == UnitStatus::Busy {
        annotations.push(UnitStatus::Busy.label());
    }
    if !unit.location.is_empty() {
        annotations.push(unit.location.as_str());
    }

    if annotations.is_empty() {
        return base;
    }
    let annotated = format!("({})", annotations.join(") - ("));
    if base.is_empty() {
        annotated
    } else {
        format!("{} {}", base, annotated)
    }
}

fn out_of_service_row(unit: &UnitRecord) -> String {
    let mut row = unit.name.clone();
    if !unit.code.is_empty() {
        row.push_str(" | ");
        row.push_str(&unit.code);
    }
    if !unit.location.is_empty() {
        row.push_str(&format!(" ({})", unit.location));
    }
    row
}

fn push_rows(out: &mut String, rows: &[String]) {
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
}

/// Render the handover report
///
/// # Errors
/// * `RosterError::Validation` if the recipient or deputy is blank
pub fn render_report(
    recipient: &str,
    deputy: &str,
    units: &[UnitRecord],
) -> Result<String, RosterError> {
    if recipient.trim().is_empty() {
        return Err(RosterError::Validation { field: "recipient" });
    }
    if deputy.trim().is_empty() {
        return Err(RosterError::Validation { field: "deputy" });
    }

    let recipient_name = name_part(recipient);
    let (out_of_service, field): (Vec<&UnitRecord>, Vec<&UnitRecord>) = units
        .iter()
        .filter(|unit| !unit.is_blank())
        .filter(|unit| unit.name.trim() != recipient_name)
        .partition(|unit| unit.status == UnitStatus::OutOfService);

    let field_rows: Vec<String> = field.iter().map(|unit| field_row(unit)).collect();
    let out_rows: Vec<String> = out_of_service
        .iter()
        .map(|unit| out_of_service_row(unit))
        .collect();

    debug!(
        field = field_rows.len(),
        out_of_service = out_rows.len(),
        "rendering report"
    );

    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\n\n");
    out.push_str(&format!("{}{}\n\n", RECIPIENT_LABEL, recipient));
    out.push_str(&format!("{}{}\n\n", DEPUTY_LABEL, deputy));
    out.push_str(&format!("{}{{{}}}\n", FIELD_LABEL, field_rows.len() + 1));
    push_rows(&mut out, &field_rows);
    out.push('\n');
    out.push_str(&format!("{}({})\n", OUT_OF_SERVICE_LABEL, out_rows.len()));
    push_rows(&mut out, &out_rows);
    out.push('\n');
    out.push_str(FOOTER);
    out.push_str("\n\n");
    out.push_str(NOTES);
    Ok(out)
}
