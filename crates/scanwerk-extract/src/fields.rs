// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Field assembly: run every recognizer and merge the results.

use scanwerk_core::types::{DocumentKind, ExtractedFields};
use tracing::{debug, instrument};

use crate::country::extract_country;
use crate::dates::{extract_date_of_birth, extract_dates};
use crate::name::extract_name;
use crate::number::extract_document_number_for;

/// Extract every field the recognizers can find in OCR `text`.
///
/// `hint` names the document type (`passport`, `driver_license`,
/// `drivers_license`, `national_id`, `visa`, `ssn`); unknown hints behave like
/// no hint.
///
/// Dates are assigned by position in the scanned candidate list: the first
/// becomes the issue date and, when there are at least two, the last becomes
/// the expiration date. A labelled `DOB:` is looked up separately and may
/// repeat one of those dates. Recognizers do not cross-check each other.
#[instrument(skip(text), fields(text_len = text.len()))]
pub fn extract_fields(text: &str, hint: Option<&str>) -> ExtractedFields {
    let kind = hint.and_then(DocumentKind::from_hint);
    let mut fields = ExtractedFields::default();

    let dates = extract_dates(text);
    if let Some(first) = dates.first() {
        fields.issue_date = Some(first.to_field());
    }
    if dates.len() >= 2 {
        fields.expiration_date = dates.last().map(|date| date.to_field());
    }
    fields.date_of_birth = extract_date_of_birth(text).map(|date| date.to_field());

    fields.document_number = extract_document_number_for(text, kind);

    if let Some(name) = extract_name(text) {
        fields.full_name = Some(name.full_name);
        fields.first_name = Some(name.first_name);
        fields.last_name = Some(name.last_name);
    }

    fields.nationality = extract_country(text);

    debug!(
        ?kind,
        dates = dates.len(),
        found = fields.len(),
        missing = fields.missing_slots().len(),
        "Field extraction complete"
    );
    fields
}
