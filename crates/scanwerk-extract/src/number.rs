// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document number recognition: a type-specific pattern when the caller knows
// the document type, then generic fallbacks.

use std::sync::LazyLock;

use regex::Regex;
use scanwerk_core::types::{DocumentKind, ExtractedField};
use tracing::debug;

/// Confidence for a match on the hinted document type's own pattern.
pub const TYPED_CONFIDENCE: u8 = 85;
/// Confidence for a match on a generic fallback pattern.
pub const GENERIC_CONFIDENCE: u8 = 70;

static TYPED_PATTERNS: LazyLock<Vec<(DocumentKind, Regex)>> = LazyLock::new(|| {
    let typed = |kind: DocumentKind, pattern: &str| {
        (
            kind,
            Regex::new(pattern).expect("document number pattern should compile"),
        )
    };
    vec![
        // P12345678 / P123456789
        typed(DocumentKind::Passport, r"\bP\d{8,9}\b"),
        // D1234567, AB123456
        typed(DocumentKind::DriverLicense, r"\b[A-Z]{1,2}\d{6,8}\b"),
        // 9-12 digit citizen numbers
        typed(DocumentKind::NationalId, r"\b\d{9,12}\b"),
        // Foil number: one letter, 7-8 digits
        typed(DocumentKind::Visa, r"\b[A-Z]\d{7,8}\b"),
        // 123-45-6789
        typed(DocumentKind::Ssn, r"\b\d{3}-\d{2}-\d{4}\b"),
    ]
});

/// Tried in order when no typed pattern applies or matches.
static GENERIC_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        // Short alphanumeric code: one or two letters then digits.
        Regex::new(r"\b[A-Z]{1,2}\d{6,9}\b").expect("short code pattern should compile"),
        // Long numeric code.
        Regex::new(r"\b\d{8,12}\b").expect("long numeric pattern should compile"),
    ]
});

fn typed_pattern(kind: DocumentKind) -> Option<&'static Regex> {
    TYPED_PATTERNS
        .iter()
        .find(|(candidate, _)| *candidate == kind)
        .map(|(_, pattern)| pattern)
}

/// Find the document number in `text`.
///
/// With a recognised `hint` (`passport`, `driver_license`, …) that type's
/// pattern is tried first at confidence 85. Otherwise, or if it finds nothing,
/// the generic patterns are tried in order at confidence 70. The first match
/// wins; later, possibly better, matches are not considered.
pub fn extract_document_number(text: &str, hint: Option<&str>) -> Option<ExtractedField> {
    let kind = hint.and_then(DocumentKind::from_hint);
    extract_document_number_for(text, kind)
}

/// [`extract_document_number`] with an already-parsed document type.
pub fn extract_document_number_for(
    text: &str,
    kind: Option<DocumentKind>,
) -> Option<ExtractedField> {
    if let Some(pattern) = kind.and_then(typed_pattern) {
        if let Some(found) = pattern.find(text) {
            debug!(kind = ?kind, "Document number matched typed pattern");
            return Some(ExtractedField::new(found.as_str(), TYPED_CONFIDENCE));
        }
    }

    GENERIC_PATTERNS.iter().enumerate().find_map(|(index, pattern)| {
        let found = pattern.find(text)?;
        debug!(pattern = index, "Document number matched generic pattern");
        Some(ExtractedField::new(found.as_str(), GENERIC_CONFIDENCE))
    })
}
