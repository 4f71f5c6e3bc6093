// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Holder name recognition.

use std::sync::LazyLock;

use regex::Regex;
use scanwerk_core::types::ExtractedField;

/// Confidence for every name component.
pub const NAME_CONFIDENCE: u8 = 85;

/// A whole line of two or more capitalised words (`John Smith`, `JOHN SMITH`,
/// `Mary-Jane O'Neil`). Digits or punctuation other than `'` and `-` disqualify
/// the line.
static NAME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Za-z'\-]*(?:\s+[A-Z][A-Za-z'\-]*)+$")
        .expect("name line pattern should compile")
});

/// A recognised name split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    pub full_name: ExtractedField,
    pub first_name: ExtractedField,
    pub last_name: ExtractedField,
}

/// Take the first non-empty line that looks like a name.
///
/// The first whitespace-separated token becomes the first name and the
/// remaining tokens, joined by single spaces, the last name. Position is the
/// only tie-breaker: a later, more name-like line never wins.
pub fn extract_name(text: &str) -> Option<NameParts> {
    let line = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| NAME_LINE.is_match(line))?;

    let mut tokens = line.split_whitespace();
    let first = tokens.next()?;
    let last = tokens.collect::<Vec<_>>().join(" ");
    let full = format!("{first} {last}");

    Some(NameParts {
        full_name: ExtractedField::new(full, NAME_CONFIDENCE),
        first_name: ExtractedField::new(first, NAME_CONFIDENCE),
        last_name: ExtractedField::new(last, NAME_CONFIDENCE),
    })
}
