// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Date scanning and normalisation to `YYYY-MM-DD`.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};
use scanwerk_core::types::DateCandidate;
use tracing::{debug, instrument};

/// Confidence assigned to every recognised date.
pub const DATE_CONFIDENCE: u8 = 90;

// ============================================================================
// Patterns
// ============================================================================

/// `MM/DD/YYYY` or `MM-DD-YYYY`, one- or two-digit month and day.
///
/// Always read month-first: day-first locales are not told apart. Separator
/// groups are captured so mixed forms like `03/15-2025` can be rejected.
static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})([/-])(\d{1,2})([/-])(\d{4})\b")
        .expect("month/day/year pattern should compile")
});

/// `YYYY-MM-DD` or `YYYY/MM/DD`.
static YEAR_MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})([/-])(\d{2})([/-])(\d{2})\b")
        .expect("ISO date pattern should compile")
});

/// `15 Mar 2025`, `3 march 2025`, `15 MAR. 2025`.
static DAY_MONTH_NAME_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s+([a-z]{3})[a-z]*\.?\s+(\d{4})\b")
        .expect("day/month-name/year pattern should compile")
});

/// `DOB: …` or `Date of Birth: …`, capturing the rest of the line.
static DATE_OF_BIRTH_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:DOB|Date\s+of\s+Birth)\s*:\s*([^\r\n]+)")
        .expect("date of birth label pattern should compile")
});

const MONTHS: [(&str, u32); 12] = [
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

fn month_from_prefix(prefix: &str) -> Option<u32> {
    let prefix = prefix.to_ascii_lowercase();
    MONTHS
        .iter()
        .find(|(name, _)| *name == prefix)
        .map(|(_, number)| *number)
}

// ============================================================================
// Scanning
// ============================================================================

/// Which capture group holds year, month, day and the two separators for a
/// numeric pattern.
struct NumericLayout {
    year: usize,
    month: usize,
    day: usize,
    separators: (usize, usize),
}

const MDY: NumericLayout = NumericLayout {
    year: 5,
    month: 1,
    day: 3,
    separators: (2, 4),
};
const YMD: NumericLayout = NumericLayout {
    year: 1,
    month: 3,
    day: 5,
    separators: (2, 4),
};

fn numeric_group(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

/// Canonical `YYYY-MM-DD`, or `None` for impossible calendar dates.
fn canonical(year: u32, month: u32, day: u32) -> Option<String> {
    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?;
    Some(date.format("%Y-%m-%d").to_string())
}

fn candidate(caps: &Captures<'_>, iso: Option<String>) -> Option<DateCandidate> {
    Some(DateCandidate {
        raw: caps.get(0)?.as_str().to_string(),
        iso: iso?,
        confidence: DATE_CONFIDENCE,
    })
}

fn scan_numeric<'a>(
    pattern: &'a Regex,
    layout: &'a NumericLayout,
    text: &'a str,
) -> impl Iterator<Item = DateCandidate> + 'a {
    pattern.captures_iter(text).filter_map(move |caps| {
        let (first, second) = layout.separators;
        if caps.get(first)?.as_str() != caps.get(second)?.as_str() {
            return None;
        }
        let iso = canonical(
            numeric_group(&caps, layout.year)?,
            numeric_group(&caps, layout.month)?,
            numeric_group(&caps, layout.day)?,
        );
        candidate(&caps, iso)
    })
}

fn scan_month_names(text: &str) -> impl Iterator<Item = DateCandidate> + '_ {
    DAY_MONTH_NAME_YEAR.captures_iter(text).filter_map(|caps| {
        let iso = canonical(
            numeric_group(&caps, 3)?,
            month_from_prefix(caps.get(2)?.as_str())?,
            numeric_group(&caps, 1)?,
        );
        candidate(&caps, iso)
    })
}

/// Every recognisable date in `text`.
///
/// Candidates are grouped by pattern class (month/day/year, then ISO, then
/// day month-name year), each class in text order. Impossible dates such as
/// `13/45/2020` are dropped rather than corrected.
#[instrument(skip(text), fields(text_len = text.len()))]
pub fn extract_dates(text: &str) -> Vec<DateCandidate> {
    let dates: Vec<DateCandidate> = scan_numeric(&MONTH_DAY_YEAR, &MDY, text)
        .chain(scan_numeric(&YEAR_MONTH_DAY, &YMD, text))
        .chain(scan_month_names(text))
        .collect();
    debug!(count = dates.len(), "Dates scanned");
    dates
}

/// Normalise a single date string to `YYYY-MM-DD`.
///
/// Returns the first date [`extract_dates`] finds in `input`.
pub fn parse_date(input: &str) -> Option<String> {
    extract_dates(input).into_iter().next().map(|date| date.iso)
}

/// Date directly following an explicit `DOB:` or `Date of Birth:` label.
///
/// Only a date that starts right after the label counts; a label whose value
/// does not parse (`DOB: n/a`) yields nothing even if other dates follow on
/// the same line.
pub fn extract_date_of_birth(text: &str) -> Option<DateCandidate> {
    DATE_OF_BIRTH_LABEL.captures_iter(text).find_map(|caps| {
        let rest = caps.get(1)?.as_str().trim_start();
        extract_dates(rest)
            .into_iter()
            .find(|date| rest.starts_with(date.raw.as_str()))
    })
}
