// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Country / nationality recognition against a fixed name list.

use scanwerk_core::types::ExtractedField;

/// Confidence for a country match.
pub const COUNTRY_CONFIDENCE: u8 = 90;

/// Country names and common abbreviations, upper-case.
///
/// Matching walks this list in order and stops at the first entry found
/// anywhere in the text, so longer names precede names they contain.
pub const COUNTRIES: &[&str] = &[
    "UNITED STATES OF AMERICA",
    "UNITED STATES",
    "USA",
    "CANADA",
    "MEXICO",
    "UNITED KINGDOM",
    "GREAT BRITAIN",
    "IRELAND",
    "FRANCE",
    "GERMANY",
    "DEUTSCHLAND",
    "SPAIN",
    "PORTUGAL",
    "ITALY",
    "NETHERLANDS",
    "BELGIUM",
    "SWITZERLAND",
    "AUSTRIA",
    "SWEDEN",
    "NORWAY",
    "DENMARK",
    "FINLAND",
    "POLAND",
    "GREECE",
    "UKRAINE",
    "RUSSIA",
    "TURKEY",
    "ISRAEL",
    "EGYPT",
    "NIGERIA",
    "KENYA",
    "SOUTH AFRICA",
    "INDIA",
    "PAKISTAN",
    "CHINA",
    "JAPAN",
    "SOUTH KOREA",
    "PHILIPPINES",
    "VIETNAM",
    "THAILAND",
    "INDONESIA",
    "AUSTRALIA",
    "NEW ZEALAND",
    "BRAZIL",
    "ARGENTINA",
    "COLOMBIA",
    "CHILE",
    "PERU",
    "GBR",
    "DEU",
];

/// First entry of [`COUNTRIES`] contained in the upper-cased text.
///
/// List order decides, not position in the text.
pub fn extract_country(text: &str) -> Option<ExtractedField> {
    let upper = text.to_uppercase();
    COUNTRIES
        .iter()
        .find(|country| upper.contains(*country))
        .map(|country| ExtractedField::new(*country, COUNTRY_CONFIDENCE))
}
