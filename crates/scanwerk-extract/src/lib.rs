// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-extract — Structured field extraction from OCR text.
//
// Independent recognizers (dates, document number, name, country) run over
// the raw text and are merged into one `ExtractedFields` value. Nothing here
// fails: a recognizer that finds nothing leaves its field absent.

pub mod country;
pub mod dates;
pub mod fields;
pub mod name;
pub mod number;

pub use country::extract_country;
pub use dates::{extract_date_of_birth, extract_dates, parse_date};
pub use fields::extract_fields;
pub use name::{NameParts, extract_name};
pub use number::extract_document_number;
