// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanwerk capture core.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single extracted value with a 0-100 confidence score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub value: String,
    pub confidence: u8,
}

impl ExtractedField {
    /// Confidence is capped at 100.
    pub fn new(value: impl Into<String>, confidence: u8) -> Self {
        Self {
            value: value.into(),
            confidence: confidence.min(100),
        }
    }
}

/// The fixed set of named slots an extraction can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldSlot {
    DocumentNumber,
    IssueDate,
    ExpirationDate,
    DateOfBirth,
    FullName,
    FirstName,
    LastName,
    Nationality,
}

impl FieldSlot {
    pub const ALL: [FieldSlot; 8] = [
        Self::DocumentNumber,
        Self::IssueDate,
        Self::ExpirationDate,
        Self::DateOfBirth,
        Self::FullName,
        Self::FirstName,
        Self::LastName,
        Self::Nationality,
    ];

    /// Key used in serialized records.
    pub fn key(&self) -> &'static str {
        match self {
            Self::DocumentNumber => "documentNumber",
            Self::IssueDate => "issueDate",
            Self::ExpirationDate => "expirationDate",
            Self::DateOfBirth => "dateOfBirth",
            Self::FullName => "fullName",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Nationality => "nationality",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.key() == key)
    }
}

impl std::fmt::Display for FieldSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Structured candidate fields pulled from OCR text.
///
/// Every slot is optional: an absent slot means the recognizer found nothing
/// it trusted, and the caller should ask the user to fill it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_number: Option<ExtractedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<ExtractedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<ExtractedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<ExtractedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<ExtractedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<ExtractedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<ExtractedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<ExtractedField>,
    /// Open-ended extension keys, flattened next to the fixed slots.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, ExtractedField>,
}

impl ExtractedFields {
    pub fn slot(&self, slot: FieldSlot) -> Option<&ExtractedField> {
        match slot {
            FieldSlot::DocumentNumber => self.document_number.as_ref(),
            FieldSlot::IssueDate => self.issue_date.as_ref(),
            FieldSlot::ExpirationDate => self.expiration_date.as_ref(),
            FieldSlot::DateOfBirth => self.date_of_birth.as_ref(),
            FieldSlot::FullName => self.full_name.as_ref(),
            FieldSlot::FirstName => self.first_name.as_ref(),
            FieldSlot::LastName => self.last_name.as_ref(),
            FieldSlot::Nationality => self.nationality.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: FieldSlot) -> &mut Option<ExtractedField> {
        match slot {
            FieldSlot::DocumentNumber => &mut self.document_number,
            FieldSlot::IssueDate => &mut self.issue_date,
            FieldSlot::ExpirationDate => &mut self.expiration_date,
            FieldSlot::DateOfBirth => &mut self.date_of_birth,
            FieldSlot::FullName => &mut self.full_name,
            FieldSlot::FirstName => &mut self.first_name,
            FieldSlot::LastName => &mut self.last_name,
            FieldSlot::Nationality => &mut self.nationality,
        }
    }

    /// Look up a field by its serialized key, fixed slot or extension.
    pub fn get(&self, key: &str) -> Option<&ExtractedField> {
        match FieldSlot::from_key(key) {
            Some(slot) => self.slot(slot),
            None => self.extensions.get(key),
        }
    }

    /// Store an extension field. Keys that name a fixed slot fill that slot.
    pub fn insert(&mut self, key: impl Into<String>, field: ExtractedField) {
        let key = key.into();
        match FieldSlot::from_key(&key) {
            Some(slot) => *self.slot_mut(slot) = Some(field),
            None => {
                self.extensions.insert(key, field);
            }
        }
    }

    /// Number of populated fields, extensions included.
    pub fn len(&self) -> usize {
        FieldSlot::ALL
            .iter()
            .filter(|slot| self.slot(**slot).is_some())
            .count()
            + self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed slots the user still has to fill in manually.
    pub fn missing_slots(&self) -> Vec<FieldSlot> {
        FieldSlot::ALL
            .into_iter()
            .filter(|slot| self.slot(*slot).is_none())
            .collect()
    }
}

/// A date found while scanning text, already normalized to `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCandidate {
    /// The substring as it appeared in the text.
    pub raw: String,
    /// Canonical ISO date.
    pub iso: String,
    pub confidence: u8,
}

impl DateCandidate {
    pub fn to_field(&self) -> ExtractedField {
        ExtractedField::new(self.iso.clone(), self.confidence)
    }
}

/// Document types with a dedicated document-number pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Passport,
    DriverLicense,
    NationalId,
    Visa,
    /// SSN-style `123-45-6789` numbers.
    Ssn,
}

impl DocumentKind {
    /// Parse a caller-supplied hint. Unknown hints yield `None`.
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim().to_ascii_lowercase().as_str() {
            "passport" => Some(Self::Passport),
            "driver_license" | "drivers_license" => Some(Self::DriverLicense),
            "national_id" => Some(Self::NationalId),
            "visa" => Some(Self::Visa),
            "ssn" => Some(Self::Ssn),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::DriverLicense => "driver_license",
            Self::NationalId => "national_id",
            Self::Visa => "visa",
            Self::Ssn => "ssn",
        }
    }
}
