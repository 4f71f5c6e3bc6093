// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable messages for the capture UI.
//
// Every technical error is mapped to plain English with a clear suggestion.
// A failed capture step must never read like a dead end: missing fields are
// presented as "please fill this in", not as failures.

use crate::error::ScanwerkError;
use crate::types::FieldSlot;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something went wrong but trying again may help.
    Transient,
    /// User must do something (retake the photo, type a value in).
    ActionRequired,
    /// Cannot be fixed by retrying — wrong format, broken file.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the caller may simply try again.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `ScanwerkError` into a `HumanError` the person holding the
/// camera can act on.
pub fn humanize_error(err: &ScanwerkError) -> HumanError {
    match err {
        // -- Enhancement --
        ScanwerkError::Decode(_) => HumanError {
            message: "We couldn't read this picture.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try taking the photo again, or save it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::UnsupportedPixelFormat(_)
        | ScanwerkError::Resize(_)
        | ScanwerkError::Sharpen(_) => HumanError {
            message: "We couldn't clean up this picture.".into(),
            suggestion: "The document was kept as it is. If the text is hard to read, try taking the photo again in better light.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::Encode(_) => HumanError {
            message: "We couldn't save the cleaned-up picture.".into(),
            suggestion: "The original photo was kept instead. Try again, or lower the image quality setting.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::InvalidOptions(detail) => HumanError {
            message: "The image settings don't look right.".into(),
            suggestion: format!("Check the size and quality settings, then try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Host surface --
        ScanwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "We don't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or try copying the file to a different location first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScanwerkError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check that the settings file is valid JSON, or remove it to use the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

/// Prompt shown next to a field the extractor left empty.
pub fn missing_field_prompt(slot: FieldSlot) -> HumanError {
    let label = match slot {
        FieldSlot::DocumentNumber => "document number",
        FieldSlot::IssueDate => "issue date",
        FieldSlot::ExpirationDate => "expiration date",
        FieldSlot::DateOfBirth => "date of birth",
        FieldSlot::FullName => "full name",
        FieldSlot::FirstName => "first name",
        FieldSlot::LastName => "last name",
        FieldSlot::Nationality => "nationality",
    };
    HumanError {
        message: format!("We couldn't find the {label}."),
        suggestion: format!("Please type the {label} in yourself."),
        retriable: false,
        severity: Severity::ActionRequired,
    }
}
