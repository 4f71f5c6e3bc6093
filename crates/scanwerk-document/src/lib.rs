// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document — Image enhancement for the Scanwerk capture core.
//
// Turns a photographed or uploaded document into a cleaned, size-normalised
// JPEG suitable for storage and OCR: decode (orientation applied), a bounded
// contrast pass, fit-or-fill resampling with edge sharpening, and re-encode.

pub mod image;
pub mod scan;

// Re-export the primary structs so callers can use `scanwerk_document::DocumentEnhancer` etc.
pub use crate::image::processor::ImageProcessor;
pub use crate::scan::enhance::{DocumentEnhancer, EnhancementReport, StageOutcome, StageStatus, enhance};
