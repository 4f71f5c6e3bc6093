// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Enhancement errors --
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),

    #[error("resize failed: {0}")]
    Resize(String),

    #[error("sharpening failed: {0}")]
    Sharpen(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("invalid enhancement options: {0}")]
    InvalidOptions(String),

    // -- Host surface --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScanwerkError {
    /// Terminal errors end the enhancement pipeline; everything else can be
    /// recovered by falling back to an earlier stage's raster.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Encode(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;
