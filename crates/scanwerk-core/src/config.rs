// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Enhancement options and pipeline limits.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanwerkError};

/// Per-call enhancement settings.
///
/// `max_width` x `max_height` is a bounding box, not an absolute size: the
/// output is scaled up or down until it fills the box along its dominant
/// axis, keeping the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnhancementOptions {
    /// Width of the target bounding box in pixels.
    pub max_width: u32,
    /// Height of the target bounding box in pixels.
    pub max_height: u32,
    /// Lossy encode quality in (0, 1].
    pub quality: f32,
    /// Run the contrast/brightness pass on a downsized working copy.
    pub auto_align: bool,
    /// Use high-quality resampling plus unsharp mask instead of a plain resize.
    pub enhance_quality: bool,
}

impl Default for EnhancementOptions {
    /// 8K, best effort.
    fn default() -> Self {
        Self {
            max_width: 7680,
            max_height: 4320,
            quality: 0.95,
            auto_align: true,
            enhance_quality: true,
        }
    }
}

impl EnhancementOptions {
    /// Check that the bounding box is non-empty and quality lies in (0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ScanwerkError::InvalidOptions(format!(
                "bounding box must be non-empty, got {}x{}",
                self.max_width, self.max_height
            )));
        }
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(ScanwerkError::InvalidOptions(format!(
                "quality must be in (0, 1], got {}",
                self.quality
            )));
        }
        Ok(())
    }

    /// Quality mapped onto the 1-100 scale used by JPEG encoders.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// Area and edge limits that keep per-call latency bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineLimits {
    /// Longest edge of the working raster during the auto-align pass.
    pub align_edge_cap: u32,
    /// Sharpening runs only when the resized raster has fewer pixels than this.
    pub sharpen_pixel_ceiling: u64,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            align_edge_cap: 4096,
            sharpen_pixel_ceiling: 10_000_000,
        }
    }
}

/// Host-level settings for driving the capture core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureConfig {
    pub enhancement: EnhancementOptions,
    pub limits: PipelineLimits,
}

impl CaptureConfig {
    /// Load a config from a JSON file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
