// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge-only unsharp mask.

use image::RgbaImage;
use scanwerk_core::error::ScanwerkError;
use tracing::{debug, instrument};

/// Parameters for [`unsharp_mask`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnsharpMask {
    /// Multiplier applied to the pixel-minus-blur difference.
    pub amount: f32,
    /// Differences with magnitude at or below this are left alone.
    pub threshold: f32,
}

impl Default for UnsharpMask {
    fn default() -> Self {
        Self {
            amount: 1.2,
            threshold: 5.0,
        }
    }
}

/// Sharpen edges by amplifying each colour channel's difference from its
/// 3x3 box-blur average.
///
/// For every interior pixel and each of R, G and B independently:
/// `diff = original - mean(3x3)`; when `|diff| > threshold` the channel becomes
/// `clamp(0, 255, original + diff * amount)`, otherwise it is kept. The
/// one-pixel border and the alpha channel are copied verbatim, and images
/// narrower or shorter than three pixels come back unchanged.
///
/// Costs nine reads per channel per pixel; callers bound the input area.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn unsharp_mask(image: &RgbaImage, mask: UnsharpMask) -> Result<RgbaImage, ScanwerkError> {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    let src = image.as_raw();

    let expected = w
        .checked_mul(h)
        .and_then(|px| px.checked_mul(4))
        .ok_or_else(|| ScanwerkError::Sharpen(format!("{}x{} overflows", width, height)))?;
    if src.len() != expected {
        return Err(ScanwerkError::Sharpen(format!(
            "buffer holds {} bytes, expected {} for {}x{} RGBA",
            src.len(),
            expected,
            width,
            height
        )));
    }

    let mut out = image.clone();
    if w < 3 || h < 3 {
        return Ok(out);
    }

    let stride = w * 4;
    let dst: &mut [u8] = &mut out;
    let mut touched = 0usize;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let base = y * stride + x * 4;
            for c in 0..3 {
                let mut sum: i32 = 0;
                for dy in [-1isize, 0, 1] {
                    let row = (y as isize + dy) as usize * stride;
                    for dx in [-1isize, 0, 1] {
                        let col = (x as isize + dx) as usize * 4;
                        sum += src[row + col + c] as i32;
                    }
                }
                let original = src[base + c] as f32;
                let diff = original - sum as f32 / 9.0;
                if diff.abs() > mask.threshold {
                    dst[base + c] = (original + diff * mask.amount).round().clamp(0.0, 255.0) as u8;
                    touched += 1;
                }
            }
        }
    }

    debug!(touched, "Unsharp mask applied");
    Ok(out)
}
