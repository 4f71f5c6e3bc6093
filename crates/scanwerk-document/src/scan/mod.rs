// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture pipeline — staged enhancement and the unsharp-mask filter.

pub mod enhance;
pub mod sharpen;

pub use enhance::{DocumentEnhancer, enhance};
pub use sharpen::{UnsharpMask, unsharp_mask};
