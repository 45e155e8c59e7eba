// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

/// Failures of the accumulation core. None of these cross into the frame loop:
/// the pass turns them into a skipped or degraded frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccumError {
    /// Requested output has a zero dimension or does not fit on the device.
    #[error("Invalid output resolution {width}x{height}")]
    Configuration { width: u32, height: u32 },

    /// A buffer would exceed what the device can bind in one storage binding.
    #[error("Buffer of {bytes} bytes exceeds device limit of {limit} bytes")]
    DeviceLimit { bytes: u64, limit: u64 },

    /// The sampling program could not be loaded or compiled.
    #[error("Missing ray-trace resource: {0}")]
    MissingResource(String),
}
