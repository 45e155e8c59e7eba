// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Progressive path-traced accumulation: a frame accumulator that restarts on
//! camera motion, per-pixel generator state that survives across frames, and a
//! wgpu backend to drive them.

pub mod app;
pub mod camera;
pub mod constants;
pub mod error;
pub mod gpu;
pub mod io;
pub mod render;
pub mod session;
pub mod shaders;

pub use error::AccumError;
pub use render::accumulator::{AccumulationSettings, FrameAccumulator, ResetDecision};
pub use render::pass::{FrameBackend, FrameInput, FrameOutcome, RayTracePass, ViewKind};
pub use render::random_state::{Capacity, PixelRandomState, RandomStateProvider, SeedSource};
