// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// GPU / compute
pub const WORKGROUP_SIZE: u32 = 8;

// Accumulation
pub const MAX_ACCUMULATED_FRAMES: u32 = 1000;
pub const RESET_POSITION_EPSILON: f32 = 0.001;
pub const RESET_ANGLE_EPSILON_DEG: f32 = 0.1;

// Accumulation buffer: vec4<f32> = 16 bytes per pixel
pub const ACCUM_BYTES_PER_PIXEL: u64 = 16;

// Random state: four u32 words per pixel
pub const RANDOM_WORDS_PER_PIXEL: usize = 4;

// Camera defaults
pub const DEFAULT_FOV: f32 = 60.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;
pub const DEFAULT_CAMERA_POSITION: [f32; 3] = [0.0, 1.0, -5.0];

// Session defaults
pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 360;
pub const DEFAULT_SHOT_FRAMES: u32 = 64;
pub const DEFAULT_OUTPUT_PATH: &str = "accumulated.png";

// Env overrides
pub const SEED_ENV_VAR: &str = "PROGRESSIVE_TRACER_SEED";
