// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::constants::{
    DEFAULT_CAMERA_POSITION, DEFAULT_FAR, DEFAULT_FOV, DEFAULT_HEIGHT, DEFAULT_NEAR,
    DEFAULT_OUTPUT_PATH, DEFAULT_SHOT_FRAMES, DEFAULT_WIDTH, SEED_ENV_VAR,
};
use crate::render::accumulator::AccumulationSettings;
use crate::render::pass::ViewKind;
use crate::render::random_state::SeedSource;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LensConfig {
    #[serde(default = "default_fov")]
    pub fov: f32,

    #[serde(default = "default_near")]
    pub near: f32,

    #[serde(default = "default_far")]
    pub far: f32,
}

fn default_fov() -> f32 {
    DEFAULT_FOV
}

fn default_near() -> f32 {
    DEFAULT_NEAR
}

fn default_far() -> f32 {
    DEFAULT_FAR
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
        }
    }
}

/// A run of frames with the camera held at one pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotConfig {
    #[serde(default = "default_position")]
    pub position: [f32; 3],

    /// Pitch, yaw, roll in degrees.
    #[serde(default)]
    pub rotation: [f32; 3],

    #[serde(default = "default_shot_frames")]
    pub frames: u32,

    /// Overrides the session resolution for this shot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    #[serde(default)]
    pub view: ViewKind,
}

fn default_position() -> [f32; 3] {
    DEFAULT_CAMERA_POSITION
}

fn default_shot_frames() -> u32 {
    DEFAULT_SHOT_FRAMES
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            position: default_position(),
            rotation: [0.0; 3],
            frames: default_shot_frames(),
            width: None,
            height: None,
            view: ViewKind::Game,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Fixed generator seed; wall-clock seeded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default)]
    pub accumulation: AccumulationSettings,

    #[serde(default)]
    pub lens: LensConfig,

    #[serde(default = "default_shots")]
    pub shots: Vec<ShotConfig>,

    #[serde(default = "default_output", skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

fn default_shots() -> Vec<ShotConfig> {
    vec![ShotConfig::default()]
}

fn default_output() -> Option<String> {
    Some(DEFAULT_OUTPUT_PATH.to_string())
}

impl Default for Session {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            seed: None,
            accumulation: AccumulationSettings::default(),
            lens: LensConfig::default(),
            shots: default_shots(),
            output: default_output(),
            report: None,
        }
    }
}

/// One scheduled frame of a session.
#[derive(Debug, Clone, Copy)]
pub struct PlannedFrame {
    pub shot: usize,
    pub camera: Camera,
    pub width: u32,
    pub height: u32,
    pub view: ViewKind,
}

impl Session {
    /// Seed from the environment override, then the session file, then the clock.
    pub fn seed_source(&self) -> SeedSource {
        if let Ok(val) = std::env::var(SEED_ENV_VAR) {
            match val.parse::<u64>() {
                Ok(seed) => {
                    log::info!("{SEED_ENV_VAR}={seed}");
                    return SeedSource::Fixed(seed);
                }
                Err(_) => log::warn!("{SEED_ENV_VAR}={val:?} invalid, ignoring"),
            }
        }
        self.seed.map_or(SeedSource::Clock, SeedSource::Fixed)
    }

    pub fn total_frames(&self) -> usize {
        self.shots.iter().map(|s| s.frames as usize).sum()
    }

    pub fn frame_plan(&self) -> impl Iterator<Item = PlannedFrame> + '_ {
        self.shots.iter().enumerate().flat_map(move |(index, shot)| {
            let planned = PlannedFrame {
                shot: index,
                camera: Camera::new(
                    Vec3::from(shot.position),
                    shot.rotation,
                    self.lens.fov,
                    self.lens.near,
                    self.lens.far,
                ),
                width: shot.width.unwrap_or(self.width),
                height: shot.height.unwrap_or(self.height),
                view: shot.view,
            };
            std::iter::repeat_n(planned, shot.frames as usize)
        })
    }
}
