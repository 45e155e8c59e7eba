// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::camera::CameraPose;
use crate::constants::{MAX_ACCUMULATED_FRAMES, RESET_ANGLE_EPSILON_DEG, RESET_POSITION_EPSILON};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccumulationSettings {
    #[serde(default = "default_max_frames")]
    pub max_frames: u32,

    #[serde(default = "default_position_epsilon")]
    pub position_epsilon: f32,

    #[serde(default = "default_angle_epsilon")]
    pub angle_epsilon_degrees: f32,
}

fn default_max_frames() -> u32 {
    MAX_ACCUMULATED_FRAMES
}

fn default_position_epsilon() -> f32 {
    RESET_POSITION_EPSILON
}

fn default_angle_epsilon() -> f32 {
    RESET_ANGLE_EPSILON_DEG
}

impl Default for AccumulationSettings {
    fn default() -> Self {
        Self {
            max_frames: default_max_frames(),
            position_epsilon: default_position_epsilon(),
            angle_epsilon_degrees: default_angle_epsilon(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetDecision {
    Continue,
    /// Accumulated radiance is stale; the image must be cleared before the next dispatch.
    Reset,
}

/// Tracks how many frames have been blended into the accumulation image and
/// restarts the series whenever the camera moves.
pub struct FrameAccumulator {
    settings: AccumulationSettings,
    frame_index: u32,
    last_pose: Option<CameraPose>,
    series_start: Instant,
}

impl FrameAccumulator {
    pub fn new(settings: AccumulationSettings) -> Self {
        Self {
            settings,
            frame_index: 0,
            last_pose: None,
            series_start: Instant::now(),
        }
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    pub fn last_pose(&self) -> Option<CameraPose> {
        self.last_pose
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.series_start.elapsed().as_secs_f32()
    }

    /// Restart the series from frame 0.
    pub fn reset(&mut self) {
        self.frame_index = 0;
        self.series_start = Instant::now();
    }

    /// Compare `pose` against the previous frame's pose and restart if it moved
    /// past either threshold. The first evaluation always resets so the image
    /// starts from black. The stored pose is updated in every case.
    pub fn evaluate_camera(&mut self, pose: CameraPose) -> ResetDecision {
        let decision = match self.last_pose {
            None => ResetDecision::Reset,
            Some(last) => {
                let moved = last.distance_to(&pose) > self.settings.position_epsilon;
                let turned = last.angle_to_degrees(&pose) > self.settings.angle_epsilon_degrees;
                if moved || turned {
                    ResetDecision::Reset
                } else {
                    ResetDecision::Continue
                }
            }
        };

        if decision == ResetDecision::Reset {
            log::debug!(
                "[accum] camera moved, restarting at frame 0 (was {})",
                self.frame_index
            );
            self.reset();
        }
        self.last_pose = Some(pose);
        decision
    }

    pub fn should_dispatch(&self) -> bool {
        self.frame_index < self.settings.max_frames
    }

    /// Count a finished frame. Only dispatched frames from interactive views
    /// advance the series; editor views re-render without drifting the count.
    pub fn on_frame_rendered(&mut self, dispatched: bool, interactive: bool) {
        if !dispatched || !interactive || !self.should_dispatch() {
            return;
        }
        self.frame_index += 1;
        if self.frame_index == self.settings.max_frames {
            log::info!(
                "Accumulation converged: {} frames in {:.2}s",
                self.frame_index,
                self.elapsed_secs()
            );
        }
    }
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new(AccumulationSettings::default())
    }
}
