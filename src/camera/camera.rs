// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

use super::pose::CameraPose;
use crate::constants::{DEFAULT_CAMERA_POSITION, DEFAULT_FAR, DEFAULT_FOV, DEFAULT_NEAR};

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub pitch: f32, // degrees
    pub yaw: f32,   // degrees
    pub roll: f32,  // degrees
    pub fov: f32,   // degrees, vertical
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, rotation: [f32; 3], fov: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            pitch: rotation[0],
            yaw: rotation[1],
            roll: rotation[2],
            fov,
            near,
            far,
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            glam::EulerRot::YXZ,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            self.roll.to_radians(),
        )
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.position, self.orientation())
    }

    pub fn view_projection(&self, width: u32, height: u32) -> Mat4 {
        let rot = self.orientation();
        let forward = rot * Vec3::Z;
        let up = rot * Vec3::Y;
        let aspect = width as f32 / height as f32;
        let proj = Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far);
        let view = Mat4::look_to_rh(self.position, forward, up);
        proj * view
    }

    pub fn to_gpu(&self, width: u32, height: u32, frame_index: u32) -> GpuFrameParams {
        let inv_view_proj = self.view_projection(width, height).inverse();
        GpuFrameParams {
            inv_view_proj: inv_view_proj.to_cols_array_2d(),
            camera_position: self.position.into(),
            far_distance: self.far,
            output_size: [
                width as f32,
                height as f32,
                1.0 / width as f32,
                1.0 / height as f32,
            ],
            frame_index,
            width,
            height,
            _pad: 0,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::from(DEFAULT_CAMERA_POSITION),
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
            fov: DEFAULT_FOV,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }
}

/// Must match the WGSL `FrameParams` struct layout exactly.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuFrameParams {
    pub inv_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub far_distance: f32,
    pub output_size: [f32; 4],
    pub frame_index: u32,
    pub width: u32,
    pub height: u32,
    pub _pad: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_params_layout() {
        assert_eq!(std::mem::size_of::<GpuFrameParams>(), 112);
    }

    #[test]
    fn test_output_size_reciprocals() {
        let params = Camera::default().to_gpu(200, 100, 7);
        assert_eq!(params.output_size, [200.0, 100.0, 0.005, 0.01]);
        assert_eq!(params.frame_index, 7);
    }

    #[test]
    fn test_center_ray_points_forward() {
        let camera = Camera::new(Vec3::ZERO, [0.0, 90.0, 0.0], 60.0, 0.1, 100.0);
        let inv = camera.view_projection(64, 64).inverse();
        let far = inv.project_point3(Vec3::new(0.0, 0.0, 1.0));
        let dir = far.normalize();
        let forward = camera.orientation() * Vec3::Z;
        assert!(dir.dot(forward) > 0.999);
    }
}
