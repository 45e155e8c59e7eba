// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Result;
use bytemuck::Zeroable;

use super::buffers;
use super::context::GpuContext;
use crate::camera::GpuFrameParams;
use crate::constants::ACCUM_BYTES_PER_PIXEL;
use crate::error::AccumError;
use crate::render::frame::dispatch_accumulate;
use crate::render::pass::FrameBackend;
use crate::render::target::OutputDescriptor;
use crate::shaders::composer::{ACCUMULATE_ENTRY, ShaderComposer};

/// Binding slots of the accumulate kernel, group 0.
pub mod bindings {
    pub const FRAME_PARAMS: u32 = 0;
    pub const ACCUMULATION: u32 = 1;
    pub const PRNG_STATES: u32 = 2;
}

/// Running-mean radiance, one `vec4<f32>` per pixel.
pub struct AccumulationImage {
    pub buffer: wgpu::Buffer,
    pub desc: OutputDescriptor,
}

/// Largest buffer that can be created and bound whole as one storage binding.
pub fn storage_binding_limit(limits: &wgpu::Limits) -> u64 {
    limits
        .max_buffer_size
        .min(u64::from(limits.max_storage_buffer_binding_size))
}

/// `FrameBackend` on a headless wgpu device. Work for a frame is recorded into
/// one encoder and submitted on `present`.
pub struct WgpuBackend {
    gpu: GpuContext,
    layout: wgpu::BindGroupLayout,
    params_buffer: wgpu::Buffer,
    encoder: Option<wgpu::CommandEncoder>,
    submitted_frames: u64,
}

impl WgpuBackend {
    pub fn new(gpu: GpuContext) -> Self {
        let layout = Self::create_layout(&gpu.device);
        let params_buffer =
            buffers::create_uniform_buffer(&gpu.device, &GpuFrameParams::zeroed(), "frame params");
        Self {
            gpu,
            layout,
            params_buffer,
            encoder: None,
            submitted_frames: 0,
        }
    }

    fn create_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let storage = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: false },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("accumulate layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: bindings::FRAME_PARAMS,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage(bindings::ACCUMULATION),
                storage(bindings::PRNG_STATES),
            ],
        })
    }

    fn encoder(&mut self) -> &mut wgpu::CommandEncoder {
        self.encoder.get_or_insert_with(|| {
            self.gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame encoder"),
                })
        })
    }

    fn flush(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.gpu.queue.submit(Some(encoder.finish()));
        }
    }

    /// Submit pending work and copy the accumulated radiance back to the host.
    pub fn read_image(&mut self, image: &AccumulationImage) -> Result<Vec<[f32; 4]>> {
        self.flush();
        buffers::read_storage_buffer(&self.gpu.device, &self.gpu.queue, &image.buffer)
    }

    pub fn submitted_frames(&self) -> u64 {
        self.submitted_frames
    }

    fn check_binding_size(&self, bytes: u64) -> Result<(), AccumError> {
        let limit = storage_binding_limit(&self.gpu.device.limits());
        if bytes > limit {
            return Err(AccumError::DeviceLimit { bytes, limit });
        }
        Ok(())
    }
}

impl FrameBackend for WgpuBackend {
    type Program = wgpu::ComputePipeline;
    type Image = AccumulationImage;
    type RandomStates = wgpu::Buffer;

    fn load_program(&mut self) -> Result<wgpu::ComputePipeline, AccumError> {
        let source = ShaderComposer::embedded().compose(ACCUMULATE_ENTRY)?;
        super::pipeline::create_compute_pipeline(
            &self.gpu.device,
            &source,
            &[&self.layout],
            "accumulate",
        )
    }

    fn create_image(&mut self, desc: OutputDescriptor) -> Result<AccumulationImage, AccumError> {
        let size = desc.pixel_count() as u64 * ACCUM_BYTES_PER_PIXEL;
        if let Err(e) = self.check_binding_size(size) {
            log::warn!("[gpu] accumulation image {}x{}: {e}", desc.width, desc.height);
            return Err(AccumError::Configuration {
                width: desc.width,
                height: desc.height,
            });
        }
        let buffer = buffers::create_empty_storage_buffer(&self.gpu.device, size, "accumulation");
        Ok(AccumulationImage { buffer, desc })
    }

    fn release_image(&mut self, image: AccumulationImage) {
        // Pending commands may still reference the buffer.
        self.flush();
        image.buffer.destroy();
    }

    fn upload_random_states(&mut self, states: &[[u32; 4]]) -> Result<wgpu::Buffer, AccumError> {
        self.check_binding_size(std::mem::size_of_val(states) as u64)?;
        Ok(buffers::create_storage_buffer(
            &self.gpu.device,
            states,
            "prng states",
        ))
    }

    fn release_random_states(&mut self, states: wgpu::Buffer) {
        self.flush();
        states.destroy();
    }

    fn clear_image(&mut self, image: &AccumulationImage) {
        // Clear on GPU to avoid a large CPU allocation per reset.
        self.encoder().clear_buffer(&image.buffer, 0, None);
    }

    fn dispatch(
        &mut self,
        program: &wgpu::ComputePipeline,
        image: &AccumulationImage,
        states: &wgpu::Buffer,
        params: &GpuFrameParams,
    ) {
        buffers::update_uniform_buffer(&self.gpu.queue, &self.params_buffer, params);

        let bind_group = self
            .gpu
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("accumulate bind group"),
                layout: &self.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: bindings::FRAME_PARAMS,
                        resource: self.params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: bindings::ACCUMULATION,
                        resource: image.buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: bindings::PRNG_STATES,
                        resource: states.as_entire_binding(),
                    },
                ],
            });

        let (width, height) = (image.desc.width, image.desc.height);
        dispatch_accumulate(self.encoder(), program, &bind_group, width, height);
    }

    fn present(&mut self, _image: &AccumulationImage) {
        self.flush();
        self.submitted_frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::mem::offset_of;

    use naga::valid::{Capabilities, ValidationFlags, Validator};

    use super::*;
    use crate::constants::WORKGROUP_SIZE;

    fn accumulate_module() -> naga::Module {
        let source = ShaderComposer::embedded()
            .compose(ACCUMULATE_ENTRY)
            .unwrap();
        let module = naga::front::wgsl::parse_str(&source).unwrap();
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .unwrap();
        module
    }

    fn binding_type(module: &naga::Module, binding: u32) -> &naga::TypeInner {
        let (_, global) = module
            .global_variables
            .iter()
            .find(|(_, var)| {
                var.binding
                    == Some(naga::ResourceBinding {
                        group: 0,
                        binding,
                    })
            })
            .unwrap();
        &module.types[global.ty].inner
    }

    #[test]
    fn test_frame_params_layout_matches_shader() {
        let module = accumulate_module();
        let naga::TypeInner::Struct { members, span } =
            binding_type(&module, bindings::FRAME_PARAMS)
        else {
            panic!("frame params binding is not a struct");
        };

        let offsets: Vec<_> = members
            .iter()
            .map(|m| (m.name.as_deref().unwrap_or_default(), m.offset as usize))
            .collect();
        assert_eq!(
            offsets,
            vec![
                ("inv_view_proj", offset_of!(GpuFrameParams, inv_view_proj)),
                ("camera_position", offset_of!(GpuFrameParams, camera_position)),
                ("far_distance", offset_of!(GpuFrameParams, far_distance)),
                ("output_size", offset_of!(GpuFrameParams, output_size)),
                ("frame_index", offset_of!(GpuFrameParams, frame_index)),
                ("width", offset_of!(GpuFrameParams, width)),
                ("height", offset_of!(GpuFrameParams, height)),
                ("_pad", offset_of!(GpuFrameParams, _pad)),
            ]
        );
        assert_eq!(*span as usize, std::mem::size_of::<GpuFrameParams>());
    }

    #[test]
    fn test_storage_bindings_are_runtime_arrays() {
        let module = accumulate_module();
        for binding in [bindings::ACCUMULATION, bindings::PRNG_STATES] {
            let naga::TypeInner::Array { size, stride, .. } = binding_type(&module, binding) else {
                panic!("binding {binding} is not an array");
            };
            assert_eq!(*size, naga::ArraySize::Dynamic);
            assert_eq!(u64::from(*stride), ACCUM_BYTES_PER_PIXEL);
        }
    }

    #[test]
    fn test_workgroup_size_matches_host() {
        let module = accumulate_module();
        let entry = module
            .entry_points
            .iter()
            .find(|ep| ep.stage == naga::ShaderStage::Compute)
            .unwrap();
        assert_eq!(entry.workgroup_size, [WORKGROUP_SIZE, WORKGROUP_SIZE, 1]);
    }

    #[test]
    fn test_binding_limit_rejects_8k_output() {
        let limits = wgpu::Limits::downlevel_defaults();
        let limit = storage_binding_limit(&limits);
        assert_eq!(limit, u64::from(limits.max_storage_buffer_binding_size));

        let bytes_8k = 7680 * 4320 * ACCUM_BYTES_PER_PIXEL;
        let bytes_1080p = 1920 * 1080 * ACCUM_BYTES_PER_PIXEL;
        assert!(bytes_8k > limit);
        assert!(bytes_1080p <= limit);
    }
}
