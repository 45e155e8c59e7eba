// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::AccumError;

/// Build a compute pipeline, turning shader validation failures into
/// `MissingResource` instead of the default uncaptured-error panic.
pub fn create_compute_pipeline(
    device: &wgpu::Device,
    shader_source: &str,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    label: &str,
) -> Result<wgpu::ComputePipeline, AccumError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shader_source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} layout")),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        module: &shader_module,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    });

    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(AccumError::MissingResource(format!(
            "{label} pipeline failed validation: {err}"
        )));
    }

    Ok(pipeline)
}
