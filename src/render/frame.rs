// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::constants::WORKGROUP_SIZE;
use crate::gpu::buffers::dispatch_size;

/// Record one sampling pass covering every pixel of a `width` x `height` image.
pub fn dispatch_accumulate(
    encoder: &mut wgpu::CommandEncoder,
    pipeline: &wgpu::ComputePipeline,
    bind_group: &wgpu::BindGroup,
    width: u32,
    height: u32,
) {
    let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
        label: Some("accumulate pass"),
        timestamp_writes: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, Some(bind_group), &[]);
    pass.dispatch_workgroups(
        dispatch_size(width, WORKGROUP_SIZE),
        dispatch_size(height, WORKGROUP_SIZE),
        1,
    );
}
