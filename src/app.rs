// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use anyhow::Result;

use crate::gpu::backend::WgpuBackend;
use crate::gpu::context::GpuContext;
use crate::io::output::save_accumulated;
use crate::render::pass::{FrameBackend, FrameInput, RayTracePass};
use crate::session::loader::load_session;
use crate::session::report::{FrameRecord, save_report};
use crate::session::session::Session;

pub fn run(session_path: Option<String>) -> Result<()> {
    let session = match &session_path {
        Some(path) => load_session(Path::new(path))?,
        None => {
            log::info!("No session file given, rendering the default session");
            Session::default()
        }
    };

    let gpu = GpuContext::headless()?;
    let mut pass = RayTracePass::new(
        WgpuBackend::new(gpu),
        session.accumulation,
        session.seed_source(),
    );

    let records = drive(&mut pass, &session);
    let rendered = records.iter().filter(|r| r.dispatched).count();
    log::info!(
        "Drove {} frames ({} dispatched, {} submitted), final frame index {}",
        records.len(),
        rendered,
        pass.backend().submitted_frames(),
        pass.frame_index()
    );

    if let Some(output) = &session.output {
        let readback =
            pass.inspect_image(|backend, image| backend.read_image(image).map(|px| (px, image.desc)));
        match readback {
            Some(result) => {
                let (pixels, desc) = result?;
                save_accumulated(&pixels, desc.width, desc.height, Path::new(output))?;
            }
            None => log::warn!("No image was allocated, skipping {output}"),
        }
    }

    if let Some(report) = &session.report {
        save_report(&records, Path::new(report))?;
    }

    pass.release();
    Ok(())
}

/// Feed every planned frame of `session` through `pass`.
pub fn drive<B: FrameBackend>(pass: &mut RayTracePass<B>, session: &Session) -> Vec<FrameRecord> {
    session
        .frame_plan()
        .enumerate()
        .map(|(frame, planned)| {
            let outcome = pass.execute(&FrameInput {
                camera: &planned.camera,
                width: planned.width,
                height: planned.height,
                view: planned.view,
            });
            log::debug!("frame {frame} (shot {}): {outcome:?}", planned.shot);
            FrameRecord::new(frame, planned.shot, &outcome)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::GpuFrameParams;
    use crate::error::AccumError;
    use crate::render::accumulator::AccumulationSettings;
    use crate::render::pass::ViewKind;
    use crate::render::random_state::SeedSource;
    use crate::render::target::OutputDescriptor;
    use crate::session::session::ShotConfig;

    #[derive(Default)]
    struct CountingBackend {
        clears: usize,
        dispatches: usize,
        uploads: Vec<usize>,
    }

    impl FrameBackend for CountingBackend {
        type Program = ();
        type Image = OutputDescriptor;
        type RandomStates = usize;

        fn load_program(&mut self) -> Result<(), AccumError> {
            Ok(())
        }
        fn create_image(&mut self, desc: OutputDescriptor) -> Result<OutputDescriptor, AccumError> {
            Ok(desc)
        }
        fn release_image(&mut self, _: OutputDescriptor) {}
        fn upload_random_states(&mut self, states: &[[u32; 4]]) -> Result<usize, AccumError> {
            self.uploads.push(states.len());
            Ok(states.len())
        }
        fn release_random_states(&mut self, _: usize) {}
        fn clear_image(&mut self, _: &OutputDescriptor) {
            self.clears += 1;
        }
        fn dispatch(&mut self, _: &(), _: &OutputDescriptor, _: &usize, _: &GpuFrameParams) {
            self.dispatches += 1;
        }
        fn present(&mut self, _: &OutputDescriptor) {}
    }

    fn shot(x: f32, frames: u32, view: ViewKind) -> ShotConfig {
        ShotConfig {
            position: [x, 1.0, -5.0],
            frames,
            width: Some(100),
            height: Some(100),
            view,
            ..Default::default()
        }
    }

    #[test]
    fn test_drive_scripted_session() {
        let session = Session {
            shots: vec![
                shot(0.0, 3, ViewKind::Game),
                shot(1.0, 2, ViewKind::Game),
                shot(1.0, 2, ViewKind::Editor),
                shot(1.0, 1, ViewKind::Preview),
                ShotConfig {
                    height: Some(200),
                    ..shot(1.0, 1, ViewKind::Game)
                },
            ],
            ..Default::default()
        };
        let mut pass = RayTracePass::new(
            CountingBackend::default(),
            AccumulationSettings::default(),
            SeedSource::Fixed(1),
        );

        let records = drive(&mut pass, &session);
        let indices: Vec<_> = records.iter().map(|r| r.frame_index).collect();
        assert_eq!(
            indices,
            vec![
                Some(0),
                Some(1),
                Some(2),
                Some(0),
                Some(1),
                Some(2),
                Some(2),
                None,
                Some(0)
            ]
        );
        assert_eq!(records[7].status, "not_enqueued");

        let backend = pass.backend();
        // initial, camera move, resize
        assert_eq!(backend.clears, 3);
        assert_eq!(backend.dispatches, 8);
        assert_eq!(backend.uploads, vec![10_000, 20_000]);
    }
}
