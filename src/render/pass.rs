// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};

use super::accumulator::{AccumulationSettings, FrameAccumulator, ResetDecision};
use super::random_state::{Capacity, RandomStateProvider, SeedSource};
use super::target::{OutputDescriptor, Realloc, ResourceSlot};
use crate::camera::{Camera, GpuFrameParams};
use crate::error::AccumError;

/// GPU side of the pass. Handles are owned by the pass and given back through
/// the `release_*` methods when replaced or torn down.
pub trait FrameBackend {
    type Program;
    type Image;
    type RandomStates;

    fn load_program(&mut self) -> Result<Self::Program, AccumError>;

    /// Fails when the device cannot hold an image of this size.
    fn create_image(&mut self, desc: OutputDescriptor) -> Result<Self::Image, AccumError>;
    fn release_image(&mut self, image: Self::Image);

    fn upload_random_states(
        &mut self,
        states: &[[u32; 4]],
    ) -> Result<Self::RandomStates, AccumError>;
    fn release_random_states(&mut self, states: Self::RandomStates);

    /// Zero the color channels of the accumulation image.
    fn clear_image(&mut self, image: &Self::Image);

    fn dispatch(
        &mut self,
        program: &Self::Program,
        image: &Self::Image,
        states: &Self::RandomStates,
        params: &GpuFrameParams,
    );

    /// Show the image as it currently stands.
    fn present(&mut self, image: &Self::Image);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Live camera; the only kind that advances accumulation.
    #[default]
    Game,
    /// Editor/scene view: rendered, but never advances the frame count.
    Editor,
    /// Thumbnail/inspector preview: the pass does not run at all.
    Preview,
}

impl ViewKind {
    pub fn is_interactive(self) -> bool {
        self == Self::Game
    }
}

pub struct FrameInput<'a> {
    pub camera: &'a Camera,
    pub width: u32,
    pub height: u32,
    pub view: ViewKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    NotEnqueued,
    Skipped(AccumError),
    /// Sampling program unavailable; the existing image was presented as-is.
    Degraded,
    Rendered {
        frame_index: u32,
        cleared: bool,
        dispatched: bool,
        reseeded: bool,
    },
}

pub struct RayTracePass<B: FrameBackend> {
    backend: B,
    program: Option<B::Program>,
    accumulator: FrameAccumulator,
    random: RandomStateProvider,
    image: ResourceSlot<OutputDescriptor, B::Image>,
    random_states: ResourceSlot<usize, B::RandomStates>,
}

impl<B: FrameBackend> RayTracePass<B> {
    pub fn new(mut backend: B, settings: AccumulationSettings, seed: SeedSource) -> Self {
        let program = match backend.load_program() {
            Ok(program) => Some(program),
            Err(e) => {
                log::error!("{e}; ray-traced output disabled for this session");
                None
            }
        };
        Self {
            backend,
            program,
            accumulator: FrameAccumulator::new(settings),
            random: RandomStateProvider::new(seed),
            image: ResourceSlot::new(),
            random_states: ResourceSlot::new(),
        }
    }

    pub fn execute(&mut self, frame: &FrameInput) -> FrameOutcome {
        if frame.view == ViewKind::Preview {
            return FrameOutcome::NotEnqueued;
        }

        let desc = OutputDescriptor::new(frame.width, frame.height);
        if desc.is_empty() {
            log::warn!("Skipping frame: output is {}x{}", frame.width, frame.height);
            return FrameOutcome::Skipped(AccumError::Configuration {
                width: frame.width,
                height: frame.height,
            });
        }

        let image_replaced = match self.image.ensure(desc, |d| self.backend.create_image(d)) {
            Ok(Realloc::Unchanged) => false,
            Ok(Realloc::Reallocated { previous }) => {
                if let Some(old) = previous {
                    self.backend.release_image(old);
                }
                log::info!("Accumulation image sized {}x{}", desc.width, desc.height);
                true
            }
            Err(e) => {
                log::warn!("Skipping frame: {e}");
                return FrameOutcome::Skipped(e);
            }
        };

        let reseeded = match self.ensure_random_states(desc) {
            Ok(reseeded) => reseeded,
            Err(e) => {
                // The new image never received a clear; drop it so the next
                // frame reallocates and restarts.
                if image_replaced && let Some(image) = self.image.take() {
                    self.backend.release_image(image);
                }
                log::warn!("Skipping frame: {e}");
                return FrameOutcome::Skipped(e);
            }
        };

        let (Some(program), Some(image), Some(states)) =
            (&self.program, self.image.get(), self.random_states.get())
        else {
            if let Some(image) = self.image.get() {
                self.backend.present(image);
            }
            log::debug!("Sampling program missing, presenting stale image");
            return FrameOutcome::Degraded;
        };

        let mut cleared = false;
        if image_replaced {
            self.accumulator.reset();
        }
        let decision = self.accumulator.evaluate_camera(frame.camera.pose());
        if image_replaced || decision == ResetDecision::Reset {
            self.backend.clear_image(image);
            cleared = true;
        }

        let frame_index = self.accumulator.frame_index();
        let dispatched = self.accumulator.should_dispatch();
        if dispatched {
            let params = frame.camera.to_gpu(desc.width, desc.height, frame_index);
            self.backend.dispatch(program, image, states, &params);
        }
        self.accumulator
            .on_frame_rendered(dispatched, frame.view.is_interactive());

        self.backend.present(image);

        FrameOutcome::Rendered {
            frame_index,
            cleared,
            dispatched,
            reseeded,
        }
    }

    /// Returns whether the per-pixel states were re-seeded this frame. A failed
    /// upload releases the host states too, so both sides re-seed together.
    fn ensure_random_states(&mut self, desc: OutputDescriptor) -> Result<bool, AccumError> {
        let capacity = self.random.ensure_capacity(desc.width, desc.height)?;
        let Some(state) = self.random.state() else {
            return Ok(false);
        };

        // The GPU copy tracks the provider's pixel count; a re-seed always forces a fresh upload.
        if capacity != Capacity::Unchanged
            && let Some(old) = self.random_states.take()
        {
            self.backend.release_random_states(old);
        }
        let uploaded = self
            .random_states
            .ensure(state.len(), |_| self.backend.upload_random_states(state.entries()));
        match uploaded {
            Ok(Realloc::Unchanged) => Ok(false),
            Ok(Realloc::Reallocated { previous }) => {
                if let Some(old) = previous {
                    self.backend.release_random_states(old);
                }
                Ok(true)
            }
            Err(e) => {
                self.random.release();
                Err(e)
            }
        }
    }

    /// Return every GPU resource to the backend. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(image) = self.image.take() {
            self.backend.release_image(image);
        }
        if let Some(states) = self.random_states.take() {
            self.backend.release_random_states(states);
        }
        self.random.release();
    }

    pub fn frame_index(&self) -> u32 {
        self.accumulator.frame_index()
    }

    pub fn accumulator(&self) -> &FrameAccumulator {
        &self.accumulator
    }

    pub fn random_states(&self) -> &RandomStateProvider {
        &self.random
    }

    pub fn is_degraded(&self) -> bool {
        self.program.is_none()
    }

    pub fn image(&self) -> Option<&B::Image> {
        self.image.get()
    }

    /// Run `f` with the backend and the current image, if one has been allocated.
    pub fn inspect_image<R>(&mut self, f: impl FnOnce(&mut B, &B::Image) -> R) -> Option<R> {
        let image = self.image.get()?;
        Some(f(&mut self.backend, image))
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: FrameBackend> Drop for RayTracePass<B> {
    fn drop(&mut self) {
        self.release();
    }
}
