// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::constants::RANDOM_WORDS_PER_PIXEL;
use crate::error::AccumError;

/// Where the bulk generator takes its seed from on each (re)allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    Clock,
    Fixed(u64),
}

impl SeedSource {
    fn resolve(self) -> u64 {
        match self {
            Self::Clock => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default(),
            Self::Fixed(seed) => seed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    Unchanged,
    /// Storage was replaced and re-seeded. `previous_len` is the pixel count of
    /// the discarded allocation, if there was one.
    Reallocated { previous_len: Option<usize> },
}

/// One xorshift128 state per output pixel, row-major. The host only seeds;
/// the sampling kernel advances each pixel's state in place.
pub struct PixelRandomState {
    entries: Vec<[u32; 4]>,
}

impl PixelRandomState {
    fn seeded(pixel_count: usize, seed: u64) -> Self {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let entries = (0..pixel_count)
            .map(|_| {
                let mut words = [0u32; RANDOM_WORDS_PER_PIXEL];
                for w in &mut words {
                    *w = rng.next_u32();
                }
                words
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[[u32; 4]] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct RandomStateProvider {
    source: SeedSource,
    state: Option<PixelRandomState>,
    generation: u64,
}

impl RandomStateProvider {
    pub fn new(source: SeedSource) -> Self {
        Self {
            source,
            state: None,
            generation: 0,
        }
    }

    /// Make sure there is one state per pixel of a `width` x `height` output.
    /// Storage is only replaced when the pixel count changes, so the advanced
    /// states survive from frame to frame.
    pub fn ensure_capacity(&mut self, width: u32, height: u32) -> Result<Capacity, AccumError> {
        if width == 0 || height == 0 {
            return Err(AccumError::Configuration { width, height });
        }

        let pixel_count = width as usize * height as usize;
        let previous_len = self.state.as_ref().map(PixelRandomState::len);
        if previous_len == Some(pixel_count) {
            return Ok(Capacity::Unchanged);
        }

        // Release before replacing.
        self.state = None;
        let seed = self.source.resolve();
        self.state = Some(PixelRandomState::seeded(pixel_count, seed));
        self.generation += 1;
        log::debug!(
            "[prng] seeded {pixel_count} pixel states ({width}x{height}, seed {seed:#x})"
        );

        Ok(Capacity::Reallocated { previous_len })
    }

    pub fn state(&self) -> Option<&PixelRandomState> {
        self.state.as_ref()
    }

    /// Number of times storage has been (re)seeded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn release(&mut self) {
        self.state = None;
    }
}
