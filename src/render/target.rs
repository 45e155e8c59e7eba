// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

/// Size of the accumulation image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputDescriptor {
    pub width: u32,
    pub height: u32,
}

impl OutputDescriptor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Realloc<H> {
    Unchanged,
    /// A new handle was created. `previous` must be released by the caller.
    Reallocated { previous: Option<H> },
}

/// A GPU resource keyed by the descriptor it was created for.
pub struct ResourceSlot<D, H> {
    current: Option<(D, H)>,
}

impl<D: Copy + PartialEq, H> ResourceSlot<D, H> {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Create the resource if the slot is empty or was built for a different
    /// descriptor. The replaced handle is handed back instead of dropped.
    /// If `create` fails the slot keeps its current handle.
    pub fn ensure<E>(
        &mut self,
        desc: D,
        create: impl FnOnce(D) -> Result<H, E>,
    ) -> Result<Realloc<H>, E> {
        if let Some((current, _)) = &self.current
            && *current == desc
        {
            return Ok(Realloc::Unchanged);
        }
        let handle = create(desc)?;
        let previous = self.current.replace((desc, handle)).map(|(_, handle)| handle);
        Ok(Realloc::Reallocated { previous })
    }

    pub fn get(&self) -> Option<&H> {
        self.current.as_ref().map(|(_, handle)| handle)
    }

    pub fn descriptor(&self) -> Option<D> {
        self.current.as_ref().map(|(desc, _)| *desc)
    }

    pub fn take(&mut self) -> Option<H> {
        self.current.take().map(|(_, handle)| handle)
    }
}

impl<D: Copy + PartialEq, H> Default for ResourceSlot<D, H> {
    fn default() -> Self {
        Self::new()
    }
}
