// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use anyhow::{Context, Result};

/// Linear radiance to 8-bit sRGB-ish RGBA. Alpha is forced opaque.
pub fn to_rgba8(pixels: &[[f32; 4]]) -> Vec<u8> {
    pixels
        .iter()
        .flat_map(|p| {
            let encode = |c: f32| (c.clamp(0.0, 1.0).powf(1.0 / 2.2) * 255.0 + 0.5) as u8;
            [encode(p[0]), encode(p[1]), encode(p[2]), 255]
        })
        .collect()
}

pub fn save_accumulated(pixels: &[[f32; 4]], width: u32, height: u32, path: &Path) -> Result<()> {
    let img = image::RgbaImage::from_raw(width, height, to_rgba8(pixels))
        .context("Accumulated image does not match its resolution")?;
    img.save(path)
        .with_context(|| format!("Failed to save image to {}", path.display()))?;
    log::info!("Accumulated image saved to {}", path.display());
    Ok(())
}
