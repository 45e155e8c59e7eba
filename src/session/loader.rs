// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::session::Session;

pub fn load_session(path: &Path) -> Result<Session> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {}", path.display()))?;

    let session: Session = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON session file: {}", path.display()))?,
        _ => serde_yml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML session file: {}", path.display()))?,
    };

    log::info!(
        "Loaded session: {} shots, {} frames at {}x{}",
        session.shots.len(),
        session.total_frames(),
        session.width,
        session.height
    );

    Ok(session)
}
