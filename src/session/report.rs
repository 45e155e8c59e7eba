// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::render::pass::FrameOutcome;

/// What happened on one driven frame, as written to the session report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    pub frame: usize,
    pub shot: usize,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_index: Option<u32>,
    pub cleared: bool,
    pub dispatched: bool,
    pub reseeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FrameRecord {
    pub fn new(frame: usize, shot: usize, outcome: &FrameOutcome) -> Self {
        let mut record = Self {
            frame,
            shot,
            status: "",
            frame_index: None,
            cleared: false,
            dispatched: false,
            reseeded: false,
            error: None,
        };
        match outcome {
            FrameOutcome::NotEnqueued => record.status = "not_enqueued",
            FrameOutcome::Skipped(e) => {
                record.status = "skipped";
                record.error = Some(e.to_string());
            }
            FrameOutcome::Degraded => record.status = "degraded",
            FrameOutcome::Rendered {
                frame_index,
                cleared,
                dispatched,
                reseeded,
            } => {
                record.status = "rendered";
                record.frame_index = Some(*frame_index);
                record.cleared = *cleared;
                record.dispatched = *dispatched;
                record.reseeded = *reseeded;
            }
        }
        record
    }
}

pub fn save_report(records: &[FrameRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("Failed to serialize frame report")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write frame report: {}", path.display()))?;
    log::info!("Saved frame report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccumError;

    #[test]
    fn test_rendered_record() {
        let record = FrameRecord::new(
            3,
            1,
            &FrameOutcome::Rendered {
                frame_index: 2,
                cleared: false,
                dispatched: true,
                reseeded: false,
            },
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "rendered");
        assert_eq!(json["frame_index"], 2);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_skipped_record_carries_error() {
        let record = FrameRecord::new(
            0,
            0,
            &FrameOutcome::Skipped(AccumError::Configuration {
                width: 0,
                height: 4,
            }),
        );
        assert_eq!(record.status, "skipped");
        assert_eq!(record.error.as_deref(), Some("Invalid output resolution 0x4"));
        assert_eq!(record.frame_index, None);
    }

    #[test]
    fn test_save_report_writes_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let records = vec![FrameRecord::new(0, 0, &FrameOutcome::Degraded)];
        save_report(&records, &path).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed[0]["status"], "degraded");
    }
}
