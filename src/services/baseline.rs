// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Per-domain baseline persistence and diffing.
//!
//! Writes go through a temp file + rename so a concurrent run can only lose
//! the race, never tear the file. Read failures degrade to "no baseline".

use crate::models::report::{BaselineDiff, BaselineDiffRow, BaselineRecord, Summary};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Metrics compared between the current run and the stored baseline
const DIFF_METRICS: &[&str] = &[
    "accessible",
    "indexable",
    "non_indexable",
    "robots_disallowed",
    "x_robots_forbidden",
    "meta_forbidden",
    "avg_response_time_ms",
];

/// Lowercase the domain and replace anything outside [a-z0-9._-] with '_'
pub fn domain_slug(domain: &str) -> String {
    domain
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn metric_value(summary: &Summary, metric: &str) -> f64 {
    match metric {
        "accessible" => f64::from(summary.accessible),
        "indexable" => f64::from(summary.indexable),
        "non_indexable" => f64::from(summary.non_indexable),
        "robots_disallowed" => f64::from(summary.robots_disallowed),
        "x_robots_forbidden" => f64::from(summary.x_robots_forbidden),
        "meta_forbidden" => f64::from(summary.meta_forbidden),
        _ => summary.avg_response_time_ms,
    }
}

/// Atomic JSON write: temp file in the same directory, then rename
pub fn write_json_atomic(path: &Path, json: &str) -> Result<()> {
    let parent = path
        .parent()
        .context("persistence path has no parent directory")?;
    fs::create_dir_all(parent)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Per-domain baseline store under `<reports_root>/bot_baselines/`
pub struct BaselineStore {
    dir: PathBuf,
}

impl BaselineStore {
    pub fn new(reports_root: &Path) -> Self {
        Self {
            dir: reports_root.join("bot_baselines"),
        }
    }

    fn path_for(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slug))
    }

    /// Prior record for the domain, or None when missing or malformed
    pub fn load(&self, slug: &str) -> Option<BaselineRecord> {
        let text = fs::read_to_string(self.path_for(slug)).ok()?;
        serde_json::from_str(&text).ok()
    }

    /// Overwrite the domain's baseline. The caller logs and swallows errors;
    /// persistence is best-effort.
    pub fn save(&self, slug: &str, record: &BaselineRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record)?;
        write_json_atomic(&self.path_for(slug), &json)
    }
}

/// Fixed-metric diff rows, or the "no baseline" marker on a first run
pub fn compute_baseline_diff(current: &Summary, baseline: Option<&BaselineRecord>) -> BaselineDiff {
    let Some(baseline) = baseline else {
        return BaselineDiff::absent();
    };
    let rows = DIFF_METRICS
        .iter()
        .map(|metric| {
            let cur = metric_value(current, metric);
            let base = metric_value(&baseline.summary, metric);
            BaselineDiffRow {
                metric: (*metric).to_string(),
                current: cur,
                baseline: base,
                delta: ((cur - base) * 10.0).round() / 10.0,
            }
        })
        .collect();
    BaselineDiff {
        available: true,
        reason: None,
        rows,
    }
}
