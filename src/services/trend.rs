// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Per-domain rolling trend history, newest first, bounded to 50 entries.

use crate::models::report::{TrendDelta, TrendHistoryFile, TrendReport, TrendSnapshot};
use crate::services::baseline::write_json_atomic;
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Bound on entries kept per domain
pub const TREND_HISTORY_MAX: usize = 50;

/// Entries surfaced in the result document
const TREND_REPORT_MAX: usize = 10;

/// Per-domain trend store under `<reports_root>/bot_trends/`
pub struct TrendStore {
    dir: PathBuf,
}

impl TrendStore {
    pub fn new(reports_root: &Path) -> Self {
        Self {
            dir: reports_root.join("bot_trends"),
        }
    }

    fn path_for(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slug))
    }

    /// Stored history for a domain; missing or malformed files read as empty
    pub fn load_history(&self, slug: &str) -> Vec<TrendSnapshot> {
        let Some(text) = fs::read_to_string(self.path_for(slug)).ok() else {
            return Vec::new();
        };
        serde_json::from_str::<TrendHistoryFile>(&text)
            .map(|f| f.history)
            .unwrap_or_default()
    }

    /// Insert the snapshot at the head, dropping any entry with the same
    /// timestamp, truncate to the bound, and persist. Returns the updated
    /// history so the caller can build the report without a re-read.
    pub fn append(&self, slug: &str, snapshot: TrendSnapshot) -> Result<Vec<TrendSnapshot>> {
        let mut history = self.load_history(slug);
        history.retain(|s| s.timestamp != snapshot.timestamp);
        history.insert(0, snapshot);
        history.truncate(TREND_HISTORY_MAX);

        let file = TrendHistoryFile {
            updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            history: history.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        write_json_atomic(&self.path_for(slug), &json)?;
        Ok(history)
    }
}

/// Build the trend section from a newest-first history
pub fn trend_report(history: &[TrendSnapshot]) -> TrendReport {
    let latest = history.first().cloned();
    let previous = history.get(1).cloned();
    let delta_vs_previous = match (&latest, &previous) {
        (Some(latest), Some(previous)) => Some(TrendDelta {
            indexable_delta: i64::from(latest.indexable) - i64::from(previous.indexable),
            critical_issues_delta: i64::from(latest.critical_issues)
                - i64::from(previous.critical_issues),
            avg_response_time_delta_ms: ((latest.avg_response_time_ms
                - previous.avg_response_time_ms)
                * 10.0)
                .round()
                / 10.0,
        }),
        _ => None,
    };
    TrendReport {
        history_count: history.len(),
        latest,
        previous,
        delta_vs_previous,
        history: history.iter().take(TREND_REPORT_MAX).cloned().collect(),
    }
}
