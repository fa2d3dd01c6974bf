// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Report records: everything embedded in the final result document plus the
//! two persisted shapes (baseline, trend history).

use crate::models::bot::BotCategory;
use crate::models::probe::{BotResultCompact, ProbeResult, WafSignal};
use crate::models::robots::RobotsReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Severity of issues, alerts, and linter findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
    Ok,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Ok => write!(f, "ok"),
        }
    }
}

/// Run-level counters; also the shape persisted in the baseline file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total: u32,
    pub accessible: u32,
    pub unavailable: u32,
    pub with_content: u32,
    pub without_content: u32,
    pub crawlable: u32,
    pub non_crawlable: u32,
    pub renderable: u32,
    pub non_renderable: u32,
    pub indexable: u32,
    pub non_indexable: u32,
    pub robots_disallowed: u32,
    pub x_robots_forbidden: u32,
    pub meta_forbidden: u32,
    pub waf_cdn_detected: u32,
    pub expected_ai_policy_blocked: u32,
    pub avg_response_time_ms: f64,
    pub issues_total: u32,
    pub critical_issues: u32,
    pub warning_issues: u32,
    pub info_issues: u32,
}

/// Per-category rollup with SLA evaluation
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStat {
    pub category: BotCategory,
    pub total: u32,
    pub accessible: u32,
    pub with_content: u32,
    pub crawlable: u32,
    pub renderable: u32,
    pub indexable: u32,
    pub non_indexable: u32,
    pub indexable_pct: f64,
    pub criticality_weight: f64,
    pub sla_target_pct: f64,
    pub sla_met: bool,
    pub priority_risk_score: f64,
    /// Probes in this category carrying a forbidding directive
    pub restrictive_directives: u32,
}

/// One row of the SLA dashboard
#[derive(Debug, Clone, Serialize)]
pub struct SlaRow {
    pub category: BotCategory,
    pub indexable_pct: f64,
    pub sla_target_pct: f64,
    pub sla_met: bool,
    /// "met" or "missed"
    pub status: String,
}

/// Aggregated root cause of indexability loss, scored by weighted bot count
#[derive(Debug, Clone, Serialize)]
pub struct PriorityBlocker {
    /// unreachable | empty_content | robots_disallow | indexing_directive | waf_challenge
    pub code: String,
    pub title: String,
    pub details: String,
    pub affected_bots: u32,
    pub weighted_impact: f64,
    pub priority_score: f64,
    /// At most 8 names
    pub sample_bots: Vec<String>,
}

/// Remediation template emitted for a fired blocker
#[derive(Debug, Clone, Serialize)]
pub struct Playbook {
    pub code: String,
    pub owner: String,
    pub title: String,
    pub action: String,
}

/// One per-bot (or run-level) finding
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub code: String,
    pub title: String,
    pub detail: String,
    pub bot: Option<String>,
    pub category: Option<BotCategory>,
}

/// Alert derived from thresholds, baseline diff, or trend delta
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub code: String,
    pub severity: Severity,
    pub message: String,
}

/// Persisted per-domain baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineRecord {
    pub updated_at: DateTime<Utc>,
    pub summary: Summary,
}

#[derive(Debug, Clone, Serialize)]
pub struct BaselineDiffRow {
    pub metric: String,
    pub current: f64,
    pub baseline: f64,
    pub delta: f64,
}

/// Diff against the stored baseline; `available = false` marks the first run
#[derive(Debug, Clone, Serialize)]
pub struct BaselineDiff {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub rows: Vec<BaselineDiffRow>,
}

impl BaselineDiff {
    pub fn absent() -> Self {
        Self {
            available: false,
            reason: Some("baseline_absent".to_string()),
            rows: Vec::new(),
        }
    }
}

/// One entry of the bounded per-domain trend history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSnapshot {
    /// ISO-8601 UTC; history entries are deduplicated by this string
    pub timestamp: String,
    pub url: String,
    pub total: u32,
    pub indexable: u32,
    pub non_indexable: u32,
    pub critical_issues: u32,
    pub avg_response_time_ms: f64,
    pub retry_profile: String,
    pub criticality_profile: String,
    pub sla_profile: String,
}

/// On-disk shape of the trend file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendHistoryFile {
    pub updated_at: String,
    pub history: Vec<TrendSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendDelta {
    pub indexable_delta: i64,
    pub critical_issues_delta: i64,
    pub avg_response_time_delta_ms: f64,
}

/// Trend section of the result document
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub history_count: usize,
    pub latest: Option<TrendSnapshot>,
    pub previous: Option<TrendSnapshot>,
    pub delta_vs_previous: Option<TrendDelta>,
    /// Newest first, truncated to 10 entries
    pub history: Vec<TrendSnapshot>,
}

/// Robots linter finding
#[derive(Debug, Clone, Serialize)]
pub struct LintFinding {
    pub code: String,
    pub severity: Severity,
    pub message: String,
}

/// One row of the evidence pack for a non-indexable bot
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceRow {
    pub bot: String,
    pub category: BotCategory,
    pub status_code: Option<u16>,
    pub indexability_reason: String,
    pub waf_detected: bool,
    pub waf_provider: String,
    pub robots_explain: String,
    pub response_sample: String,
}

/// Projection of one allowlist scenario
#[derive(Debug, Clone, Serialize)]
pub struct AllowlistProjection {
    pub scenario: String,
    pub categories: Vec<BotCategory>,
    pub current_indexable: u32,
    pub projected_indexable: u32,
    pub indexable_delta: u32,
    pub current_renderable: u32,
    pub projected_renderable: u32,
    pub renderable_delta: u32,
}

/// One scheme/host variant probed for consistency
#[derive(Debug, Clone, Serialize)]
pub struct HostVariantProbe {
    pub variant: String,
    pub status_code: Option<u16>,
    pub location: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostConsistency {
    pub variants: Vec<HostVariantProbe>,
    pub distinct_statuses: u32,
    pub distinct_redirect_hosts: u32,
    pub inconsistent: bool,
}

/// Informational probe with a realistic desktop browser User-Agent
#[derive(Debug, Clone, Serialize)]
pub struct WafBypassProbe {
    pub user_agent: String,
    pub status_code: Option<u16>,
    pub final_url: Option<String>,
    pub content_type: Option<String>,
    pub response_sample: String,
    pub waf_signal: WafSignal,
    pub error: Option<String>,
}

/// Engine payload under `results`
#[derive(Debug, Clone, Serialize)]
pub struct EngineResults {
    pub engine: String,
    pub domain: String,
    pub retry_profile: String,
    pub criticality_profile: String,
    pub sla_profile: String,
    pub ai_block_expected: bool,
    pub bots_checked: Vec<String>,
    pub selected_bot_groups: Vec<String>,
    pub bot_results: BTreeMap<String, BotResultCompact>,
    pub bot_rows: Vec<ProbeResult>,
    pub summary: Summary,
    pub robots: RobotsReport,
    pub host_consistency: HostConsistency,
    pub waf_bypass_probe: Option<WafBypassProbe>,
    pub category_stats: Vec<CategoryStat>,
    pub sla_dashboard: Vec<SlaRow>,
    pub priority_blockers: Vec<PriorityBlocker>,
    pub playbooks: Vec<Playbook>,
    pub action_center: BTreeMap<String, Vec<Playbook>>,
    pub allowlist_simulator: Vec<AllowlistProjection>,
    pub robots_linter: Vec<LintFinding>,
    pub evidence_pack: Vec<EvidenceRow>,
    pub baseline_diff: BaselineDiff,
    pub trend: TrendReport,
    pub alerts: Vec<Alert>,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<String>,
}

/// Top-level document handed back to the task layer
#[derive(Debug, Clone, Serialize)]
pub struct ResultDocument {
    pub task_type: String,
    pub url: String,
    pub completed_at: DateTime<Utc>,
    pub results: EngineResults,
}

/// Per-URL row of the batch summary table
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummaryRow {
    pub url: String,
    pub domain: String,
    pub total: u32,
    pub indexable: u32,
    pub non_indexable: u32,
    pub critical_issues: u32,
    pub alerts: usize,
}

/// Merged document returned by batch mode
#[derive(Debug, Clone, Serialize)]
pub struct BatchResultDocument {
    pub task_type: String,
    pub completed_at: DateTime<Utc>,
    pub urls: Vec<String>,
    pub summary_table: Vec<BatchSummaryRow>,
    pub runs: Vec<ResultDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"critical\"");
        assert_eq!(serde_json::to_string(&Severity::Ok).unwrap(), "\"ok\"");
    }

    #[test]
    fn test_summary_round_trips_through_json() {
        let summary = Summary {
            total: 9,
            indexable: 7,
            non_indexable: 2,
            avg_response_time_ms: 120.5,
            ..Summary::default()
        };
        let json = serde_json::to_string(&summary).unwrap();
        let back: Summary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total, 9);
        assert_eq!(back.indexable, 7);
        assert_eq!(back.avg_response_time_ms, 120.5);
    }

    #[test]
    fn test_baseline_diff_absent_marker() {
        let diff = BaselineDiff::absent();
        assert!(!diff.available);
        assert_eq!(diff.reason.as_deref(), Some("baseline_absent"));
        assert!(diff.rows.is_empty());
    }
}
