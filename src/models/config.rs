// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Per-run audit configuration, provided by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// The page to audit; a missing scheme defaults to https
    pub target_url: String,
    /// Explicit bot names to probe (case-insensitive, unknown names dropped)
    pub selected_bots: Vec<String>,
    /// Named bot groups to expand: "search", "ai", "crawlers"
    pub bot_groups: Vec<String>,
    /// Retry profile name: "strict", "standard", "aggressive"
    pub retry_profile: String,
    /// Criticality weight profile: "balanced", "search_first", "ai_first"
    pub criticality_profile: String,
    /// SLA target profile: "standard", "strict"
    pub sla_profile: String,
    /// When true, AI bots blocked by transport/robots/WAF are treated as an
    /// expected policy outcome rather than a finding
    pub ai_block_expected: bool,
    /// When false the baseline file is not overwritten at run end
    pub baseline_enabled: bool,
    /// When present, run each URL sequentially and merge the documents
    pub batch_urls: Option<Vec<String>>,
    /// Probe worker pool size
    pub concurrency: usize,
    /// Directory that owns bot_baselines/ and bot_trends/
    pub reports_root: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            selected_bots: Vec::new(),
            bot_groups: Vec::new(),
            retry_profile: "standard".to_string(),
            criticality_profile: "balanced".to_string(),
            sla_profile: "standard".to_string(),
            ai_block_expected: false,
            baseline_enabled: true,
            batch_urls: None,
            concurrency: 10,
            reports_root: PathBuf::from("reports"),
        }
    }
}

impl AuditConfig {
    /// Shorthand for auditing a single URL with defaults
    pub fn for_url(url: &str) -> Self {
        Self {
            target_url: url.to_string(),
            ..Self::default()
        }
    }
}

/// Transport retry behavior for one run
#[derive(Debug, Clone, Copy)]
pub struct RetryProfile {
    pub name: &'static str,
    /// Retries after the first attempt
    pub retries: u32,
    /// Backoff base in seconds; sleep is backoff * attempt
    pub backoff_secs: f64,
    /// Per-request timeout
    pub timeout: Duration,
}

impl RetryProfile {
    /// Delay before the given retry attempt (1-based)
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        Duration::from_secs_f64(self.backoff_secs * f64::from(attempt))
    }
}
