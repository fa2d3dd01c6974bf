// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::bot::BotCategory;
use crate::models::robots::RobotsEvaluation;
use serde::Serialize;

/// WAF/CDN challenge signal for one response
#[derive(Debug, Clone, Serialize)]
pub struct WafSignal {
    pub detected: bool,
    /// "Cloudflare", "Akamai", "Sucuri", "DDoS-Guard", or "unknown"
    pub provider: String,
    pub reason: String,
    /// 0..1, rounded to two decimal places
    pub confidence: f64,
}

impl WafSignal {
    pub fn none() -> Self {
        Self {
            detected: false,
            provider: "unknown".to_string(),
            reason: "no signal".to_string(),
            confidence: 0.0,
        }
    }

    /// True when the signal is strong enough to call the page non-renderable
    pub fn is_high_confidence(&self) -> bool {
        self.detected && self.confidence >= 0.85
    }
}

/// Everything observed and derived for one bot in one run
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub bot_name: String,
    pub category: BotCategory,
    /// None when the request failed at the transport level
    pub status_code: Option<u16>,
    pub elapsed_ms: u64,
    pub final_url: String,
    pub content_type: Option<String>,
    pub has_content: bool,
    pub x_robots_tag: Option<String>,
    pub meta_robots: Option<String>,
    pub robots_decision: RobotsEvaluation,
    pub waf_signal: WafSignal,
    pub error: Option<String>,
    // Derived by the classifier
    pub accessible: bool,
    pub crawlable: bool,
    pub renderable: bool,
    pub indexable: bool,
    pub x_robots_forbidden: bool,
    pub meta_robots_forbidden: bool,
    /// Set when ai_block_expected demoted this bot's findings
    pub expected_policy_block: bool,
    /// Ordered short codes; contains "indexable" iff indexable is true
    pub indexability_reasons: Vec<String>,
    pub blocked_reasons: Vec<String>,
    /// Plain-text sample of the response body, at most 380 chars
    pub response_sample: String,
}

/// Compact per-bot record for the bot_results map
#[derive(Debug, Clone, Serialize)]
pub struct BotResultCompact {
    pub category: BotCategory,
    pub status_code: Option<u16>,
    pub elapsed_ms: u64,
    pub crawlable: bool,
    pub renderable: bool,
    pub indexable: bool,
    pub indexability_reasons: Vec<String>,
}

impl ProbeResult {
    pub fn compact(&self) -> BotResultCompact {
        BotResultCompact {
            category: self.category,
            status_code: self.status_code,
            elapsed_ms: self.elapsed_ms,
            crawlable: self.crawlable,
            renderable: self.renderable,
            indexable: self.indexable,
            indexability_reasons: self.indexability_reasons.clone(),
        }
    }
}
