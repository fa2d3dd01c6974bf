// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Indexability classification: combines probe outcome, robots verdict,
//! directive parsing, and the WAF signal into the derived flags and the
//! ordered reason codes.

use crate::models::probe::ProbeResult;

/// Directive tokens that forbid indexing or constrain it enough to matter
const FORBIDDEN_TOKENS: &[&str] = &[
    "noindex",
    "nofollow",
    "none",
    "noarchive",
    "nosnippet",
    "notranslate",
    "noimageindex",
];

/// True when a raw X-Robots-Tag or meta robots value carries a forbidding
/// token. Values are comma/whitespace tokenized and lowercased.
pub fn directive_forbidden(value: &str) -> bool {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|t| t.trim().to_lowercase())
        .any(|t| FORBIDDEN_TOKENS.contains(&t.as_str()))
}

/// Fill in the derived flags and reason codes on a freshly probed result
pub fn classify_probe(probe: &mut ProbeResult) {
    probe.accessible = matches!(probe.status_code, Some(code) if (200..400).contains(&code));
    probe.x_robots_forbidden = probe
        .x_robots_tag
        .as_deref()
        .map(directive_forbidden)
        .unwrap_or(false);
    probe.meta_robots_forbidden = probe
        .meta_robots
        .as_deref()
        .map(directive_forbidden)
        .unwrap_or(false);

    let robots_disallowed = probe.robots_decision.allowed.is_disallowed();
    let high_waf = probe.waf_signal.is_high_confidence();

    probe.crawlable = probe.accessible && !robots_disallowed;
    probe.renderable = probe.crawlable && probe.has_content && !high_waf;
    probe.indexable =
        probe.renderable && !probe.x_robots_forbidden && !probe.meta_robots_forbidden;

    let mut reasons = Vec::new();
    match probe.status_code {
        None => reasons.push("transport_failure".to_string()),
        Some(code) if !probe.accessible => reasons.push(format!("http_{}", code)),
        _ => {}
    }
    if robots_disallowed {
        reasons.push("robots_disallow".to_string());
    }
    if probe.x_robots_forbidden {
        reasons.push("x_robots_forbidden".to_string());
    }
    if probe.meta_robots_forbidden {
        reasons.push("meta_robots_forbidden".to_string());
    }
    if probe.accessible && !probe.has_content {
        reasons.push("empty_content".to_string());
    }
    if high_waf {
        reasons.push("high_confidence_waf_challenge".to_string());
    }
    if reasons.is_empty() {
        reasons.push("indexable".to_string());
    }
    probe.indexability_reasons = reasons;

    let mut blocked = Vec::new();
    if probe.status_code.is_none() {
        blocked.push("transport_failure".to_string());
    }
    if robots_disallowed {
        blocked.push("robots_disallow".to_string());
    }
    if probe.x_robots_forbidden || probe.meta_robots_forbidden {
        blocked.push("indexing_directive".to_string());
    }
    if probe.accessible && !probe.has_content {
        blocked.push("empty_content".to_string());
    }
    if probe.waf_signal.detected {
        blocked.push("waf_challenge".to_string());
    }
    probe.blocked_reasons = blocked;
}
