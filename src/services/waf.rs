// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! WAF/CDN challenge detection.
//!
//! Weighs header fingerprints, body markers, status codes, and transport
//! errors into a single confidence score. Weak body markers alone never fire
//! so normal pages mentioning "forbidden" or "security" stay clean.

use crate::models::probe::WafSignal;
use reqwest::header::HeaderMap;

/// Body markers that identify a challenge page outright
const STRONG_MARKERS: &[&str] = &[
    "attention required",
    "verify you are human",
    "captcha",
    "cf-chl",
    "cloudflare ray id",
    "ddos protection by",
    "sucuri website firewall",
];

/// Body markers that only count together with a restrictive status or a
/// provider fingerprint
const WEAK_MARKERS: &[&str] = &[
    "access denied",
    "request blocked",
    "security check",
    "automated queries",
    "forbidden",
];

/// Inputs for one detection pass
#[derive(Debug, Default)]
pub struct WafInput<'a> {
    pub status: Option<u16>,
    pub headers: Option<&'a HeaderMap>,
    /// Leading slice of the body, HTML responses only
    pub body: Option<&'a str>,
    pub error: Option<&'a str>,
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Provider fingerprint from response headers: (provider, confidence, reason)
fn provider_hint(headers: &HeaderMap) -> Option<(&'static str, f64, String)> {
    let server = header_value(headers, "server")
        .unwrap_or("")
        .to_lowercase();

    if headers.contains_key("cf-ray") || server.contains("cloudflare") {
        return Some(("Cloudflare", 0.30, "cloudflare header fingerprint".to_string()));
    }
    if server.contains("akamai") || headers.contains_key("akamai-grn") {
        return Some(("Akamai", 0.25, "akamai header fingerprint".to_string()));
    }
    if headers.contains_key("x-sucuri-id") || headers.contains_key("x-sucuri-cache") {
        return Some(("Sucuri", 0.30, "sucuri header fingerprint".to_string()));
    }
    if server.contains("ddos-guard") || headers.contains_key("x-ddos-protection") {
        return Some(("DDoS-Guard", 0.25, "ddos-protection header fingerprint".to_string()));
    }
    None
}

/// Weigh all signals and return the challenge verdict.
/// `detected` fires at confidence >= 0.7.
pub fn detect_waf(input: WafInput<'_>) -> WafSignal {
    let mut provider: Option<&'static str> = None;
    // (confidence, reason) candidates; the maximum wins
    let mut candidates: Vec<(f64, String)> = Vec::new();

    if let Some(headers) = input.headers {
        if let Some((name, confidence, reason)) = provider_hint(headers) {
            provider = Some(name);
            candidates.push((confidence, reason));
        }
    }

    let body = input.body.map(|b| b.to_lowercase());
    if let Some(body) = &body {
        for marker in STRONG_MARKERS {
            if body.contains(marker) {
                candidates.push((0.90, format!("challenge marker '{}' in body", marker)));
                break;
            }
        }
        let restrictive = matches!(input.status, Some(401 | 403 | 429 | 503));
        for marker in WEAK_MARKERS {
            if !body.contains(marker) {
                continue;
            }
            if restrictive {
                candidates.push((
                    0.75,
                    format!("block marker '{}' with restrictive status", marker),
                ));
            } else if provider.is_some() {
                candidates.push((0.45, format!("block marker '{}' behind known provider", marker)));
            }
            break;
        }
    }

    if let Some(error) = input.error {
        let error_lower = error.to_lowercase();
        if ["tls", "ssl", "certificate", "handshake"]
            .iter()
            .any(|m| error_lower.contains(m))
        {
            candidates.push((0.65, "TLS handshake failure".to_string()));
        }
        if error_lower.contains("429") || error_lower.contains("too many requests") {
            candidates.push((0.70, "rate limited (429)".to_string()));
        }
    }

    match input.status {
        Some(429) => candidates.push((0.70, "HTTP 429 rate limiting".to_string())),
        Some(code @ (401 | 403)) => {
            candidates.push((0.80, format!("restrictive HTTP {}", code)));
        }
        _ => {}
    }

    let (confidence, reason) = candidates
        .into_iter()
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .unwrap_or((0.0, "no signal".to_string()));
    let confidence = (confidence * 100.0).round() / 100.0;

    WafSignal {
        detected: confidence >= 0.7,
        provider: provider.unwrap_or("unknown").to_string(),
        reason,
        confidence,
    }
}
