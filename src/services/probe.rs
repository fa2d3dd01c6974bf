// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Per-bot probe execution: one GET with the bot's identifying header, then
//! header and HTML field extraction.

use crate::models::bot::BotDefinition;
use crate::models::config::RetryProfile;
use crate::models::probe::{ProbeResult, WafSignal};
use crate::models::robots::RobotsEvaluation;
use crate::services::robots::{evaluate_robots, RobotsTxt};
use crate::services::waf::{detect_waf, WafInput};
use reqwest::header::HeaderMap;
use reqwest::Client;
use scraper::Html;
use std::time::Instant;
use url::Url;

/// Standard browser Accept header sent with every probe
pub const HTML_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// At most this much of the body is read for detection and sampling
pub const BODY_CAP_BYTES: usize = 120 * 1024;

/// Length cap for the plain-text response sample
pub const SAMPLE_MAX_CHARS: usize = 380;

/// Path (plus query string) used for robots evaluation
pub fn path_with_query(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}

fn is_html_like(content_type: Option<&str>) -> bool {
    match content_type {
        Some(ct) => ct.to_lowercase().contains("html"),
        // Some servers omit the header entirely; treat the body as HTML-ish
        None => true,
    }
}

/// Probe the target once for the given bot. Transport failure after the
/// retry budget yields a result with `status_code = None` and `error` set;
/// it never aborts the run.
pub async fn probe_bot(
    client: &Client,
    target: &Url,
    bot: &BotDefinition,
    robots: Option<&RobotsTxt>,
    retry: &RetryProfile,
) -> ProbeResult {
    let started = Instant::now();
    let mut last_error = String::new();

    for attempt in 0..=retry.retries {
        let response = client
            .get(target.clone())
            .header("User-Agent", bot.user_agent)
            .header("Accept", HTML_ACCEPT)
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status().as_u16();
                let retryable = status == 429 || status >= 500;
                if retryable && attempt < retry.retries {
                    tokio::time::sleep(retry.backoff_for_attempt(attempt + 1)).await;
                    continue;
                }
                return build_success_result(bot, target, robots, resp, started).await;
            }
            Err(e) => {
                last_error = e.to_string();
                if attempt < retry.retries {
                    tokio::time::sleep(retry.backoff_for_attempt(attempt + 1)).await;
                }
            }
        }
    }

    build_failure_result(bot, target, robots, last_error, started)
}

/// What one request observed, before classification derives the flags
struct Observation {
    status_code: Option<u16>,
    final_url: String,
    content_type: Option<String>,
    has_content: bool,
    x_robots_tag: Option<String>,
    meta_robots: Option<String>,
    waf_signal: WafSignal,
    error: Option<String>,
    response_sample: String,
}

async fn build_success_result(
    bot: &BotDefinition,
    target: &Url,
    robots: Option<&RobotsTxt>,
    resp: reqwest::Response,
    started: Instant,
) -> ProbeResult {
    let status = resp.status().as_u16();
    let final_url = resp.url().to_string();
    let headers: HeaderMap = resp.headers().clone();
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let x_robots_tag = headers
        .get("x-robots-tag")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let bytes = resp.bytes().await.unwrap_or_default();
    let has_content = !bytes.is_empty();
    let capped = &bytes[..bytes.len().min(BODY_CAP_BYTES)];
    let body_text = String::from_utf8_lossy(capped).to_string();

    let html = is_html_like(content_type.as_deref());
    let (meta_robots, response_sample) = if html && has_content {
        (
            extract_meta_robots(&body_text),
            extract_text_sample(&body_text),
        )
    } else {
        (None, collapse_whitespace(&body_text))
    };

    let waf_signal = detect_waf(WafInput {
        status: Some(status),
        headers: Some(&headers),
        body: if html { Some(&body_text) } else { None },
        error: None,
    });

    let robots_decision = evaluate_robots(robots, bot, &path_with_query(target));

    new_probe_result(
        bot,
        robots_decision,
        started,
        Observation {
            status_code: Some(status),
            final_url,
            content_type,
            has_content,
            x_robots_tag,
            meta_robots,
            waf_signal,
            error: None,
            response_sample,
        },
    )
}

fn build_failure_result(
    bot: &BotDefinition,
    target: &Url,
    robots: Option<&RobotsTxt>,
    error: String,
    started: Instant,
) -> ProbeResult {
    let waf_signal = detect_waf(WafInput {
        status: None,
        headers: None,
        body: None,
        error: Some(&error),
    });
    // With no response there is no meaningful path; evaluate the site root
    let robots_decision = evaluate_robots(robots, bot, "/");

    new_probe_result(
        bot,
        robots_decision,
        started,
        Observation {
            status_code: None,
            final_url: target.to_string(),
            content_type: None,
            has_content: false,
            x_robots_tag: None,
            meta_robots: None,
            waf_signal,
            error: Some(error),
            response_sample: String::new(),
        },
    )
}

fn new_probe_result(
    bot: &BotDefinition,
    robots_decision: RobotsEvaluation,
    started: Instant,
    observed: Observation,
) -> ProbeResult {
    ProbeResult {
        bot_name: bot.name.to_string(),
        category: bot.category,
        status_code: observed.status_code,
        elapsed_ms: started.elapsed().as_millis() as u64,
        final_url: observed.final_url,
        content_type: observed.content_type,
        has_content: observed.has_content,
        x_robots_tag: observed.x_robots_tag,
        meta_robots: observed.meta_robots,
        robots_decision,
        waf_signal: observed.waf_signal,
        error: observed.error,
        accessible: false,
        crawlable: false,
        renderable: false,
        indexable: false,
        x_robots_forbidden: false,
        meta_robots_forbidden: false,
        expected_policy_block: false,
        indexability_reasons: Vec::new(),
        blocked_reasons: Vec::new(),
        response_sample: observed.response_sample,
    }
}

/// First `<meta name="robots" content="...">`, case-insensitive on the name
pub fn extract_meta_robots(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = scraper::Selector::parse("meta") else {
        return None;
    };
    for element in document.select(&selector) {
        let name = element.value().attr("name").unwrap_or("");
        if name.eq_ignore_ascii_case("robots") {
            return element
                .value()
                .attr("content")
                .map(|c| c.trim().to_string());
        }
    }
    None
}

/// Plain-text body sample with script/style content dropped and whitespace
/// collapsed, truncated to SAMPLE_MAX_CHARS
pub fn extract_text_sample(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut text = String::new();
    for node in document.root_element().descendants() {
        let Some(content) = node.value().as_text() else {
            continue;
        };
        let skip = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name().to_string()))
            .map(|name| matches!(name.as_str(), "script" | "style" | "noscript"))
            .unwrap_or(false);
        if skip {
            continue;
        }
        let trimmed = content.trim();
        if !trimmed.is_empty() {
            text.push(' ');
            text.push_str(trimmed);
        }
    }

    truncate_chars(&collapse_whitespace(&text), SAMPLE_MAX_CHARS)
}

fn collapse_whitespace(text: &str) -> String {
    truncate_chars(
        &text.split_whitespace().collect::<Vec<_>>().join(" "),
        SAMPLE_MAX_CHARS,
    )
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
