// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! robots.txt fetching, parsing, and longest-match evaluation.
//!
//! Group selection tokenizes the bot identity and scores each group's
//! user-agent strings; rule selection applies longest-match precedence with
//! Allow winning ties, the way major crawlers resolve conflicts.

use crate::models::bot::BotDefinition;
use crate::models::config::RetryProfile;
use crate::models::report::{LintFinding, Severity};
use crate::models::robots::{RobotsAllowed, RobotsEvaluation};
use regex::Regex;
use reqwest::Client;
use url::Url;

/// Neutral browser-like identity used for the robots.txt fetch itself
pub const NEUTRAL_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Outcome of the robots.txt fetch. `text` is only set for HTTP 200.
#[derive(Debug, Clone)]
pub struct RobotsFetch {
    pub text: Option<String>,
    pub status_code: Option<u16>,
}

/// Fetch `<scheme>://<host>/robots.txt`, retrying on 429/5xx per the retry
/// profile. Never fails the run.
pub async fn fetch_robots_txt(client: &Client, target: &Url, retry: &RetryProfile) -> RobotsFetch {
    let robots_url = match target.join("/robots.txt") {
        Ok(u) => u,
        Err(e) => {
            eprintln!("Cannot build robots.txt URL for {}: {}", target, e);
            return RobotsFetch {
                text: None,
                status_code: None,
            };
        }
    };

    for attempt in 0..=retry.retries {
        let response = client
            .get(robots_url.clone())
            .header("User-Agent", NEUTRAL_UA)
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
                let text = if status == 200 {
                    resp.text().await.ok()
                } else {
                    None
                };
                return RobotsFetch {
                    text,
                    status_code: Some(status),
                };
            }
            Err(e) => {
                if attempt < retry.retries {
                    tokio::time::sleep(retry.backoff_for_attempt(attempt + 1)).await;
                    continue;
                }
                eprintln!("robots.txt fetch failed for {}: {}", robots_url, e);
            }
        }
    }
    RobotsFetch {
        text: None,
        status_code: None,
    }
}

/// One Allow/Disallow rule with its precompiled matcher
#[derive(Debug, Clone)]
pub struct RobotsRule {
    pub allow: bool,
    pub pattern: String,
    matcher: Option<Regex>,
}

impl RobotsRule {
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.is_match(path))
    }

    /// Pattern length with wildcards removed; the longest-match tiebreaker
    pub fn literal_len(&self) -> usize {
        self.pattern.replace('*', "").len()
    }
}

/// A user-agent group: successive User-agent lines share the group until a
/// rule intervenes
#[derive(Debug, Clone)]
pub struct RobotsGroup {
    pub agents: Vec<String>,
    pub rules: Vec<RobotsRule>,
}

/// Parsed robots.txt
#[derive(Debug, Clone, Default)]
pub struct RobotsTxt {
    pub groups: Vec<RobotsGroup>,
    pub sitemaps: Vec<String>,
    pub has_crawl_delay: bool,
}

/// Convert a robots pattern to an anchored regex: literals escaped, `*` as
/// `.*`, trailing `$` anchors the end, otherwise prefix semantics.
fn compile_pattern(pattern: &str) -> Option<Regex> {
    let (body, anchored) = match pattern.strip_suffix('$') {
        Some(body) => (body, true),
        None => (pattern, false),
    };
    let mut expr = String::from("^");
    for (i, part) in body.split('*').enumerate() {
        if i > 0 {
            expr.push_str(".*");
        }
        expr.push_str(&regex::escape(part));
    }
    if anchored {
        expr.push('$');
    }
    Regex::new(&expr).ok()
}

/// Parse robots.txt text. Comments and unknown directives are skipped;
/// Sitemap and Crawl-delay presence are retained for reporting.
pub fn parse_robots_txt(text: &str) -> RobotsTxt {
    let mut parsed = RobotsTxt::default();
    let mut current: Option<RobotsGroup> = None;
    let mut last_was_agent = false;

    for raw in text.lines() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                if !last_was_agent {
                    if let Some(group) = current.take() {
                        parsed.groups.push(group);
                    }
                    current = Some(RobotsGroup {
                        agents: Vec::new(),
                        rules: Vec::new(),
                    });
                }
                if let Some(group) = current.as_mut() {
                    group.agents.push(value.to_string());
                }
                last_was_agent = true;
            }
            "allow" | "disallow" => {
                if let Some(group) = current.as_mut() {
                    group.rules.push(RobotsRule {
                        allow: key == "allow",
                        pattern: value.to_string(),
                        matcher: compile_pattern(value),
                    });
                }
                last_was_agent = false;
            }
            "sitemap" => {
                parsed.sitemaps.push(value.to_string());
                last_was_agent = false;
            }
            "crawl-delay" => {
                parsed.has_crawl_delay = true;
                last_was_agent = false;
            }
            _ => {
                last_was_agent = false;
            }
        }
    }
    if let Some(group) = current.take() {
        parsed.groups.push(group);
    }
    parsed
}

/// Lowercase alphanumeric segments of a string, short noise dropped
fn tokenize(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| t.len() >= 2)
        .map(|t| t.to_string())
        .collect()
}

/// Strings a group agent can match against: the bot name, the UA product
/// prefix before '/', and the alphanumeric tokens of both
fn bot_candidates(bot: &BotDefinition) -> Vec<String> {
    let mut candidates = vec![bot.name.to_lowercase()];
    let prefix = bot
        .user_agent
        .split('/')
        .next()
        .unwrap_or(bot.user_agent)
        .trim()
        .to_lowercase();
    if !prefix.is_empty() {
        candidates.push(prefix);
    }
    candidates.extend(tokenize(bot.name));
    candidates.extend(tokenize(bot.user_agent));
    candidates.sort();
    candidates.dedup();
    candidates
}

/// Score one group agent string against the bot's candidate strings:
/// exact match 100 + len, containment 40-60 + len, `*` scores 1, miss -1
fn score_agent(agent: &str, candidates: &[String]) -> i64 {
    let agent = agent.trim().to_lowercase();
    if agent == "*" {
        return 1;
    }
    if agent.is_empty() {
        return -1;
    }
    let len = agent.len() as i64;
    let mut best = -1;
    for candidate in candidates {
        let score = if *candidate == agent {
            100 + len
        } else if candidate.contains(&agent) {
            60 + len
        } else if candidate.len() >= 4 && agent.contains(candidate.as_str()) {
            // Short generic tokens ("bot", "com") would cross-match here
            40 + len
        } else {
            -1
        };
        best = best.max(score);
    }
    best
}

/// Select the best-matching group for a bot, returning the group and the
/// agent string that won. None when no group scores >= 0.
pub fn select_group<'a>(
    robots: &'a RobotsTxt,
    bot: &BotDefinition,
) -> Option<(&'a RobotsGroup, &'a str)> {
    let candidates = bot_candidates(bot);
    let mut best: Option<(&RobotsGroup, &str, i64)> = None;
    for group in &robots.groups {
        for agent in &group.agents {
            let score = score_agent(agent, &candidates);
            if score < 0 {
                continue;
            }
            let better = match best {
                None => true,
                Some((_, _, s)) => score > s,
            };
            if better {
                best = Some((group, agent.as_str(), score));
            }
        }
    }
    best.map(|(group, agent, _)| (group, agent))
}

/// Evaluate robots.txt for one bot and one path (including query string).
///
/// Among matching rules the longest literal pattern wins; equal lengths with
/// differing directives resolve Allow over Disallow; no matching rule
/// defaults to allowed.
pub fn evaluate_robots(
    robots: Option<&RobotsTxt>,
    bot: &BotDefinition,
    path: &str,
) -> RobotsEvaluation {
    let Some(robots) = robots else {
        return RobotsEvaluation::unavailable();
    };
    let Some((group, agent)) = select_group(robots, bot) else {
        return RobotsEvaluation::no_matching_group();
    };

    let mut best: Option<&RobotsRule> = None;
    for rule in &group.rules {
        if !rule.matches(path) {
            continue;
        }
        match best {
            None => best = Some(rule),
            Some(current) => {
                let (cur_len, new_len) = (current.literal_len(), rule.literal_len());
                if new_len > cur_len || (new_len == cur_len && rule.allow && !current.allow) {
                    best = Some(rule);
                }
            }
        }
    }

    match best {
        None => RobotsEvaluation {
            allowed: RobotsAllowed::Allowed,
            matched_user_agent: Some(agent.to_string()),
            matched_rule: "none".to_string(),
            matched_pattern: None,
            explain: format!(
                "no rules matched path '{}' in group '{}', default allow",
                path, agent
            ),
        },
        Some(rule) => {
            let verdict = if rule.allow {
                RobotsAllowed::Allowed
            } else {
                RobotsAllowed::Disallowed
            };
            let directive = if rule.allow { "allow" } else { "disallow" };
            RobotsEvaluation {
                allowed: verdict,
                matched_user_agent: Some(agent.to_string()),
                matched_rule: directive.to_string(),
                matched_pattern: Some(rule.pattern.clone()),
                explain: format!(
                    "{} '{}' matched path '{}' for user-agent group '{}'",
                    directive, rule.pattern, path, agent
                ),
            }
        }
    }
}

/// Static robots.txt checks surfaced in the result document
pub fn lint_robots(fetch: &RobotsFetch, parsed: Option<&RobotsTxt>) -> Vec<LintFinding> {
    let Some(parsed) = parsed.filter(|_| fetch.text.is_some()) else {
        return vec![LintFinding {
            code: "robots_missing".to_string(),
            severity: Severity::Warning,
            message: "robots.txt could not be fetched; every bot gets an unknown verdict"
                .to_string(),
        }];
    };

    let mut findings = Vec::new();

    let wildcard_blocks_all = parsed.groups.iter().any(|g| {
        g.agents.iter().any(|a| a.trim() == "*")
            && g.rules.iter().any(|r| !r.allow && r.pattern == "/")
    });
    if wildcard_blocks_all {
        findings.push(LintFinding {
            code: "wildcard_full_disallow".to_string(),
            severity: Severity::Critical,
            message: "'Disallow: /' under 'User-agent: *' blocks the whole site for every bot"
                .to_string(),
        });
    }

    if parsed.has_crawl_delay {
        findings.push(LintFinding {
            code: "crawl_delay_present".to_string(),
            severity: Severity::Info,
            message: "Crawl-delay is ignored by most major crawlers".to_string(),
        });
    }

    let has_agent = |needle: &str| {
        parsed
            .groups
            .iter()
            .any(|g| g.agents.iter().any(|a| a.to_lowercase().contains(needle)))
    };
    if !has_agent("googlebot") {
        findings.push(LintFinding {
            code: "no_googlebot_group".to_string(),
            severity: Severity::Info,
            message: "No explicit Googlebot group; Googlebot follows the '*' rules".to_string(),
        });
    }
    if !has_agent("yandex") {
        findings.push(LintFinding {
            code: "no_yandex_group".to_string(),
            severity: Severity::Info,
            message: "No explicit Yandex group; Yandex bots follow the '*' rules".to_string(),
        });
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bot::BotCategory;

    fn googlebot() -> BotDefinition {
        BotDefinition {
            name: "Googlebot",
            user_agent: "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
            category: BotCategory::Google,
        }
    }

    fn gptbot() -> BotDefinition {
        BotDefinition {
            name: "GPTBot",
            user_agent: "Mozilla/5.0; compatible; GPTBot/1.2; +https://openai.com/gptbot",
            category: BotCategory::Ai,
        }
    }

    #[test]
    fn test_parse_successive_agents_share_group() {
        let parsed = parse_robots_txt("User-agent: a\nUser-agent: b\nDisallow: /x\n");
        assert_eq!(parsed.groups.len(), 1);
        assert_eq!(parsed.groups[0].agents, vec!["a", "b"]);
        assert_eq!(parsed.groups[0].rules.len(), 1);
    }

    #[test]
    fn test_parse_agent_after_rule_starts_new_group() {
        let parsed =
            parse_robots_txt("User-agent: a\nDisallow: /x\nUser-agent: b\nAllow: /\n");
        assert_eq!(parsed.groups.len(), 2);
        assert_eq!(parsed.groups[1].agents, vec!["b"]);
    }

    #[test]
    fn test_parse_strips_comments_and_collects_sitemaps() {
        let parsed = parse_robots_txt(
            "# header\nUser-agent: * # everyone\nDisallow: /private # hidden\nSitemap: https://example.com/sitemap.xml\nCrawl-delay: 5\n",
        );
        assert_eq!(parsed.groups.len(), 1);
        assert_eq!(parsed.groups[0].rules[0].pattern, "/private");
        assert_eq!(parsed.sitemaps, vec!["https://example.com/sitemap.xml"]);
        assert!(parsed.has_crawl_delay);
    }

    #[test]
    fn test_unreachable_robots_is_unknown() {
        let eval = evaluate_robots(None, &googlebot(), "/");
        assert_eq!(eval.allowed, RobotsAllowed::Unknown);
    }

    #[test]
    fn test_no_matching_group_is_unknown() {
        let parsed = parse_robots_txt("User-agent: SomethingElse\nDisallow: /\n");
        let eval = evaluate_robots(Some(&parsed), &gptbot(), "/");
        assert_eq!(eval.allowed, RobotsAllowed::Unknown);
        assert_eq!(eval.explain, "no matching user-agent group");
    }

    #[test]
    fn test_exact_group_beats_wildcard() {
        let parsed =
            parse_robots_txt("User-agent: *\nAllow: /\nUser-agent: Googlebot\nDisallow: /\n");
        let eval = evaluate_robots(Some(&parsed), &googlebot(), "/");
        assert_eq!(eval.allowed, RobotsAllowed::Disallowed);
        assert_eq!(eval.matched_user_agent.as_deref(), Some("Googlebot"));
    }

    #[test]
    fn test_wildcard_group_applies_to_everyone() {
        let parsed = parse_robots_txt("User-agent: *\nDisallow: /private\n");
        let eval = evaluate_robots(Some(&parsed), &gptbot(), "/private/data");
        assert_eq!(eval.allowed, RobotsAllowed::Disallowed);
        let eval = evaluate_robots(Some(&parsed), &gptbot(), "/public");
        assert_eq!(eval.allowed, RobotsAllowed::Allowed);
        assert_eq!(eval.matched_rule, "none");
    }

    #[test]
    fn test_longest_literal_match_wins() {
        let parsed =
            parse_robots_txt("User-agent: *\nDisallow: /shop\nAllow: /shop/public\n");
        let eval = evaluate_robots(Some(&parsed), &googlebot(), "/shop/public/item");
        assert_eq!(eval.allowed, RobotsAllowed::Allowed);
        assert_eq!(eval.matched_pattern.as_deref(), Some("/shop/public"));
    }

    #[test]
    fn test_equal_length_allow_wins_over_disallow() {
        let parsed = parse_robots_txt("User-agent: *\nDisallow: /foo\nAllow: /foo\n");
        let eval = evaluate_robots(Some(&parsed), &googlebot(), "/foo");
        assert_eq!(eval.allowed, RobotsAllowed::Allowed);
    }

    #[test]
    fn test_wildcard_in_pattern() {
        let parsed = parse_robots_txt("User-agent: *\nDisallow: /*.pdf$\n");
        let eval = evaluate_robots(Some(&parsed), &googlebot(), "/docs/manual.pdf");
        assert_eq!(eval.allowed, RobotsAllowed::Disallowed);
        let eval = evaluate_robots(Some(&parsed), &googlebot(), "/docs/manual.pdf.html");
        assert_eq!(eval.allowed, RobotsAllowed::Allowed);
    }

    #[test]
    fn test_query_string_participates_in_matching() {
        let parsed = parse_robots_txt("User-agent: *\nDisallow: /*?session=\n");
        let eval = evaluate_robots(Some(&parsed), &googlebot(), "/page?session=abc");
        assert_eq!(eval.allowed, RobotsAllowed::Disallowed);
        let eval = evaluate_robots(Some(&parsed), &googlebot(), "/page");
        assert_eq!(eval.allowed, RobotsAllowed::Allowed);
    }

    #[test]
    fn test_smartphone_variant_matches_googlebot_group() {
        let smartphone = BotDefinition {
            name: "Googlebot-Smartphone",
            user_agent: "Mozilla/5.0 (Linux; Android 6.0.1) (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
            category: BotCategory::Google,
        };
        let parsed = parse_robots_txt("User-agent: Googlebot\nDisallow: /\n");
        let eval = evaluate_robots(Some(&parsed), &smartphone, "/");
        assert_eq!(eval.allowed, RobotsAllowed::Disallowed);
    }

    #[test]
    fn test_generic_url_tokens_do_not_cross_match() {
        // The "/bot" URL segment in the UA must not pull this bot into an
        // unrelated Googlebot group
        let chatgpt = BotDefinition {
            name: "ChatGPT-User",
            user_agent: "Mozilla/5.0; compatible; ChatGPT-User/1.0; +https://openai.com/bot",
            category: BotCategory::Ai,
        };
        let parsed = parse_robots_txt("User-agent: Googlebot\nDisallow: /\n");
        let eval = evaluate_robots(Some(&parsed), &chatgpt, "/");
        assert_eq!(eval.allowed, RobotsAllowed::Unknown);
    }

    #[test]
    fn test_empty_robots_has_no_groups() {
        let parsed = parse_robots_txt("");
        assert!(parsed.groups.is_empty());
        let eval = evaluate_robots(Some(&parsed), &googlebot(), "/");
        assert_eq!(eval.allowed, RobotsAllowed::Unknown);
    }

    #[test]
    fn test_lint_flags_wildcard_full_disallow() {
        let parsed = parse_robots_txt("User-agent: *\nDisallow: /\nCrawl-delay: 10\n");
        let fetch = RobotsFetch {
            text: Some(String::new()),
            status_code: Some(200),
        };
        let findings = lint_robots(&fetch, Some(&parsed));
        assert!(findings
            .iter()
            .any(|f| f.code == "wildcard_full_disallow" && f.severity == Severity::Critical));
        assert!(findings.iter().any(|f| f.code == "crawl_delay_present"));
        assert!(findings.iter().any(|f| f.code == "no_googlebot_group"));
    }

    #[test]
    fn test_lint_reports_missing_robots() {
        let fetch = RobotsFetch {
            text: None,
            status_code: Some(404),
        };
        let findings = lint_robots(&fetch, None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "robots_missing");
        assert_eq!(findings[0].severity, Severity::Warning);
    }
}
