// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Aggregation over classified probe results: category stats, SLA rows,
//! priority blockers, playbooks, the allowlist simulator, evidence pack,
//! issues, recommendations, and the summary counters.

use crate::models::bot::BotCategory;
use crate::models::probe::ProbeResult;
use crate::models::report::{
    AllowlistProjection, CategoryStat, EvidenceRow, Issue, Playbook, PriorityBlocker, Severity,
    SlaRow, Summary,
};
use crate::services::profiles::{criticality_weight, sla_target_pct};
use std::collections::BTreeMap;

const BLOCKER_CODES: &[&str] = &[
    "unreachable",
    "robots_disallow",
    "empty_content",
    "indexing_directive",
    "waf_challenge",
];

const EVIDENCE_MAX_ROWS: usize = 100;
const SAMPLE_BOTS_MAX: usize = 8;

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Mark AI-category probes whose block is the declared policy outcome.
/// Must run before blockers, issues, and the summary are built.
pub fn apply_policy_exemption(results: &mut [ProbeResult], ai_block_expected: bool) {
    if !ai_block_expected {
        return;
    }
    for probe in results.iter_mut() {
        if probe.category != BotCategory::Ai {
            continue;
        }
        let policy_blocked = probe.status_code.is_none()
            || probe.robots_decision.allowed.is_disallowed()
            || probe.waf_signal.detected;
        if policy_blocked {
            probe.expected_policy_block = true;
        }
    }
}

/// Per-category rollup in canonical category order
pub fn category_stats(
    results: &[ProbeResult],
    criticality_profile: &str,
    sla_profile: &str,
) -> Vec<CategoryStat> {
    let mut stats = Vec::new();
    for category in BotCategory::ALL {
        let in_category: Vec<&ProbeResult> =
            results.iter().filter(|p| p.category == category).collect();
        if in_category.is_empty() {
            continue;
        }
        let total = in_category.len() as u32;
        let count =
            |f: fn(&&ProbeResult) -> bool| in_category.iter().copied().filter(f).count() as u32;
        let indexable = count(|p| p.indexable);
        let non_indexable = total - indexable;
        let weight = criticality_weight(criticality_profile, category);
        let target = sla_target_pct(sla_profile, category);
        let indexable_pct = round1(f64::from(indexable) / f64::from(total) * 100.0);
        stats.push(CategoryStat {
            category,
            total,
            accessible: count(|p| p.accessible),
            with_content: count(|p| p.has_content),
            crawlable: count(|p| p.crawlable),
            renderable: count(|p| p.renderable),
            indexable,
            non_indexable,
            indexable_pct,
            criticality_weight: weight,
            sla_target_pct: target,
            sla_met: indexable_pct >= target,
            priority_risk_score: round1(
                f64::from(non_indexable) / f64::from(total) * 100.0 * weight,
            ),
            restrictive_directives: count(|p| p.x_robots_forbidden || p.meta_robots_forbidden),
        });
    }
    stats
}

pub fn sla_dashboard(stats: &[CategoryStat]) -> Vec<SlaRow> {
    stats
        .iter()
        .map(|s| SlaRow {
            category: s.category,
            indexable_pct: s.indexable_pct,
            sla_target_pct: s.sla_target_pct,
            sla_met: s.sla_met,
            status: if s.sla_met { "met" } else { "missed" }.to_string(),
        })
        .collect()
}

/// Blocker buckets one probe falls into. Transport failure takes precedence
/// and excludes everything else.
fn blocker_codes(probe: &ProbeResult) -> Vec<&'static str> {
    if probe.status_code.is_none() {
        return vec!["unreachable"];
    }
    let mut codes = Vec::new();
    if probe.robots_decision.allowed.is_disallowed() {
        codes.push("robots_disallow");
    }
    if probe.accessible && !probe.has_content {
        codes.push("empty_content");
    }
    if probe.x_robots_forbidden || probe.meta_robots_forbidden {
        codes.push("indexing_directive");
    }
    if probe.waf_signal.detected {
        codes.push("waf_challenge");
    }
    codes
}

fn blocker_title(code: &str) -> (&'static str, &'static str) {
    match code {
        "unreachable" => (
            "Target unreachable for some bots",
            "Transport-level failures prevented any response for these bots.",
        ),
        "robots_disallow" => (
            "robots.txt blocks the audited path",
            "Matched Disallow rules prevent these bots from crawling the page.",
        ),
        "empty_content" => (
            "Empty response body",
            "The page answered but served these bots no content to index.",
        ),
        "indexing_directive" => (
            "Forbidding indexing directives",
            "X-Robots-Tag or the robots meta tag forbids indexing for these bots.",
        ),
        _ => (
            "WAF/CDN challenge intercepts bots",
            "A firewall or CDN serves challenge pages instead of the real content.",
        ),
    }
}

/// Priority blockers sorted by weighted score. When `ai_block_expected` is
/// set, AI-category bots never surface here; their block is the declared
/// policy, not a finding.
pub fn priority_blockers(
    results: &[ProbeResult],
    criticality_profile: &str,
    ai_block_expected: bool,
) -> Vec<PriorityBlocker> {
    let mut blockers = Vec::new();
    for code in BLOCKER_CODES {
        let affected: Vec<&ProbeResult> = results
            .iter()
            .filter(|p| !(ai_block_expected && p.category == BotCategory::Ai))
            .filter(|p| blocker_codes(p).contains(code))
            .collect();
        if affected.is_empty() {
            continue;
        }
        let weighted_impact = round2(
            affected
                .iter()
                .map(|p| criticality_weight(criticality_profile, p.category))
                .sum(),
        );
        let (title, details) = blocker_title(code);
        blockers.push(PriorityBlocker {
            code: (*code).to_string(),
            title: title.to_string(),
            details: details.to_string(),
            affected_bots: affected.len() as u32,
            weighted_impact,
            priority_score: round1(weighted_impact * 10.0),
            sample_bots: affected
                .iter()
                .take(SAMPLE_BOTS_MAX)
                .map(|p| p.bot_name.clone())
                .collect(),
        });
    }
    blockers.sort_by(|a, b| {
        b.priority_score
            .total_cmp(&a.priority_score)
            .then(b.affected_bots.cmp(&a.affected_bots))
    });
    blockers
}

/// Static owner/title/action templates, emitted only for fired blockers
pub fn playbooks_for(blockers: &[PriorityBlocker]) -> Vec<Playbook> {
    blockers
        .iter()
        .map(|b| {
            let (owner, title, action) = match b.code.as_str() {
                "unreachable" => (
                    "Infrastructure",
                    "Restore reachability for failing bots",
                    "Check DNS, TLS certificates, and firewall rules for the bot networks that received no response.",
                ),
                "robots_disallow" => (
                    "SEO",
                    "Review robots.txt disallow rules",
                    "Relax the matched Disallow patterns or add explicit Allow rules for bots that should index this page.",
                ),
                "empty_content" => (
                    "Engineering",
                    "Serve content to bot user agents",
                    "Make sure server-side rendering returns a non-empty HTML body for bot identities.",
                ),
                "indexing_directive" => (
                    "SEO",
                    "Remove forbidding indexing directives",
                    "Drop noindex/nofollow values from X-Robots-Tag and the robots meta tag on pages that should rank.",
                ),
                _ => (
                    "Infrastructure",
                    "Allowlist verified crawlers in the WAF/CDN",
                    "Add verified bot signatures to the WAF allowlist so challenge pages are not served to them.",
                ),
            };
            Playbook {
                code: b.code.clone(),
                owner: owner.to_string(),
                title: title.to_string(),
                action: action.to_string(),
            }
        })
        .collect()
}

pub fn action_center(playbooks: &[Playbook]) -> BTreeMap<String, Vec<Playbook>> {
    let mut grouped: BTreeMap<String, Vec<Playbook>> = BTreeMap::new();
    for playbook in playbooks {
        grouped
            .entry(playbook.owner.clone())
            .or_default()
            .push(playbook.clone());
    }
    grouped
}

/// Would this bot index the page if transport/robots/WAF blocks were lifted?
/// Directives and empty bodies are content properties an allowlist cannot fix.
fn projected_indexable(probe: &ProbeResult) -> bool {
    if probe.indexable {
        return true;
    }
    if probe.status_code.is_none() {
        return true;
    }
    let accessible_if_permitted = probe.accessible || probe.waf_signal.detected;
    let content_if_permitted = probe.has_content || probe.waf_signal.detected;
    accessible_if_permitted
        && content_if_permitted
        && !probe.x_robots_forbidden
        && !probe.meta_robots_forbidden
}

fn projected_renderable(probe: &ProbeResult) -> bool {
    if probe.renderable {
        return true;
    }
    if probe.status_code.is_none() {
        return true;
    }
    (probe.accessible || probe.waf_signal.detected)
        && (probe.has_content || probe.waf_signal.detected)
}

/// Project indexable/renderable counts per scenario assuming every blocked
/// bot in the scenario's categories becomes permitted
pub fn allowlist_simulator(results: &[ProbeResult]) -> Vec<AllowlistProjection> {
    let scenarios: &[(&str, &[BotCategory])] = &[
        ("AI", &[BotCategory::Ai]),
        (
            "Search",
            &[
                BotCategory::Google,
                BotCategory::Yandex,
                BotCategory::Bing,
                BotCategory::Search,
            ],
        ),
        ("Google", &[BotCategory::Google]),
        ("Yandex", &[BotCategory::Yandex]),
        ("Bing", &[BotCategory::Bing]),
    ];

    scenarios
        .iter()
        .map(|(name, categories)| {
            let in_scope: Vec<&ProbeResult> = results
                .iter()
                .filter(|p| categories.contains(&p.category))
                .collect();
            let current_indexable = in_scope.iter().filter(|p| p.indexable).count() as u32;
            let projected_idx =
                in_scope.iter().filter(|p| projected_indexable(p)).count() as u32;
            let current_renderable = in_scope.iter().filter(|p| p.renderable).count() as u32;
            let projected_render =
                in_scope.iter().filter(|p| projected_renderable(p)).count() as u32;
            AllowlistProjection {
                scenario: (*name).to_string(),
                categories: categories.to_vec(),
                current_indexable,
                projected_indexable: projected_idx,
                indexable_delta: projected_idx - current_indexable,
                current_renderable,
                projected_renderable: projected_render,
                renderable_delta: projected_render - current_renderable,
            }
        })
        .collect()
}

/// Per-bot evidence for every non-indexable probe, truncated to 100 rows
pub fn evidence_pack(results: &[ProbeResult]) -> Vec<EvidenceRow> {
    results
        .iter()
        .filter(|p| !p.indexable)
        .take(EVIDENCE_MAX_ROWS)
        .map(|p| EvidenceRow {
            bot: p.bot_name.clone(),
            category: p.category,
            status_code: p.status_code,
            indexability_reason: p
                .indexability_reasons
                .first()
                .cloned()
                .unwrap_or_default(),
            waf_detected: p.waf_signal.detected,
            waf_provider: p.waf_signal.provider.clone(),
            robots_explain: p.robots_decision.explain.clone(),
            response_sample: p.response_sample.clone(),
        })
        .collect()
}

fn demote(issue: Issue, probe: &ProbeResult) -> Issue {
    if !probe.expected_policy_block {
        return issue;
    }
    Issue {
        severity: Severity::Info,
        title: format!("Expected policy block: {}", issue.title),
        ..issue
    }
}

fn probe_issues(probe: &ProbeResult) -> Vec<Issue> {
    let mut issues = Vec::new();
    let base = |severity, code: &str, title: String, detail: String| Issue {
        severity,
        code: code.to_string(),
        title,
        detail,
        bot: Some(probe.bot_name.clone()),
        category: Some(probe.category),
    };

    if probe.status_code.is_none() {
        issues.push(demote(
            base(
                Severity::Critical,
                "transport_failure",
                format!("{} could not fetch the page", probe.bot_name),
                probe.error.clone().unwrap_or_else(|| "request failed".to_string()),
            ),
            probe,
        ));
        return issues;
    }
    if probe.robots_decision.allowed.is_disallowed() {
        issues.push(demote(
            base(
                Severity::Critical,
                "robots_disallow",
                format!("{} is blocked by robots.txt", probe.bot_name),
                probe.robots_decision.explain.clone(),
            ),
            probe,
        ));
    }
    if probe.x_robots_forbidden || probe.meta_robots_forbidden {
        let directive = probe
            .x_robots_tag
            .clone()
            .or_else(|| probe.meta_robots.clone())
            .unwrap_or_default();
        issues.push(base(
            Severity::Warning,
            "indexing_directive",
            format!("{} sees a forbidding indexing directive", probe.bot_name),
            format!("directive value: {}", directive),
        ));
    }
    if probe.accessible && !probe.has_content {
        issues.push(base(
            Severity::Warning,
            "empty_content",
            format!("{} received an empty body", probe.bot_name),
            "The response completed without any content.".to_string(),
        ));
    }
    if probe.waf_signal.detected {
        issues.push(demote(
            base(
                Severity::Warning,
                "waf_challenge",
                format!("{} received a WAF/CDN challenge", probe.bot_name),
                format!(
                    "{} (provider: {}, confidence {:.2})",
                    probe.waf_signal.reason, probe.waf_signal.provider, probe.waf_signal.confidence
                ),
            ),
            probe,
        ));
    }
    issues
}

/// Per-bot findings in result order
pub fn build_issues(results: &[ProbeResult]) -> Vec<Issue> {
    results.iter().flat_map(probe_issues).collect()
}

/// One actionable line per fired blocker code
pub fn recommendations(blockers: &[PriorityBlocker]) -> Vec<String> {
    if blockers.is_empty() {
        return vec!["No accessibility findings for the selected bots.".to_string()];
    }
    blockers
        .iter()
        .map(|b| match b.code.as_str() {
            "unreachable" => {
                "Investigate transport failures; affected bots never received a response."
            }
            "robots_disallow" => "Relax robots.txt rules for bots that should access this page.",
            "empty_content" => "Serve a non-empty HTML body to bot user agents.",
            "indexing_directive" => {
                "Remove noindex directives from X-Robots-Tag and the robots meta tag."
            }
            _ => "Allowlist verified crawlers in the WAF/CDN configuration.",
        })
        .map(|s| s.to_string())
        .collect()
}

/// Run-level counters over classified results and built issues
pub fn build_summary(results: &[ProbeResult], issues: &[Issue]) -> Summary {
    let total = results.len() as u32;
    let count = |f: fn(&&ProbeResult) -> bool| results.iter().filter(f).count() as u32;
    let accessible = count(|p| p.accessible);
    let with_content = count(|p| p.has_content);
    let crawlable = count(|p| p.crawlable);
    let renderable = count(|p| p.renderable);
    let indexable = count(|p| p.indexable);

    let responded: Vec<&ProbeResult> =
        results.iter().filter(|p| p.status_code.is_some()).collect();
    let avg_response_time_ms = if responded.is_empty() {
        0.0
    } else {
        round1(
            responded.iter().map(|p| p.elapsed_ms as f64).sum::<f64>() / responded.len() as f64,
        )
    };

    let severity_count = |s: Severity| issues.iter().filter(|i| i.severity == s).count() as u32;

    Summary {
        total,
        accessible,
        unavailable: total - accessible,
        with_content,
        without_content: total - with_content,
        crawlable,
        non_crawlable: total - crawlable,
        renderable,
        non_renderable: total - renderable,
        indexable,
        non_indexable: total - indexable,
        robots_disallowed: count(|p| p.robots_decision.allowed.is_disallowed()),
        x_robots_forbidden: count(|p| p.x_robots_forbidden),
        meta_forbidden: count(|p| p.meta_robots_forbidden),
        waf_cdn_detected: count(|p| p.waf_signal.detected),
        expected_ai_policy_blocked: count(|p| p.expected_policy_block),
        avg_response_time_ms,
        issues_total: issues.len() as u32,
        critical_issues: severity_count(Severity::Critical),
        warning_issues: severity_count(Severity::Warning),
        info_issues: severity_count(Severity::Info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::probe::WafSignal;
    use crate::models::robots::{RobotsAllowed, RobotsEvaluation};
    use crate::services::classify::classify_probe;

    fn probe(name: &str, category: BotCategory) -> ProbeResult {
        let mut p = ProbeResult {
            bot_name: name.to_string(),
            category,
            status_code: Some(200),
            elapsed_ms: 100,
            final_url: "https://example.com/".to_string(),
            content_type: Some("text/html".to_string()),
            has_content: true,
            x_robots_tag: None,
            meta_robots: None,
            robots_decision: RobotsEvaluation {
                allowed: RobotsAllowed::Allowed,
                matched_user_agent: Some("*".to_string()),
                matched_rule: "none".to_string(),
                matched_pattern: None,
                explain: "no rules matched".to_string(),
            },
            waf_signal: WafSignal::none(),
            error: None,
            accessible: false,
            crawlable: false,
            renderable: false,
            indexable: false,
            x_robots_forbidden: false,
            meta_robots_forbidden: false,
            expected_policy_block: false,
            indexability_reasons: Vec::new(),
            blocked_reasons: Vec::new(),
            response_sample: "ok".to_string(),
        };
        classify_probe(&mut p);
        p
    }

    fn robots_blocked(name: &str, category: BotCategory) -> ProbeResult {
        let mut p = probe(name, category);
        p.robots_decision.allowed = RobotsAllowed::Disallowed;
        classify_probe(&mut p);
        p
    }

    #[test]
    fn test_category_stat_ordering_invariant() {
        let results = vec![
            probe("Googlebot", BotCategory::Google),
            robots_blocked("Googlebot-Image", BotCategory::Google),
        ];
        let stats = category_stats(&results, "balanced", "standard");
        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert!(s.indexable <= s.renderable);
        assert!(s.renderable <= s.crawlable);
        assert!(s.crawlable <= s.accessible);
        assert!(s.accessible <= s.total);
        assert_eq!(s.indexable_pct, 50.0);
        assert_eq!(s.priority_risk_score, 50.0);
    }

    #[test]
    fn test_clean_run_has_no_blockers() {
        let results = vec![
            probe("Googlebot", BotCategory::Google),
            probe("GPTBot", BotCategory::Ai),
        ];
        let blockers = priority_blockers(&results, "balanced", false);
        assert!(blockers.is_empty());
        assert_eq!(
            recommendations(&blockers),
            vec!["No accessibility findings for the selected bots.".to_string()]
        );
    }

    #[test]
    fn test_robots_blocker_scoring() {
        let results = vec![
            robots_blocked("Googlebot", BotCategory::Google),
            probe("Bingbot", BotCategory::Bing),
        ];
        let blockers = priority_blockers(&results, "balanced", false);
        assert_eq!(blockers.len(), 1);
        let b = &blockers[0];
        assert_eq!(b.code, "robots_disallow");
        assert_eq!(b.affected_bots, 1);
        assert_eq!(b.weighted_impact, 1.0);
        assert_eq!(b.priority_score, 10.0);
        assert_eq!(b.sample_bots, vec!["Googlebot"]);
    }

    #[test]
    fn test_unreachable_excludes_other_buckets() {
        let mut p = probe("Googlebot", BotCategory::Google);
        p.status_code = None;
        p.robots_decision.allowed = RobotsAllowed::Disallowed;
        classify_probe(&mut p);
        assert_eq!(blocker_codes(&p), vec!["unreachable"]);
    }

    #[test]
    fn test_ai_exemption_removes_ai_from_blockers() {
        let mut results = vec![
            robots_blocked("GPTBot", BotCategory::Ai),
            robots_blocked("Googlebot", BotCategory::Google),
        ];
        apply_policy_exemption(&mut results, true);
        let blockers = priority_blockers(&results, "balanced", true);
        assert_eq!(blockers.len(), 1);
        assert_eq!(blockers[0].sample_bots, vec!["Googlebot"]);
        assert!(results[0].expected_policy_block);
    }

    #[test]
    fn test_demoted_issue_is_info_with_prefix() {
        let mut results = vec![robots_blocked("GPTBot", BotCategory::Ai)];
        apply_policy_exemption(&mut results, true);
        let issues = build_issues(&results);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Info);
        assert!(issues[0].title.starts_with("Expected policy block: "));
    }

    #[test]
    fn test_directive_issue_is_not_demoted() {
        let mut p = probe("GPTBot", BotCategory::Ai);
        p.meta_robots = Some("noindex".to_string());
        classify_probe(&mut p);
        let mut results = vec![p];
        apply_policy_exemption(&mut results, true);
        let issues = build_issues(&results);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_allowlist_simulator_lifts_robots_blocks() {
        let results = vec![
            robots_blocked("GPTBot", BotCategory::Ai),
            probe("ClaudeBot", BotCategory::Ai),
            probe("Googlebot", BotCategory::Google),
        ];
        let projections = allowlist_simulator(&results);
        let ai = projections.iter().find(|p| p.scenario == "AI").unwrap();
        assert_eq!(ai.current_indexable, 1);
        assert_eq!(ai.projected_indexable, 2);
        assert_eq!(ai.indexable_delta, 1);
    }

    #[test]
    fn test_allowlist_simulator_keeps_directive_blocks() {
        let mut p = probe("GPTBot", BotCategory::Ai);
        p.meta_robots = Some("noindex".to_string());
        classify_probe(&mut p);
        let projections = allowlist_simulator(&[p]);
        let ai = projections.iter().find(|p| p.scenario == "AI").unwrap();
        assert_eq!(ai.projected_indexable, 0);
        assert_eq!(ai.indexable_delta, 0);
    }

    #[test]
    fn test_evidence_pack_covers_non_indexable_only() {
        let results = vec![
            probe("Googlebot", BotCategory::Google),
            robots_blocked("GPTBot", BotCategory::Ai),
        ];
        let rows = evidence_pack(&results);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bot, "GPTBot");
        assert_eq!(rows[0].indexability_reason, "robots_disallow");
    }

    #[test]
    fn test_summary_counters() {
        let mut results = vec![
            probe("Googlebot", BotCategory::Google),
            robots_blocked("GPTBot", BotCategory::Ai),
        ];
        apply_policy_exemption(&mut results, false);
        let issues = build_issues(&results);
        let summary = build_summary(&results, &issues);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.indexable, 1);
        assert_eq!(summary.non_indexable, 1);
        assert_eq!(summary.robots_disallowed, 1);
        assert_eq!(summary.critical_issues, 1);
        assert_eq!(summary.issues_total, 1);
        assert_eq!(summary.avg_response_time_ms, 100.0);
    }

    #[test]
    fn test_playbooks_only_for_fired_blockers() {
        let results = vec![robots_blocked("Googlebot", BotCategory::Google)];
        let blockers = priority_blockers(&results, "balanced", false);
        let playbooks = playbooks_for(&blockers);
        assert_eq!(playbooks.len(), 1);
        assert_eq!(playbooks[0].code, "robots_disallow");
        assert_eq!(playbooks[0].owner, "SEO");
        let grouped = action_center(&playbooks);
        assert_eq!(grouped.get("SEO").map(|v| v.len()), Some(1));
    }
}
