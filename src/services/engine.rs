// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Orchestration: robots fetch, the concurrent probe pool, classification,
//! aggregation, persistence, alerts, and result document assembly.

use crate::models::config::AuditConfig;
use crate::models::probe::{BotResultCompact, ProbeResult};
use crate::models::report::{
    BaselineDiff, BaselineRecord, BatchResultDocument, BatchSummaryRow, CategoryStat,
    EngineResults, EvidenceRow, HostConsistency, HostVariantProbe, Issue, LintFinding, Playbook,
    PriorityBlocker, ResultDocument, Severity, SlaRow, Summary, TrendReport, TrendSnapshot,
    WafBypassProbe,
};
use crate::models::robots::RobotsReport;
use crate::services::aggregate::{
    action_center, allowlist_simulator, apply_policy_exemption, build_issues, build_summary,
    category_stats, evidence_pack, playbooks_for, priority_blockers, recommendations,
    sla_dashboard,
};
use crate::services::alerts::derive_alerts;
use crate::services::baseline::{compute_baseline_diff, domain_slug, BaselineStore};
use crate::services::catalog::resolve_bots;
use crate::services::classify::classify_probe;
use crate::services::probe::{extract_text_sample, probe_bot, HTML_ACCEPT};
use crate::services::profiles::retry_profile;
use crate::services::robots::{
    fetch_robots_txt, lint_robots, parse_robots_txt, RobotsFetch, RobotsTxt, NEUTRAL_UA,
};
use crate::services::trend::{trend_report, TrendStore};
use crate::services::waf::{detect_waf, WafInput};
use chrono::{DateTime, SecondsFormat, Utc};
use futures::stream::{self, StreamExt};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use url::Url;

/// Realistic desktop browser identity for the informational bypass probe
pub const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Timeout for the lightweight host-consistency probes
const HOST_PROBE_TIMEOUT: Duration = Duration::from_secs(8);

/// Trim whitespace and default to https when the scheme is missing
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Everything the aggregator derives from classified results
struct ReportSections {
    stats: Vec<CategoryStat>,
    dashboard: Vec<SlaRow>,
    blockers: Vec<PriorityBlocker>,
    playbooks: Vec<Playbook>,
    action_center: BTreeMap<String, Vec<Playbook>>,
    simulator: Vec<crate::models::report::AllowlistProjection>,
    linter: Vec<LintFinding>,
    evidence: Vec<EvidenceRow>,
    issues: Vec<Issue>,
    summary: Summary,
    recommendations: Vec<String>,
}

fn build_report_sections(
    results: &[ProbeResult],
    config: &AuditConfig,
    robots_fetch: &RobotsFetch,
    parsed_robots: Option<&RobotsTxt>,
) -> ReportSections {
    let stats = category_stats(results, &config.criticality_profile, &config.sla_profile);
    let dashboard = sla_dashboard(&stats);
    let blockers = priority_blockers(
        results,
        &config.criticality_profile,
        config.ai_block_expected,
    );
    let playbooks = playbooks_for(&blockers);
    let issues = build_issues(results);
    let summary = build_summary(results, &issues);
    ReportSections {
        dashboard,
        action_center: action_center(&playbooks),
        simulator: allowlist_simulator(results),
        linter: lint_robots(robots_fetch, parsed_robots),
        evidence: evidence_pack(results),
        recommendations: recommendations(&blockers),
        stats,
        blockers,
        playbooks,
        issues,
        summary,
    }
}

async fn probe_all(
    client: &Client,
    target: &Url,
    robots: Option<&RobotsTxt>,
    config: &AuditConfig,
) -> Vec<ProbeResult> {
    let retry = retry_profile(&config.retry_profile);
    let bots = resolve_bots(&config.selected_bots, &config.bot_groups);
    let concurrency = config.concurrency.max(1);

    let mut results: Vec<ProbeResult> =
        stream::iter(bots.iter().map(|bot| probe_bot(client, target, bot, robots, &retry)))
            .buffer_unordered(concurrency)
            .collect()
            .await;

    // Probes complete out of order; sort deterministically before embedding
    results.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.bot_name.cmp(&b.bot_name))
    });
    for probe in results.iter_mut() {
        classify_probe(probe);
    }
    apply_policy_exemption(&mut results, config.ai_block_expected);
    results
}

/// Up to 4 no-redirect probes over scheme x www-variant with the path kept
async fn check_host_consistency(client: &Client, url: &Url) -> HostConsistency {
    let mut variants = Vec::new();
    let mut seen = BTreeSet::new();

    if let Some(host) = url.host_str() {
        let bare = host.strip_prefix("www.").unwrap_or(host).to_string();
        // www-prefixing only makes sense for domain hosts, not IP literals
        let is_domain = matches!(url.host(), Some(url::Host::Domain(_)));
        let mut hosts = vec![bare.clone()];
        if is_domain {
            hosts.push(format!("www.{}", bare));
        }
        for scheme in ["https", "http"] {
            for candidate in &hosts {
                let mut variant = url.clone();
                if variant.set_scheme(scheme).is_err()
                    || variant.set_host(Some(candidate.as_str())).is_err()
                {
                    continue;
                }
                if !seen.insert(variant.to_string()) {
                    continue;
                }
                variants.push(probe_host_variant(client, variant).await);
            }
        }
    }

    let statuses: BTreeSet<u16> = variants.iter().filter_map(|v| v.status_code).collect();
    let redirect_hosts: BTreeSet<String> = variants
        .iter()
        .filter_map(|v| v.location.as_deref())
        .filter_map(|loc| Url::parse(loc).ok())
        .filter_map(|u| u.host_str().map(|h| h.to_string()))
        .collect();

    HostConsistency {
        distinct_statuses: statuses.len() as u32,
        distinct_redirect_hosts: redirect_hosts.len() as u32,
        inconsistent: statuses.len() > 2 || redirect_hosts.len() > 2,
        variants,
    }
}

async fn probe_host_variant(client: &Client, variant: Url) -> HostVariantProbe {
    let variant_str = variant.to_string();
    match client
        .get(variant)
        .header("User-Agent", NEUTRAL_UA)
        .send()
        .await
    {
        Ok(resp) => HostVariantProbe {
            variant: variant_str,
            status_code: Some(resp.status().as_u16()),
            location: resp
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string()),
            error: None,
        },
        Err(e) => HostVariantProbe {
            variant: variant_str,
            status_code: None,
            location: None,
            error: Some(e.to_string()),
        },
    }
}

/// One GET with a desktop browser identity; informational only
async fn run_waf_bypass_probe(client: &Client, url: &Url) -> WafBypassProbe {
    match client
        .get(url.clone())
        .header("User-Agent", DESKTOP_UA)
        .header("Accept", HTML_ACCEPT)
        .send()
        .await
    {
        Ok(resp) => {
            let status = resp.status().as_u16();
            let final_url = resp.url().to_string();
            let headers = resp.headers().clone();
            let content_type = headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());
            let body = resp.text().await.unwrap_or_default();
            let waf_signal = detect_waf(WafInput {
                status: Some(status),
                headers: Some(&headers),
                body: Some(&body),
                error: None,
            });
            WafBypassProbe {
                user_agent: DESKTOP_UA.to_string(),
                status_code: Some(status),
                final_url: Some(final_url),
                content_type,
                response_sample: extract_text_sample(&body),
                waf_signal,
                error: None,
            }
        }
        Err(e) => {
            let error = e.to_string();
            let waf_signal = detect_waf(WafInput {
                status: None,
                headers: None,
                body: None,
                error: Some(&error),
            });
            WafBypassProbe {
                user_agent: DESKTOP_UA.to_string(),
                status_code: None,
                final_url: None,
                content_type: None,
                response_sample: String::new(),
                waf_signal,
                error: Some(error),
            }
        }
    }
}

/// Load the baseline, diff, persist the new state, and build the trend
/// section. Persistence failures are logged and swallowed.
fn persist_state(
    config: &AuditConfig,
    domain: &str,
    summary: &Summary,
    url: &str,
    completed_at: DateTime<Utc>,
) -> (BaselineDiff, TrendReport) {
    let slug = domain_slug(domain);

    let baseline_store = BaselineStore::new(&config.reports_root);
    let prior = baseline_store.load(&slug);
    let baseline_diff = compute_baseline_diff(summary, prior.as_ref());
    if config.baseline_enabled {
        let record = BaselineRecord {
            updated_at: completed_at,
            summary: summary.clone(),
        };
        if let Err(e) = baseline_store.save(&slug, &record) {
            eprintln!("Failed to persist baseline for {}: {}", slug, e);
        }
    }

    let trend_store = TrendStore::new(&config.reports_root);
    let snapshot = TrendSnapshot {
        timestamp: completed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        url: url.to_string(),
        total: summary.total,
        indexable: summary.indexable,
        non_indexable: summary.non_indexable,
        critical_issues: summary.critical_issues,
        avg_response_time_ms: summary.avg_response_time_ms,
        retry_profile: config.retry_profile.clone(),
        criticality_profile: config.criticality_profile.clone(),
        sla_profile: config.sla_profile.clone(),
    };
    let history = match trend_store.append(&slug, snapshot.clone()) {
        Ok(history) => history,
        Err(e) => {
            eprintln!("Failed to persist trend for {}: {}", slug, e);
            vec![snapshot]
        }
    };

    (baseline_diff, trend_report(&history))
}

fn empty_document(config: &AuditConfig, url: &str) -> ResultDocument {
    ResultDocument {
        task_type: "bot_check".to_string(),
        url: url.to_string(),
        completed_at: Utc::now(),
        results: EngineResults {
            engine: "v2".to_string(),
            domain: String::new(),
            retry_profile: config.retry_profile.clone(),
            criticality_profile: config.criticality_profile.clone(),
            sla_profile: config.sla_profile.clone(),
            ai_block_expected: config.ai_block_expected,
            bots_checked: Vec::new(),
            selected_bot_groups: config.bot_groups.clone(),
            bot_results: BTreeMap::new(),
            bot_rows: Vec::new(),
            summary: Summary::default(),
            robots: RobotsReport {
                found: false,
                status_code: None,
                sitemaps: Vec::new(),
            },
            host_consistency: HostConsistency {
                variants: Vec::new(),
                distinct_statuses: 0,
                distinct_redirect_hosts: 0,
                inconsistent: false,
            },
            waf_bypass_probe: None,
            category_stats: Vec::new(),
            sla_dashboard: Vec::new(),
            priority_blockers: Vec::new(),
            playbooks: Vec::new(),
            action_center: BTreeMap::new(),
            allowlist_simulator: Vec::new(),
            robots_linter: Vec::new(),
            evidence_pack: Vec::new(),
            baseline_diff: BaselineDiff::absent(),
            trend: trend_report(&[]),
            alerts: Vec::new(),
            issues: Vec::new(),
            recommendations: vec![
                "No audit performed: the target URL is empty or invalid.".to_string()
            ],
        },
    }
}

fn invalid_url_document(config: &AuditConfig, url: &str) -> ResultDocument {
    let mut doc = empty_document(config, url);
    doc.results.issues.push(Issue {
        severity: Severity::Critical,
        code: "invalid_url".to_string(),
        title: "Target URL could not be parsed".to_string(),
        detail: url.to_string(),
        bot: None,
        category: None,
    });
    doc.results.summary.issues_total = 1;
    doc.results.summary.critical_issues = 1;
    doc
}

/// Audit a single URL end to end. Per-bot and persistence failures never
/// escape the run; only an empty URL yields an empty-shaped document.
pub async fn run_audit(config: &AuditConfig) -> ResultDocument {
    let url_str = normalize_url(&config.target_url);
    if url_str.is_empty() {
        return empty_document(config, "");
    }
    let Ok(target) = Url::parse(&url_str) else {
        eprintln!("Cannot parse target URL: {}", url_str);
        return invalid_url_document(config, &url_str);
    };
    let domain = target.host_str().unwrap_or("").to_lowercase();
    let retry = retry_profile(&config.retry_profile);

    let client = Client::builder()
        .timeout(retry.timeout)
        .redirect(Policy::limited(10))
        .build();
    let bare_client = Client::builder()
        .timeout(HOST_PROBE_TIMEOUT)
        .redirect(Policy::none())
        .build();
    let (Ok(client), Ok(bare_client)) = (client, bare_client) else {
        eprintln!("Failed to build HTTP client for {}", url_str);
        return invalid_url_document(config, &url_str);
    };

    // Progress goes to stderr; stdout is reserved for the result document
    eprintln!("Auditing {} with retry profile {}", url_str, retry.name);

    let robots_fetch = fetch_robots_txt(&client, &target, &retry).await;
    let parsed_robots = robots_fetch.text.as_deref().map(parse_robots_txt);

    let results = probe_all(&client, &target, parsed_robots.as_ref(), config).await;
    let sections = build_report_sections(&results, config, &robots_fetch, parsed_robots.as_ref());

    let host_consistency = check_host_consistency(&bare_client, &target).await;
    let waf_bypass = run_waf_bypass_probe(&client, &target).await;

    let completed_at = Utc::now();
    let (baseline_diff, trend) =
        persist_state(config, &domain, &sections.summary, &url_str, completed_at);
    let alerts = derive_alerts(&sections.summary, &baseline_diff, &trend);

    let bots_checked: Vec<String> = results.iter().map(|p| p.bot_name.clone()).collect();
    let bot_results: BTreeMap<String, BotResultCompact> = results
        .iter()
        .map(|p| (p.bot_name.clone(), p.compact()))
        .collect();

    ResultDocument {
        task_type: "bot_check".to_string(),
        url: url_str,
        completed_at,
        results: EngineResults {
            engine: "v2".to_string(),
            domain,
            retry_profile: retry.name.to_string(),
            criticality_profile: config.criticality_profile.clone(),
            sla_profile: config.sla_profile.clone(),
            ai_block_expected: config.ai_block_expected,
            bots_checked,
            selected_bot_groups: config.bot_groups.clone(),
            bot_results,
            bot_rows: results,
            summary: sections.summary,
            robots: RobotsReport {
                found: robots_fetch.text.is_some(),
                status_code: robots_fetch.status_code,
                sitemaps: parsed_robots.map(|p| p.sitemaps).unwrap_or_default(),
            },
            host_consistency,
            waf_bypass_probe: Some(waf_bypass),
            category_stats: sections.stats,
            sla_dashboard: sections.dashboard,
            priority_blockers: sections.blockers,
            playbooks: sections.playbooks,
            action_center: sections.action_center,
            allowlist_simulator: sections.simulator,
            robots_linter: sections.linter,
            evidence_pack: sections.evidence,
            baseline_diff,
            trend,
            alerts,
            issues: sections.issues,
            recommendations: sections.recommendations,
        },
    }
}

/// Run each batch URL sequentially and merge the documents. An empty
/// normalized list degrades to a single empty run.
pub async fn run_batch_audit(config: &AuditConfig) -> BatchResultDocument {
    let urls: Vec<String> = config
        .batch_urls
        .clone()
        .unwrap_or_default()
        .iter()
        .map(|u| normalize_url(u))
        .filter(|u| !u.is_empty())
        .collect();

    let mut runs = Vec::new();
    if urls.is_empty() {
        let single = AuditConfig {
            target_url: String::new(),
            batch_urls: None,
            ..config.clone()
        };
        runs.push(run_audit(&single).await);
    } else {
        for url in &urls {
            let single = AuditConfig {
                target_url: url.clone(),
                batch_urls: None,
                ..config.clone()
            };
            runs.push(run_audit(&single).await);
        }
    }

    let summary_table = runs
        .iter()
        .map(|doc| BatchSummaryRow {
            url: doc.url.clone(),
            domain: doc.results.domain.clone(),
            total: doc.results.summary.total,
            indexable: doc.results.summary.indexable,
            non_indexable: doc.results.summary.non_indexable,
            critical_issues: doc.results.summary.critical_issues,
            alerts: doc.results.alerts.len(),
        })
        .collect();

    BatchResultDocument {
        task_type: "bot_check".to_string(),
        completed_at: Utc::now(),
        urls,
        summary_table,
        runs,
    }
}
